//! Classroom handlers.

use crate::error::AppError;
use crate::extractors::BodyPayload;
use crate::response::{success_ok, Envelope};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::to_data;

/// POST /api/classrooms
pub async fn create(State(state): State<AppState>, BodyPayload(body): BodyPayload) -> Result<Envelope, AppError> {
    state.managers.classroom.create_classroom(&body).await?.into_envelope(StatusCode::CREATED)
}

/// GET /api/classrooms/school/:id
pub async fn list_by_school(State(state): State<AppState>, Path(school_id): Path<String>) -> Result<Envelope, AppError> {
    let classrooms = state.managers.classroom.get_classrooms_by_school(&school_id).await?;
    Ok(success_ok(to_data(classrooms)?))
}

/// PUT /api/classrooms/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    BodyPayload(body): BodyPayload,
) -> Result<Envelope, AppError> {
    state.managers.classroom.update_classroom(&id, &body).await?.into_envelope(StatusCode::OK)
}

/// DELETE /api/classrooms/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Envelope, AppError> {
    let done = state.managers.classroom.delete_classroom(&id).await?;
    Ok(success_ok(to_data(done)?).with_message("Classroom successfully deleted."))
}
