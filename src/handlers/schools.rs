//! School CRUD handlers.

use crate::error::AppError;
use crate::extractors::BodyPayload;
use crate::response::{success_ok, Envelope};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::to_data;

/// POST /api/schools
pub async fn create(State(state): State<AppState>, BodyPayload(body): BodyPayload) -> Result<Envelope, AppError> {
    state.managers.school.create_school(&body).await?.into_envelope(StatusCode::CREATED)
}

/// GET /api/schools
pub async fn list(State(state): State<AppState>) -> Result<Envelope, AppError> {
    let schools = state.managers.school.get_all_schools().await?;
    Ok(success_ok(to_data(schools)?))
}

/// GET /api/schools/:id
pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<Envelope, AppError> {
    let school = state.managers.school.get_single_school(&id).await?;
    Ok(success_ok(to_data(school)?))
}

/// PUT /api/schools/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    BodyPayload(body): BodyPayload,
) -> Result<Envelope, AppError> {
    state.managers.school.update_school(&id, &body).await?.into_envelope(StatusCode::OK)
}

/// DELETE /api/schools/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Envelope, AppError> {
    let done = state.managers.school.delete_school(&id).await?;
    Ok(success_ok(to_data(done)?).with_message("School successfully deleted."))
}
