//! Student handlers.

use crate::error::AppError;
use crate::extractors::BodyPayload;
use crate::response::{success_ok, Envelope};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::to_data;

/// POST /api/students
pub async fn create(State(state): State<AppState>, BodyPayload(body): BodyPayload) -> Result<Envelope, AppError> {
    state.managers.student.create_student(&body).await?.into_envelope(StatusCode::CREATED)
}

/// GET /api/students/classroom/:classroomId
pub async fn list_by_classroom(
    State(state): State<AppState>,
    Path(classroom_id): Path<String>,
) -> Result<Envelope, AppError> {
    let students = state.managers.student.get_students_by_classroom(&classroom_id).await?;
    Ok(success_ok(to_data(students)?))
}

/// PUT /api/students/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    BodyPayload(body): BodyPayload,
) -> Result<Envelope, AppError> {
    state.managers.student.update_student(&id, &body).await?.into_envelope(StatusCode::OK)
}

/// DELETE /api/students/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Envelope, AppError> {
    let done = state.managers.student.delete_student(&id).await?;
    Ok(success_ok(to_data(done)?).with_message("Student successfully deleted."))
}
