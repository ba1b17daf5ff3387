//! Registration and login.

use crate::error::AppError;
use crate::extractors::BodyPayload;
use crate::response::Envelope;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;

/// POST /api/auth/register
pub async fn register(State(state): State<AppState>, BodyPayload(body): BodyPayload) -> Result<Envelope, AppError> {
    state.managers.user.create_user(&body).await?.into_envelope(StatusCode::CREATED)
}

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, BodyPayload(body): BodyPayload) -> Result<Envelope, AppError> {
    state.managers.user.login(&body).await?.into_envelope(StatusCode::OK)
}
