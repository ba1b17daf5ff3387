//! Generic `ANY /api/:moduleName/:fnName` handler.

use crate::error::AppError;
use crate::extractors::MergedPayload;
use crate::response::Envelope;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use serde_json::Value;

pub async fn dispatch(
    State(state): State<AppState>,
    Path((module, function)): Path<(String, String)>,
    MergedPayload(payload): MergedPayload,
) -> Result<Envelope, AppError> {
    state.gateway.dispatch(&module, &function, payload).await
}

/// Fallback for unmatched routes.
pub async fn not_found() -> Envelope {
    Envelope::failure(StatusCode::NOT_FOUND, vec![Value::String("route not found".into())])
}

/// Fallback for a known path hit with a method it does not serve.
pub async fn method_not_allowed(method: Method) -> Envelope {
    Envelope::failure(
        StatusCode::METHOD_NOT_ALLOWED,
        vec![Value::String(format!("method {} not allowed", method))],
    )
}
