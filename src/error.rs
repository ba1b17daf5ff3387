//! Typed errors and HTTP mapping.

use crate::response::Envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("duplicate registration: {0}")]
    DuplicateRegistration(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Carries the entity label, e.g. "School".
    #[error("{0} not found.")]
    NotFound(&'static str),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("module '{0}' not found")]
    UnknownModule(String),
    #[error("function '{function}' is not exposed by module '{module}'")]
    Forbidden { module: String, function: String },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("store: {0}")]
    Store(String),
    #[error("token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_)
            | AppError::InvalidCredentials
            | AppError::Conflict(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownModule(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Config(_) | AppError::Db(_) | AppError::Store(_) | AppError::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the caller. Internal faults are logged and replaced by a generic text.
    fn public_message(&self) -> String {
        match self {
            AppError::Config(_) | AppError::Db(_) | AppError::Store(_) | AppError::Token(_) => {
                tracing::error!(error = %self, "internal failure");
                "internal server error".into()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.public_message();
        Envelope::failure(self.status(), vec![serde_json::Value::String(message)]).into_response()
    }
}
