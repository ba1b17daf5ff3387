//! Standard response envelope: `{ok, code, data?, errors?, message?}`.
//!
//! Every route writes through [`Envelope`]; nothing builds a raw JSON response on its own.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub ok: bool,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn success(code: StatusCode, data: Value) -> Self {
        Envelope {
            ok: true,
            code: code.as_u16(),
            data: Some(data),
            errors: None,
            message: None,
        }
    }

    pub fn failure(code: StatusCode, errors: Vec<Value>) -> Self {
        Envelope {
            ok: false,
            code: code.as_u16(),
            data: None,
            errors: Some(errors),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

pub fn success_created(data: Value) -> Envelope {
    Envelope::success(StatusCode::CREATED, data)
}

pub fn success_ok(data: Value) -> Envelope {
    Envelope::success(StatusCode::OK, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_omits_errors() {
        let body = serde_json::to_value(success_created(json!({"school": {"id": "1"}}))).unwrap();
        assert_eq!(body, json!({"ok": true, "code": 201, "data": {"school": {"id": "1"}}}));
    }

    #[test]
    fn failure_omits_data() {
        let env = Envelope::failure(StatusCode::BAD_REQUEST, vec![json!("Student not found.")]);
        let body = serde_json::to_value(&env).unwrap();
        assert_eq!(body, json!({"ok": false, "code": 400, "errors": ["Student not found."]}));
        assert_eq!(env.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn message_is_attached() {
        let env = success_ok(json!({})).with_message("School successfully deleted.");
        assert_eq!(env.message.as_deref(), Some("School successfully deleted."));
    }
}
