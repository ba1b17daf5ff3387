//! Request payload extractors. Rejections are `AppError`, so malformed input still leaves through
//! the envelope.

use crate::error::AppError;
use crate::validation::Payload;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header, HeaderMap},
    Form,
};
use serde_json::Value;
use std::collections::HashMap;

/// Request body as a payload: a JSON object, or `application/x-www-form-urlencoded` fields as
/// strings. An empty body is an empty payload.
#[derive(Clone, Debug, Default)]
pub struct BodyPayload(pub Payload);

/// Body, then query string, then route parameters merged into one payload; later sources win on
/// key collisions.
#[derive(Clone, Debug, Default)]
pub struct MergedPayload(pub Payload);

pub(crate) fn body_to_payload(bytes: &[u8]) -> Result<Payload, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::new());
    }
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))?;
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

async fn read_body<S>(req: Request, state: &S) -> Result<Payload, AppError>
where
    S: Send + Sync,
{
    if is_form(req.headers()) {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let mut payload = Payload::new();
        merge_strings(&mut payload, fields);
        return Ok(payload);
    }
    let bytes = Bytes::from_request(req, state)
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;
    body_to_payload(&bytes)
}

fn merge_strings(target: &mut Payload, source: HashMap<String, String>) {
    for (k, v) in source {
        target.insert(k, Value::String(v));
    }
}

#[async_trait]
impl<S> FromRequest<S> for BodyPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(BodyPayload(read_body(req, state).await?))
    }
}

#[async_trait]
impl<S> FromRequest<S> for MergedPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let Query(query) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let mut payload = read_body(Request::from_parts(parts, body), state).await?;
        merge_strings(&mut payload, query);
        merge_strings(&mut payload, params);
        Ok(MergedPayload(payload))
    }
}
