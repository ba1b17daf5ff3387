//! HTTP handlers: fixed REST routes per resource plus the generic dispatch route.

pub mod auth;
pub mod classrooms;
pub mod dispatch;
pub mod schools;
pub mod students;

use crate::error::AppError;
use serde::Serialize;
use serde_json::Value;

fn to_data<T: Serialize>(value: T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Store(e.to_string()))
}
