//! Entity managers: validation, persistence orchestration and public projection, one per entity type.

mod classroom;
mod school;
mod student;
mod user;

pub use classroom::{ClassroomList, ClassroomManager, ClassroomReply, ClassroomView};
pub use school::{SchoolList, SchoolManager, SchoolReply, SchoolView};
pub use student::{StudentList, StudentManager, StudentReply, StudentView};
pub use user::{Role, UserManager, UserSession, UserView};

use crate::error::AppError;
use crate::response::Envelope;
use crate::store::EntityStore;
use crate::token::TokenIssuer;
use crate::validation::{Payload, ValidationReport};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

/// Result of a manager operation that validates input. A failed validation is a normal outcome,
/// not an error, and leaves storage untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Invalid(ValidationReport),
}

impl<T> Outcome<T> {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Outcome::Invalid(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(v) => Some(v),
            Outcome::Invalid(_) => None,
        }
    }
}

impl<T: Serialize> Outcome<T> {
    /// Success goes out with `code`; a validation failure always goes out as 400.
    pub fn into_envelope(self, code: StatusCode) -> Result<Envelope, AppError> {
        match self {
            Outcome::Done(data) => Ok(Envelope::success(code, to_json(&data)?)),
            Outcome::Invalid(report) => {
                let errors = report
                    .0
                    .iter()
                    .map(to_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Envelope::failure(StatusCode::BAD_REQUEST, errors))
            }
        }
    }
}

/// `Done(v)` serializes as `v`; `Invalid(r)` as `{"error": true, "result": r}`.
impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Done(v) => v.serialize(serializer),
            Outcome::Invalid(report) => {
                let mut s = serializer.serialize_struct("Rejected", 2)?;
                s.serialize_field("error", &true)?;
                s.serialize_field("result", report)?;
                s.end()
            }
        }
    }
}

/// Empty success payload returned by deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Empty {}

/// All managers, built once at startup and shared by handle.
#[derive(Clone)]
pub struct Managers {
    pub school: SchoolManager,
    pub classroom: ClassroomManager,
    pub student: StudentManager,
    pub user: UserManager,
}

impl Managers {
    pub fn new(store: Arc<dyn EntityStore>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Managers {
            school: SchoolManager::new(store.clone()),
            classroom: ClassroomManager::new(store.clone()),
            student: StudentManager::new(store.clone()),
            user: UserManager::new(store, tokens),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Store(e.to_string()))
}

/// Deserialize a payload that already passed validation.
fn parse<T: DeserializeOwned>(payload: &Payload) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(payload.clone())).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Values that count as "not provided" in a partial update.
trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for i64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

/// Overwrite `current` only when `incoming` is present and truthy.
/// A caller cannot clear a field this way.
fn patch<T: Truthy>(current: &mut T, incoming: Option<T>) {
    if let Some(v) = incoming.filter(Truthy::is_truthy) {
        *current = v;
    }
}

fn patch_opt<T: Truthy>(current: &mut Option<T>, incoming: Option<T>) {
    if let Some(v) = incoming.filter(Truthy::is_truthy) {
        *current = Some(v);
    }
}
