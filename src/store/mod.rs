//! Entity Store: per-entity document collections with find/save/delete-by-id.
//!
//! Managers only ever talk to [`EntityStore`]; `PgStore` backs production and `MemoryStore` backs tests
//! and `STORE_BACKEND=memory`.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::AppError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

pub type Document = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Schools,
    Classrooms,
    Students,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Schools,
        Collection::Classrooms,
        Collection::Students,
        Collection::Users,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Schools => "schools",
            Collection::Classrooms => "classrooms",
            Collection::Students => "students",
            Collection::Users => "users",
        }
    }

    /// Entity label used in caller-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Schools => "School",
            Collection::Classrooms => "Classroom",
            Collection::Students => "Student",
            Collection::Users => "User",
        }
    }

    /// Top-level document fields that must be unique when present.
    pub fn unique_fields(&self) -> &'static [&'static str] {
        match self {
            Collection::Schools => &["name"],
            Collection::Users => &["email"],
            Collection::Classrooms | Collection::Students => &[],
        }
    }

    pub(crate) fn duplicate(&self, field: &str) -> AppError {
        AppError::Conflict(format!("{} with this {} already exists.", self.label(), field))
    }
}

/// A stored document and its store-assigned id.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: String,
    pub doc: Document,
}

impl Record {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(self.doc.clone()))
            .map_err(|e| AppError::Store(format!("corrupt document {}: {}", self.id, e)))
    }
}

pub fn encode<T: Serialize>(value: &T) -> Result<Document, AppError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(AppError::Store("document must encode to a JSON object".into())),
        Err(e) => Err(AppError::Store(e.to_string())),
    }
}

/// Build an equality filter on one top-level field.
pub fn filter_eq(field: &str, value: impl Into<Value>) -> Document {
    let mut m = Document::new();
    m.insert(field.to_string(), value.into());
    m
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert a new document; the store assigns the id.
    async fn create(&self, collection: Collection, doc: Document) -> Result<Record, AppError>;

    async fn find_by_id(&self, collection: Collection, id: &str) -> Result<Option<Record>, AppError>;

    /// Every document whose top-level fields equal those in `filter`. An empty filter matches all.
    async fn find(&self, collection: Collection, filter: &Document) -> Result<Vec<Record>, AppError>;

    /// Replace the document stored under `record.id`.
    async fn save(&self, collection: Collection, record: &Record) -> Result<Record, AppError>;

    async fn find_by_id_and_delete(&self, collection: Collection, id: &str) -> Result<Option<Record>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
