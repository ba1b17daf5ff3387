use super::{parse, patch, Empty, Outcome};
use crate::error::AppError;
use crate::store::{encode, filter_eq, Collection, Document, EntityStore, Record};
use crate::validation::{self, Payload, CREATE_SCHOOL, UPDATE_SCHOOL};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Stored shape of a school.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchoolDoc {
    name: String,
    address: String,
}

#[derive(Debug, Deserialize)]
struct SchoolPatch {
    name: Option<String>,
    address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolView {
    pub id: String,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolReply {
    pub school: SchoolView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolList {
    pub schools: Vec<SchoolView>,
}

fn project(record: &Record) -> Result<SchoolView, AppError> {
    let doc: SchoolDoc = record.decode()?;
    Ok(SchoolView {
        id: record.id.clone(),
        name: doc.name,
        address: doc.address,
    })
}

#[derive(Clone)]
pub struct SchoolManager {
    store: Arc<dyn EntityStore>,
}

impl SchoolManager {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        SchoolManager { store }
    }

    pub async fn create_school(&self, payload: &Payload) -> Result<Outcome<SchoolReply>, AppError> {
        if let Some(report) = validation::validate(payload, CREATE_SCHOOL) {
            return Ok(Outcome::Invalid(report));
        }
        let doc: SchoolDoc = parse(payload)?;
        let record = self.store.create(Collection::Schools, encode(&doc)?).await?;
        tracing::info!(school_id = %record.id, "school created");
        Ok(Outcome::Done(SchoolReply { school: project(&record)? }))
    }

    pub async fn update_school(&self, id: &str, payload: &Payload) -> Result<Outcome<SchoolReply>, AppError> {
        if let Some(report) = validation::validate_partial(payload, UPDATE_SCHOOL) {
            return Ok(Outcome::Invalid(report));
        }
        let changes: SchoolPatch = parse(payload)?;
        let mut record = self
            .store
            .find_by_id(Collection::Schools, id)
            .await?
            .ok_or(AppError::NotFound("School"))?;
        let mut doc: SchoolDoc = record.decode()?;
        patch(&mut doc.name, changes.name);
        patch(&mut doc.address, changes.address);
        record.doc = encode(&doc)?;
        let saved = self.store.save(Collection::Schools, &record).await?;
        Ok(Outcome::Done(SchoolReply { school: project(&saved)? }))
    }

    pub async fn get_all_schools(&self) -> Result<SchoolList, AppError> {
        let records = self.store.find(Collection::Schools, &Document::new()).await?;
        let schools = records.iter().map(project).collect::<Result<Vec<_>, _>>()?;
        Ok(SchoolList { schools })
    }

    pub async fn get_single_school(&self, id: &str) -> Result<SchoolReply, AppError> {
        let record = self
            .store
            .find_by_id(Collection::Schools, id)
            .await?
            .ok_or(AppError::NotFound("School"))?;
        Ok(SchoolReply { school: project(&record)? })
    }

    /// Refuses while classrooms still reference the school; nothing is deleted in that case.
    pub async fn delete_school(&self, id: &str) -> Result<Empty, AppError> {
        if self.store.find_by_id(Collection::Schools, id).await?.is_none() {
            return Err(AppError::NotFound("School"));
        }
        let children = self.store.find(Collection::Classrooms, &filter_eq("school", id)).await?;
        if !children.is_empty() {
            return Err(AppError::Conflict(format!(
                "School still has {} classroom(s); delete them first.",
                children.len()
            )));
        }
        self.store
            .find_by_id_and_delete(Collection::Schools, id)
            .await?
            .ok_or(AppError::NotFound("School"))?;
        tracing::info!(school_id = %id, "school deleted");
        Ok(Empty {})
    }
}
