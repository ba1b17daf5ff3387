use super::{parse, patch, patch_opt, Empty, Outcome};
use crate::error::AppError;
use crate::store::{encode, filter_eq, Collection, EntityStore, Record};
use crate::validation::{self, Payload, ValidationReport, CREATE_CLASSROOM, UPDATE_CLASSROOM};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Stored shape of a classroom; `school` is the parent school id.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClassroomDoc {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    capacity: Option<i64>,
    school: String,
}

#[derive(Debug, Deserialize)]
struct ClassroomPatch {
    name: Option<String>,
    capacity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomView {
    pub id: String,
    pub name: String,
    pub capacity: Option<i64>,
    pub school_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassroomReply {
    pub classroom: ClassroomView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassroomList {
    pub classrooms: Vec<ClassroomView>,
}

fn project(record: &Record) -> Result<ClassroomView, AppError> {
    let doc: ClassroomDoc = record.decode()?;
    Ok(ClassroomView {
        id: record.id.clone(),
        name: doc.name,
        capacity: doc.capacity,
        school_id: doc.school,
    })
}

#[derive(Clone)]
pub struct ClassroomManager {
    store: Arc<dyn EntityStore>,
}

impl ClassroomManager {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        ClassroomManager { store }
    }

    /// The referenced school must exist; otherwise the payload is reported invalid.
    pub async fn create_classroom(&self, payload: &Payload) -> Result<Outcome<ClassroomReply>, AppError> {
        if let Some(report) = validation::validate(payload, CREATE_CLASSROOM) {
            return Ok(Outcome::Invalid(report));
        }
        let doc: ClassroomDoc = parse(payload)?;
        if self.store.find_by_id(Collection::Schools, &doc.school).await?.is_none() {
            return Ok(Outcome::Invalid(ValidationReport::single("school", "School does not exist")));
        }
        let record = self.store.create(Collection::Classrooms, encode(&doc)?).await?;
        tracing::info!(classroom_id = %record.id, school_id = %doc.school, "classroom created");
        Ok(Outcome::Done(ClassroomReply { classroom: project(&record)? }))
    }

    pub async fn update_classroom(&self, id: &str, payload: &Payload) -> Result<Outcome<ClassroomReply>, AppError> {
        if let Some(report) = validation::validate_partial(payload, UPDATE_CLASSROOM) {
            return Ok(Outcome::Invalid(report));
        }
        let changes: ClassroomPatch = parse(payload)?;
        let mut record = self
            .store
            .find_by_id(Collection::Classrooms, id)
            .await?
            .ok_or(AppError::NotFound("Classroom"))?;
        let mut doc: ClassroomDoc = record.decode()?;
        patch(&mut doc.name, changes.name);
        patch_opt(&mut doc.capacity, changes.capacity);
        record.doc = encode(&doc)?;
        let saved = self.store.save(Collection::Classrooms, &record).await?;
        Ok(Outcome::Done(ClassroomReply { classroom: project(&saved)? }))
    }

    pub async fn get_classrooms_by_school(&self, school_id: &str) -> Result<ClassroomList, AppError> {
        let records = self.store.find(Collection::Classrooms, &filter_eq("school", school_id)).await?;
        let classrooms = records.iter().map(project).collect::<Result<Vec<_>, _>>()?;
        Ok(ClassroomList { classrooms })
    }

    /// Refuses while students are still enrolled; nothing is deleted in that case.
    pub async fn delete_classroom(&self, id: &str) -> Result<Empty, AppError> {
        if self.store.find_by_id(Collection::Classrooms, id).await?.is_none() {
            return Err(AppError::NotFound("Classroom"));
        }
        let students = self.store.find(Collection::Students, &filter_eq("classroom", id)).await?;
        if !students.is_empty() {
            return Err(AppError::Conflict(format!(
                "Classroom still has {} student(s); delete them first.",
                students.len()
            )));
        }
        self.store
            .find_by_id_and_delete(Collection::Classrooms, id)
            .await?
            .ok_or(AppError::NotFound("Classroom"))?;
        tracing::info!(classroom_id = %id, "classroom deleted");
        Ok(Empty {})
    }
}
