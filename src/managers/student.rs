use super::{parse, patch, Empty, Outcome};
use crate::error::AppError;
use crate::store::{encode, filter_eq, Collection, EntityStore, Record};
use crate::validation::{self, Payload, ValidationReport, CREATE_STUDENT, UPDATE_STUDENT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StudentDoc {
    name: String,
    age: i64,
    classroom: String,
}

#[derive(Debug, Deserialize)]
struct StudentPatch {
    name: Option<String>,
    age: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub classroom_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentReply {
    pub student: StudentView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentList {
    pub students: Vec<StudentView>,
}

fn project(record: &Record) -> Result<StudentView, AppError> {
    let doc: StudentDoc = record.decode()?;
    Ok(StudentView {
        id: record.id.clone(),
        name: doc.name,
        age: doc.age,
        classroom_id: doc.classroom,
    })
}

#[derive(Clone)]
pub struct StudentManager {
    store: Arc<dyn EntityStore>,
}

impl StudentManager {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        StudentManager { store }
    }

    pub async fn create_student(&self, payload: &Payload) -> Result<Outcome<StudentReply>, AppError> {
        if let Some(report) = validation::validate(payload, CREATE_STUDENT) {
            return Ok(Outcome::Invalid(report));
        }
        let doc: StudentDoc = parse(payload)?;
        if self.store.find_by_id(Collection::Classrooms, &doc.classroom).await?.is_none() {
            return Ok(Outcome::Invalid(ValidationReport::single("classroom", "Classroom does not exist")));
        }
        let record = self.store.create(Collection::Students, encode(&doc)?).await?;
        tracing::info!(student_id = %record.id, classroom_id = %doc.classroom, "student created");
        Ok(Outcome::Done(StudentReply { student: project(&record)? }))
    }

    /// Age 0 counts as "not provided" and keeps the stored age.
    pub async fn update_student(&self, id: &str, payload: &Payload) -> Result<Outcome<StudentReply>, AppError> {
        if let Some(report) = validation::validate_partial(payload, UPDATE_STUDENT) {
            return Ok(Outcome::Invalid(report));
        }
        let changes: StudentPatch = parse(payload)?;
        let mut record = self
            .store
            .find_by_id(Collection::Students, id)
            .await?
            .ok_or(AppError::NotFound("Student"))?;
        let mut doc: StudentDoc = record.decode()?;
        patch(&mut doc.name, changes.name);
        patch(&mut doc.age, changes.age);
        record.doc = encode(&doc)?;
        let saved = self.store.save(Collection::Students, &record).await?;
        Ok(Outcome::Done(StudentReply { student: project(&saved)? }))
    }

    pub async fn get_students_by_classroom(&self, classroom_id: &str) -> Result<StudentList, AppError> {
        let records = self
            .store
            .find(Collection::Students, &filter_eq("classroom", classroom_id))
            .await?;
        let students = records.iter().map(project).collect::<Result<Vec<_>, _>>()?;
        Ok(StudentList { students })
    }

    pub async fn delete_student(&self, id: &str) -> Result<Empty, AppError> {
        self.store
            .find_by_id_and_delete(Collection::Students, id)
            .await?
            .ok_or(AppError::NotFound("Student"))?;
        tracing::info!(student_id = %id, "student deleted");
        Ok(Empty {})
    }
}
