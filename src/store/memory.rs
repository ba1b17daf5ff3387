//! In-process store with the same contract as `PgStore`, including unique fields.

use super::{new_id, Collection, Document, EntityStore, Record};
use crate::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .map(|guard| guard.get(&collection).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Store("memory store lock poisoned".into())
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(k, v)| doc.get(k) == Some(v))
}

fn check_unique(collection: Collection, rows: &[Record], candidate: &Record) -> Result<(), AppError> {
    for field in collection.unique_fields() {
        let Some(value) = candidate.doc.get(*field).filter(|v| !v.is_null()) else {
            continue;
        };
        let clash = rows
            .iter()
            .any(|r| r.id != candidate.id && r.doc.get(*field) == Some(value));
        if clash {
            return Err(collection.duplicate(field));
        }
    }
    Ok(())
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create(&self, collection: Collection, doc: Document) -> Result<Record, AppError> {
        let mut guard = self.collections.write().map_err(poisoned)?;
        let rows = guard.entry(collection).or_default();
        let record = Record { id: new_id(), doc };
        check_unique(collection, rows, &record)?;
        rows.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, collection: Collection, id: &str) -> Result<Option<Record>, AppError> {
        let guard = self.collections.read().map_err(poisoned)?;
        Ok(guard
            .get(&collection)
            .and_then(|rows| rows.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn find(&self, collection: Collection, filter: &Document) -> Result<Vec<Record>, AppError> {
        let guard = self.collections.read().map_err(poisoned)?;
        Ok(guard
            .get(&collection)
            .map(|rows| rows.iter().filter(|r| matches(&r.doc, filter)).cloned().collect())
            .unwrap_or_default())
    }

    async fn save(&self, collection: Collection, record: &Record) -> Result<Record, AppError> {
        let mut guard = self.collections.write().map_err(poisoned)?;
        let rows = guard.entry(collection).or_default();
        check_unique(collection, rows, record)?;
        let slot = rows
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(AppError::NotFound(collection.label()))?;
        *slot = record.clone();
        Ok(record.clone())
    }

    async fn find_by_id_and_delete(&self, collection: Collection, id: &str) -> Result<Option<Record>, AppError> {
        let mut guard = self.collections.write().map_err(poisoned)?;
        let Some(rows) = guard.get_mut(&collection) else {
            return Ok(None);
        };
        Ok(rows.iter().position(|r| r.id == id).map(|i| rows.remove(i)))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.collections.read().map(|_| ()).map_err(poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::filter_eq;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn create_assigns_distinct_ids() {
        let store = MemoryStore::new();
        let a = store.create(Collection::Students, doc(json!({"name": "A"}))).await.unwrap();
        let b = store.create(Collection::Students, doc(json!({"name": "B"}))).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.count(Collection::Students), 2);
    }

    #[tokio::test]
    async fn find_filters_by_equality_in_insert_order() {
        let store = MemoryStore::new();
        store.create(Collection::Classrooms, doc(json!({"name": "A", "school": "s1"}))).await.unwrap();
        store.create(Collection::Classrooms, doc(json!({"name": "B", "school": "s2"}))).await.unwrap();
        store.create(Collection::Classrooms, doc(json!({"name": "C", "school": "s1"}))).await.unwrap();

        let rows = store.find(Collection::Classrooms, &filter_eq("school", "s1")).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.doc["name"].clone()).collect();
        assert_eq!(names, vec![json!("A"), json!("C")]);
        assert_eq!(store.find(Collection::Classrooms, &Document::new()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unique_school_name_is_enforced() {
        let store = MemoryStore::new();
        store.create(Collection::Schools, doc(json!({"name": "Lincoln"}))).await.unwrap();
        let err = store.create(Collection::Schools, doc(json!({"name": "Lincoln"}))).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.count(Collection::Schools), 1);
    }

    #[tokio::test]
    async fn users_without_email_do_not_collide() {
        let store = MemoryStore::new();
        store.create(Collection::Users, doc(json!({"username": "a"}))).await.unwrap();
        store.create(Collection::Users, doc(json!({"username": "b", "email": null}))).await.unwrap();
        assert_eq!(store.count(Collection::Users), 2);
    }

    #[tokio::test]
    async fn delete_returns_removed_record_once() {
        let store = MemoryStore::new();
        let r = store.create(Collection::Schools, doc(json!({"name": "X"}))).await.unwrap();
        assert!(store.find_by_id_and_delete(Collection::Schools, &r.id).await.unwrap().is_some());
        assert!(store.find_by_id_and_delete(Collection::Schools, &r.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_missing_record_is_not_found() {
        let store = MemoryStore::new();
        let ghost = Record { id: "nope".into(), doc: Document::new() };
        let err = store.save(Collection::Schools, &ghost).await.unwrap_err();
        assert_eq!(err.to_string(), "School not found.");
    }
}
