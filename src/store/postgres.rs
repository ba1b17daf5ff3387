//! PostgreSQL-backed collections. Each collection is a table of JSONB documents living in the schema
//! named by `REGISTRY_SCHEMA` (default `registry`).

use super::{new_id, Collection, Document, EntityStore, Record};
use crate::error::{AppError, ConfigError};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }

    /// Schema-qualified table name for a collection (e.g. "registry"."schools").
    fn table(&self, collection: Collection) -> String {
        qualified_table(&self.schema, collection)
    }

    /// Create the schema, one table per collection, and the unique-field indexes. Idempotent.
    pub async fn ensure_collections(&self) -> Result<(), AppError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&self.schema)))
            .execute(&self.pool)
            .await?;

        for collection in Collection::ALL {
            let q_table = self.table(collection);
            let ddl = format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    id TEXT PRIMARY KEY,
                    doc JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
                q_table
            );
            sqlx::query(&ddl).execute(&self.pool).await?;
            for field in collection.unique_fields() {
                sqlx::query(&unique_index_ddl(&self.schema, collection, field))
                    .execute(&self.pool)
                    .await?;
            }
        }
        tracing::info!(schema = %self.schema, "collections ready");
        Ok(())
    }

    fn map_write_error(collection: Collection, e: sqlx::Error) -> AppError {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some("23505") {
                let field = db
                    .constraint()
                    .and_then(|c| field_from_index_name(collection, c))
                    .unwrap_or("value");
                return collection.duplicate(field);
            }
        }
        AppError::Db(e)
    }
}

fn qualified_table(schema: &str, collection: Collection) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(collection.name()))
}

fn unique_index_name(collection: Collection, field: &str) -> String {
    format!("{}_{}_key", collection.name(), field)
}

fn unique_index_ddl(schema: &str, collection: Collection, field: &str) -> String {
    format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ((doc->>'{}')) WHERE doc->>'{}' IS NOT NULL",
        quote_ident(&unique_index_name(collection, field)),
        qualified_table(schema, collection),
        field,
        field
    )
}

fn field_from_index_name(collection: Collection, index: &str) -> Option<&'static str> {
    collection
        .unique_fields()
        .iter()
        .copied()
        .find(|f| unique_index_name(collection, f) == index)
}

fn row_to_record((id, doc): (String, Value)) -> Result<Record, AppError> {
    match doc {
        Value::Object(doc) => Ok(Record { id, doc }),
        _ => Err(AppError::Store(format!("document {} is not a JSON object", id))),
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn create(&self, collection: Collection, doc: Document) -> Result<Record, AppError> {
        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2) RETURNING id, doc", self.table(collection));
        tracing::debug!(sql = %sql, "query");
        let row: (String, Value) = sqlx::query_as(&sql)
            .bind(new_id())
            .bind(Value::Object(doc))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(collection, e))?;
        row_to_record(row)
    }

    async fn find_by_id(&self, collection: Collection, id: &str) -> Result<Option<Record>, AppError> {
        let sql = format!("SELECT id, doc FROM {} WHERE id = $1", self.table(collection));
        tracing::debug!(sql = %sql, id = %id, "query");
        let row: Option<(String, Value)> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(row_to_record).transpose()
    }

    async fn find(&self, collection: Collection, filter: &Document) -> Result<Vec<Record>, AppError> {
        let sql = format!(
            "SELECT id, doc FROM {} WHERE doc @> $1 ORDER BY created_at, id",
            self.table(collection)
        );
        tracing::debug!(sql = %sql, filter = ?filter, "query");
        let rows: Vec<(String, Value)> = sqlx::query_as(&sql)
            .bind(Value::Object(filter.clone()))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_record).collect()
    }

    async fn save(&self, collection: Collection, record: &Record) -> Result<Record, AppError> {
        let sql = format!(
            "UPDATE {} SET doc = $2, updated_at = NOW() WHERE id = $1 RETURNING id, doc",
            self.table(collection)
        );
        tracing::debug!(sql = %sql, id = %record.id, "query");
        let row: Option<(String, Value)> = sqlx::query_as(&sql)
            .bind(&record.id)
            .bind(Value::Object(record.doc.clone()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(collection, e))?;
        row_to_record(row.ok_or(AppError::NotFound(collection.label()))?)
    }

    async fn find_by_id_and_delete(&self, collection: Collection, id: &str) -> Result<Option<Record>, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING id, doc", self.table(collection));
        tracing::debug!(sql = %sql, id = %id, "query");
        let row: Option<(String, Value)> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(row_to_record).transpose()
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Create the database named in `database_url` when it is missing, using a maintenance connection
/// to `postgres`. Runs before the main pool is built.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let opts = PgConnectOptions::from_str(database_url).map_err(|_| ConfigError::Invalid {
        key: "DATABASE_URL",
        value: database_url.to_string(),
    })?;
    let Some(db_name) = target_database(&opts) else {
        return Ok(());
    };
    let mut conn = opts.database("postgres").connect().await?;
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Database that must exist before connecting; `None` for the maintenance database itself.
fn target_database(opts: &PgConnectOptions) -> Option<String> {
    opts.get_database()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "postgres")
        .map(str::to_string)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
