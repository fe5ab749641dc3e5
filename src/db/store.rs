//! Local object store over the SQLite collections.
//!
//! Every operation has a fallible form returning `AppError`. The page-facing
//! `fetch`/`fetch_all` log failures and degrade to absent/empty.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use std::path::Path;

use super::{init_database, Collection, Record};
use crate::errors::AppError;

/// Handle to the local store. Cheap to clone.
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (and migrate) the store file at `path`.
    pub async fn open(path: &Path) -> Result<Self, AppError> {
        let pool = init_database(path).await?;
        Ok(Self::new(pool))
    }

    // ==================== RAW DOCUMENTS ====================

    /// Get one document by id.
    pub async fn get_raw(&self, collection: Collection, id: &str) -> Result<Option<Value>, AppError> {
        let sql = format!("SELECT body FROM {} WHERE id = ?", collection.table());
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.try_get("body")?;
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    /// Full scan of a collection, in key order.
    pub async fn get_all_raw(&self, collection: Collection) -> Result<Vec<Value>, AppError> {
        let sql = format!("SELECT body FROM {} ORDER BY id", collection.table());
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let body: String = row.try_get("body")?;
            documents.push(serde_json::from_str(&body)?);
        }
        Ok(documents)
    }

    /// Upsert a document keyed by its `id` field.
    pub async fn save_raw(&self, collection: Collection, document: &Value) -> Result<(), AppError> {
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::Validation(format!("Document in {} has no string id", collection))
            })?;

        let body = serde_json::to_string(document)?;
        self.upsert(collection, id, &body).await
    }

    async fn upsert(&self, collection: Collection, id: &str, body: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let sql = format!(
            "INSERT INTO {} (id, body, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            collection.table()
        );

        sqlx::query(&sql)
            .bind(id)
            .bind(body)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a document. Returns whether it existed.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", collection.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== TYPED RECORDS ====================

    /// Get a record by id.
    pub async fn get<T: Record>(&self, id: &str) -> Result<Option<T>, AppError> {
        match self.get_raw(T::COLLECTION, id).await? {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }

    /// All records of the type's collection.
    ///
    /// Documents that do not decode into `T` are skipped.
    pub async fn get_all<T: Record>(&self) -> Result<Vec<T>, AppError> {
        let documents = self.get_all_raw(T::COLLECTION).await?;

        Ok(documents
            .into_iter()
            .filter_map(|document| match serde_json::from_value(document) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!("Skipping undecodable {} document: {}", T::COLLECTION, e);
                    None
                }
            })
            .collect())
    }

    /// Upsert a record by id.
    pub async fn save<T: Record>(&self, record: &T) -> Result<(), AppError> {
        if record.id().is_empty() {
            return Err(AppError::Validation(format!(
                "Cannot save {} record without id",
                T::COLLECTION
            )));
        }
        let body = serde_json::to_string(record)?;
        self.upsert(T::COLLECTION, record.id(), &body).await
    }

    /// Delete a record of the type's collection.
    pub async fn remove<T: Record>(&self, id: &str) -> Result<bool, AppError> {
        self.delete(T::COLLECTION, id).await
    }

    // ==================== DEGRADING READS ====================

    /// Like [`LocalStore::get`], logging failures and returning `None`.
    pub async fn fetch<T: Record>(&self, id: &str) -> Option<T> {
        match self.get(id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Read of {}/{} failed: {}", T::COLLECTION, id, e);
                None
            }
        }
    }

    /// Like [`LocalStore::get_all`], logging failures and returning an empty list.
    pub async fn fetch_all<T: Record>(&self) -> Vec<T> {
        match self.get_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Scan of {} failed: {}", T::COLLECTION, e);
                Vec::new()
            }
        }
    }

    // ==================== META ====================

    /// Recorded schema version.
    pub async fn schema_version(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT schema_version FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("schema_version")?)
    }

    /// Timestamp of the last applied seed dataset.
    pub async fn last_synced(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let row = sqlx::query("SELECT last_synced FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("last_synced")?)
    }

    pub async fn set_last_synced(&self, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE meta SET last_synced = ? WHERE id = 1")
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: Collection) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) AS n FROM {}", collection.table());
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        Ok(row.try_get("n")?)
    }
}
