//! Database module for SQLite persistence.
//!
//! The local store keeps object-store semantics: each collection is a table of
//! JSON documents keyed by a string id, with no secondary indexes.

mod store;

pub use store::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Current schema version, recorded in the meta table on open.
pub const SCHEMA_VERSION: i64 = 2;

/// The three named collections of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Works,
    Signals,
    About,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Works, Collection::Signals, Collection::About];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Works => "works",
            Collection::Signals => "signals",
            Collection::About => "about",
        }
    }

    /// Backing table name.
    fn table(&self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = crate::errors::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "works" => Ok(Collection::Works),
            "signals" => Ok(Collection::Signals),
            "about" => Ok(Collection::About),
            other => Err(crate::errors::AppError::Validation(format!(
                "Unknown collection {}",
                other
            ))),
        }
    }
}

/// A document stored in one of the collections.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Create missing tables and bump the recorded schema version.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            last_synced TEXT
        );

        INSERT OR IGNORE INTO meta (id, schema_version, last_synced)
        VALUES (1, 1, NULL);
        "#,
    )
    .execute(pool)
    .await?;

    for collection in Collection::ALL {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
            collection.table()
        );
        sqlx::query(&ddl).execute(pool).await?;
    }

    let upgraded = sqlx::query("UPDATE meta SET schema_version = ? WHERE id = 1 AND schema_version < ?")
        .bind(SCHEMA_VERSION)
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    if upgraded.rows_affected() > 0 {
        tracing::info!("Store schema upgraded to version {}", SCHEMA_VERSION);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(collection.as_str().parse::<Collection>().unwrap(), collection);
        }
        assert!("topics".parse::<Collection>().is_err());
    }
}
