//! SQLite implementation of the `Archive` trait.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::debug;

use commandsvc_core::archive::{Archive, ArchiveKey, ArchiveRecord};
use commandsvc_core::error::ArchiveError;

use crate::schema::{CREATE_NAMESPACES_TABLE, CREATE_RECORDS_TABLE};

// Writes and the namespace check happen in one statement so the transaction
// takes the write lock up front instead of upgrading from a read snapshot.
const UPSERT_RECORD: &str = r"
INSERT INTO archive_records (namespace, key, value)
SELECT name, ?, ? FROM archive_namespaces WHERE name = ?
ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value
";

/// SQLite-backed archive bound to one namespace.
#[derive(Debug, Clone)]
pub struct SqliteArchive {
    pool: SqlitePool,
    namespace: String,
}

impl SqliteArchive {
    /// Creates an archive over an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    /// Opens (creating if missing) the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::Connect` if the URL is invalid or the database
    /// cannot be opened.
    pub async fn connect(url: &str, namespace: impl Into<String>) -> Result<Self, ArchiveError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| ArchiveError::Connect(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| ArchiveError::Connect(e.to_string()))?;
        Ok(Self::new(pool, namespace))
    }

    /// Opens a private in-memory database.
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// every SQLite in-memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::Connect` if the database cannot be opened.
    pub async fn in_memory(namespace: impl Into<String>) -> Result<Self, ArchiveError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| ArchiveError::Connect(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| ArchiveError::Connect(e.to_string()))?;
        Ok(Self::new(pool, namespace))
    }

    /// Returns an archive over the same database bound to another namespace.
    #[must_use]
    pub fn with_namespace(&self, namespace: impl Into<String>) -> Self {
        Self::new(self.pool.clone(), namespace)
    }

    /// Returns the namespace this archive writes to.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl Archive for SqliteArchive {
    async fn ensure_namespace(&self) -> Result<(), ArchiveError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ArchiveError::Begin(e.to_string()))?;
        for ddl in [CREATE_NAMESPACES_TABLE, CREATE_RECORDS_TABLE] {
            sqlx::query(ddl)
                .execute(&mut *tx)
                .await
                .map_err(|e| ArchiveError::Write(e.to_string()))?;
        }
        sqlx::query("INSERT INTO archive_namespaces (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
            .bind(&self.namespace)
            .execute(&mut *tx)
            .await
            .map_err(|e| ArchiveError::Write(e.to_string()))?;
        tx.commit()
            .await
            .map_err(|e| ArchiveError::Commit(e.to_string()))?;
        debug!(namespace = %self.namespace, "archive namespace ready");
        Ok(())
    }

    async fn put(&self, key: &ArchiveKey, value: &[u8]) -> Result<(), ArchiveError> {
        // An uncommitted transaction rolls back when dropped, so every early
        // return and unwind below leaves no partial record.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ArchiveError::Begin(e.to_string()))?;
        let result = sqlx::query(UPSERT_RECORD)
            .bind(key.as_bytes().as_slice())
            .bind(value)
            .bind(&self.namespace)
            .execute(&mut *tx)
            .await
            .map_err(|e| ArchiveError::Write(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(ArchiveError::MissingNamespace(self.namespace.clone()));
        }
        tx.commit()
            .await
            .map_err(|e| ArchiveError::Commit(e.to_string()))?;
        debug!(
            namespace = %self.namespace,
            key = key.nanos(),
            bytes = value.len(),
            "archived record"
        );
        Ok(())
    }

    async fn get(&self, key: &ArchiveKey) -> Result<Option<Vec<u8>>, ArchiveError> {
        sqlx::query_scalar::<_, Vec<u8>>(
            "SELECT value FROM archive_records WHERE namespace = ? AND key = ?",
        )
        .bind(&self.namespace)
        .bind(key.as_bytes().as_slice())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ArchiveError::Read(e.to_string()))
    }

    async fn scan(&self, from: Option<&ArchiveKey>) -> Result<Vec<ArchiveRecord>, ArchiveError> {
        let lower: &[u8] = from.map_or(&[][..], |key| key.as_bytes().as_slice());
        let rows = sqlx::query_as::<_, (Vec<u8>, Vec<u8>)>(
            "SELECT key, value FROM archive_records WHERE namespace = ? AND key >= ? ORDER BY key",
        )
        .bind(&self.namespace)
        .bind(lower)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ArchiveError::Read(e.to_string()))?;

        rows.into_iter()
            .map(|(key, value)| {
                Ok(ArchiveRecord {
                    key: ArchiveKey::from_bytes(&key)?,
                    value,
                })
            })
            .collect()
    }
}
