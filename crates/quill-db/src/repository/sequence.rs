//! # Sequence Counter Repository
//!
//! The SQLite implementation of [`SequenceBackend`]: the atomic counter
//! increment and the document-number existence check.
//!
//! ## The Atomic Increment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   INSERT INTO sequence_counters (owner_id, year, prefix, last)  │
//! │   VALUES (?, ?, ?, 1)                                           │
//! │   ON CONFLICT (owner_id, year, prefix)                          │
//! │       DO UPDATE SET last = last + 1                             │
//! │   RETURNING last                                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//! One statement: create-at-1 on first use, increment-and-read after.
//! SQLite serializes writers, so two concurrent callers can never
//! observe the same post-increment value - this is the entire
//! uniqueness guarantee for document numbers. The counter must never
//! be read, incremented in Rust, and written back as separate
//! statements.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use quill_core::{DocumentKind, SequenceBackend};

/// Repository for sequence counter operations.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: SqlitePool,
}

impl SequenceRepository {
    /// Creates a new SequenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SequenceRepository { pool }
    }

    /// Reads the current counter value without incrementing it, if the
    /// counter row exists yet. For diagnostics and tests only.
    pub async fn current(
        &self,
        owner_id: &str,
        year: i32,
        kind: DocumentKind,
    ) -> DbResult<Option<i64>> {
        let last: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT last FROM sequence_counters
            WHERE owner_id = ?1 AND year = ?2 AND prefix = ?3
            "#,
        )
        .bind(owner_id)
        .bind(year)
        .bind(kind.prefix())
        .fetch_optional(&self.pool)
        .await?;

        Ok(last)
    }
}

impl SequenceBackend for SequenceRepository {
    type Error = DbError;

    async fn increment(
        &self,
        owner_id: &str,
        year: i32,
        kind: DocumentKind,
    ) -> Result<i64, DbError> {
        let last: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sequence_counters (owner_id, year, prefix, last)
            VALUES (?1, ?2, ?3, 1)
            ON CONFLICT (owner_id, year, prefix) DO UPDATE SET last = last + 1
            RETURNING last
            "#,
        )
        .bind(owner_id)
        .bind(year)
        .bind(kind.prefix())
        .fetch_one(&self.pool)
        .await?;

        debug!(owner_id, year, prefix = kind.prefix(), last, "incremented sequence counter");
        Ok(last)
    }

    async fn number_exists(&self, owner_id: &str, number: &str) -> Result<bool, DbError> {
        let found: i64 = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM documents WHERE owner_id = ?1 AND number = ?2
            )
            "#,
        )
        .bind(owner_id)
        .bind(number)
        .fetch_one(&self.pool)
        .await?;

        Ok(found != 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
