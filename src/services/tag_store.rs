//! src/services/tag_store.rs
//!
//! TagStore — persists object tags in SQLite. Each event invocation opens a
//! `TagSession` (one pooled connection) and writes tag-sets through it; the
//! read side serves `GET /tags/{bucket}/{*key}`.
//!
//! Unversioned objects are stored with an empty `version_id` column so the
//! composite primary key covers them too.

use crate::{
    models::{
        object::entity_path,
        tag::{StoredTag, TagDecision, TagOutput},
    },
    services::tag_client::{TagClient, TagClientError, TagClientFactory},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Connection, Sqlite, SqlitePool, pool::PoolConnection};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Schema for the tag table, applied by `--migrate` and at startup.
pub const INIT_MIGRATION: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Error)]
pub enum TagStoreError {
    #[error("no tags found for `{0}`")]
    NotFound(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type TagStoreResult<T> = Result<T, TagStoreError>;

#[derive(Clone)]
pub struct TagStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl TagStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Run the embedded migration statements. Safe to repeat.
    pub async fn run_migrations(&self) -> TagStoreResult<()> {
        let statements = INIT_MIGRATION
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        debug!("Running {} migration statements...", statements.len());

        for stmt in statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&*self.db).await?;
        }
        Ok(())
    }

    /// Open a tagging session on a dedicated pooled connection.
    pub async fn session(&self) -> Result<TagSession, TagClientError> {
        let conn = self.db.acquire().await?;
        Ok(TagSession { conn })
    }

    /// Fetch the tag-set of one object, ordered by tag key.
    ///
    /// Returns NotFound when the object carries no tags.
    pub async fn get_tags(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> TagStoreResult<Vec<StoredTag>> {
        let rows = sqlx::query_as::<_, StoredTag>(
            "SELECT bucket, object_key, version_id, tag_key, tag_value, tagged_at
             FROM object_tags
             WHERE bucket = ? AND object_key = ? AND version_id = ?
             ORDER BY tag_key ASC",
        )
        .bind(bucket)
        .bind(key)
        .bind(version_id.unwrap_or(""))
        .fetch_all(&*self.db)
        .await?;

        if rows.is_empty() {
            return Err(TagStoreError::NotFound(entity_path(bucket, key)));
        }
        Ok(rows)
    }
}

#[async_trait]
impl TagClientFactory for TagStore {
    async fn open(&self) -> Result<Box<dyn TagClient>, TagClientError> {
        Ok(Box::new(self.session().await?))
    }
}

/// A tagging session bound to one connection for the length of an event.
pub struct TagSession {
    conn: PoolConnection<Sqlite>,
}

#[async_trait]
impl TagClient for TagSession {
    /// Replace the object's tag-set with the decision's single tag.
    async fn apply_tag(&mut self, decision: &TagDecision) -> Result<TagOutput, TagClientError> {
        let version = decision.version_id.as_deref().unwrap_or("");
        let tagged_at = Utc::now();

        let mut tx = self.conn.begin().await?;
        sqlx::query(
            "DELETE FROM object_tags
             WHERE bucket = ? AND object_key = ? AND version_id = ?",
        )
        .bind(&decision.bucket)
        .bind(&decision.key)
        .bind(version)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "INSERT INTO object_tags (bucket, object_key, version_id, tag_key, tag_value, tagged_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&decision.bucket)
        .bind(&decision.key)
        .bind(version)
        .bind(&decision.tag.key)
        .bind(&decision.tag.value)
        .bind(tagged_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(TagOutput {
            version_id: decision.version_id.clone(),
            tagged_at,
        })
    }
}
