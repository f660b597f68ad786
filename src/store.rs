use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub mod courses;
pub mod migrations;
pub mod progress;
pub mod rows;

/// SQLite-backed store for the course graph and per-course learner progress.
/// Rows keep nested composites (tags, checkpoints, chapter progress maps) as
/// JSON text columns; encoding and decoding happen only in this module.
#[derive(Debug, Clone)]
pub struct CourseStore {
    pub database: SqlitePool,
}

impl CourseStore {
    /// Open or create the database file and bring the schema up to date.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create database directory {}", parent.display()))?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let database = SqlitePool::connect_with(options).await?;
        migrations::run_migrations(&database).await?;
        Ok(Self { database })
    }

    /// In-memory store for tests. A single pooled connection, otherwise each
    /// checkout would see its own empty database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        let database = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        migrations::run_migrations(&database).await?;
        Ok(Self { database })
    }
}

pub(crate) fn encode_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string(value).context("encode json column")
}

pub(crate) fn decode_json<T: DeserializeOwned>(text: &str) -> anyhow::Result<T> {
    serde_json::from_str(text).context("decode json column")
}
