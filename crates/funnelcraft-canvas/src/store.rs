//! Element Store
//!
//! Step-scoped persistence contract plus in-memory and SQLite backends.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::element::{Element, ElementList, StepId};
use crate::error::{Error, Result};

/// Persisted, step-scoped element storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ElementStore: Send + Sync {
    /// Load the persisted list for `step_id`. A step never saved loads empty.
    async fn get_elements(&self, step_id: &StepId) -> Result<ElementList>;

    /// Replace the persisted list for `step_id`
    async fn set_elements(&self, step_id: &StepId, elements: &[Element]) -> Result<()>;
}

/// In-memory store, optionally slow or failing
#[derive(Debug, Default)]
pub struct MemoryElementStore {
    steps: RwLock<HashMap<StepId, ElementList>>,
    writes: RwLock<Vec<(StepId, ElementList)>>,
    reads: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    latency: Option<Duration>,
}

impl MemoryElementStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Seed a step without recording a write
    pub async fn seed(&self, step_id: impl Into<StepId>, elements: ElementList) {
        self.steps.write().await.insert(step_id.into(), elements);
    }

    /// Make subsequent loads fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent saves fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every successful `set_elements` call, in order
    pub async fn writes(&self) -> Vec<(StepId, ElementList)> {
        self.writes.read().await.clone()
    }

    /// Successful writes for one step
    pub async fn writes_for(&self, step_id: &StepId) -> Vec<ElementList> {
        self.writes
            .read()
            .await
            .iter()
            .filter(|(id, _)| id == step_id)
            .map(|(_, list)| list.clone())
            .collect()
    }

    /// Number of `get_elements` calls
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Current persisted list for a step
    pub async fn snapshot(&self, step_id: &StepId) -> ElementList {
        self.steps
            .read()
            .await
            .get(step_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ElementStore for MemoryElementStore {
    async fn get_elements(&self, step_id: &StepId) -> Result<ElementList> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::storage(step_id, "read rejected"));
        }
        Ok(self.snapshot(step_id).await)
    }

    async fn set_elements(&self, step_id: &StepId, elements: &[Element]) -> Result<()> {
        self.delay().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::storage(step_id, "write rejected"));
        }
        self.steps
            .write()
            .await
            .insert(step_id.clone(), elements.to_vec());
        self.writes
            .write()
            .await
            .push((step_id.clone(), elements.to_vec()));
        Ok(())
    }
}

/// SQLite-backed element store
pub struct SqliteElementStore {
    pool: SqlitePool,
}

impl SqliteElementStore {
    /// Create a new store with the given database pool
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS step_elements (
                step_id TEXT PRIMARY KEY,
                elements_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List every stored step id
    pub async fn list_steps(&self) -> Result<Vec<StepId>> {
        let rows = sqlx::query(
            r#"
            SELECT step_id FROM step_elements ORDER BY step_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| StepId(row.get::<String, _>("step_id")))
            .collect())
    }

    /// Delete a step's elements
    pub async fn delete_step(&self, step_id: &StepId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM step_elements WHERE step_id = ?
            "#,
        )
        .bind(step_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ElementStore for SqliteElementStore {
    async fn get_elements(&self, step_id: &StepId) -> Result<ElementList> {
        let row = sqlx::query(
            r#"
            SELECT elements_json FROM step_elements WHERE step_id = ?
            "#,
        )
        .bind(step_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let json: String = row.get("elements_json");
                Ok(serde_json::from_str(&json)?)
            }
            None => {
                debug!(step_id = %step_id, "No stored elements for step");
                Ok(Vec::new())
            }
        }
    }

    async fn set_elements(&self, step_id: &StepId, elements: &[Element]) -> Result<()> {
        let json = serde_json::to_string(elements)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO step_elements (step_id, elements_json, updated_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(step_id.as_str())
        .bind(&json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqliteElementStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let store = SqliteElementStore::new(pool);
        store.init().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_sqlite_missing_step_is_empty() {
        let store = setup_test_db().await;
        let list = store.get_elements(&StepId::from("nope")).await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_save_and_load() {
        let store = setup_test_db().await;
        let step = StepId::from("landing");
        let list = vec![
            Element::new(ElementKind::Heading),
            Element::new(ElementKind::Button),
        ];

        tokio_test::assert_ok!(store.set_elements(&step, &list).await);
        assert_eq!(store.get_elements(&step).await.unwrap(), list);

        let shorter = vec![list[1].clone()];
        store.set_elements(&step, &shorter).await.unwrap();
        assert_eq!(store.get_elements(&step).await.unwrap(), shorter);
    }

    #[tokio::test]
    async fn test_sqlite_list_and_delete() {
        let store = setup_test_db().await;
        store
            .set_elements(&StepId::from("b"), &[Element::new(ElementKind::Text)])
            .await
            .unwrap();
        store.set_elements(&StepId::from("a"), &[]).await.unwrap();

        let steps = store.list_steps().await.unwrap();
        assert_eq!(steps, vec![StepId::from("a"), StepId::from("b")]);

        assert!(store.delete_step(&StepId::from("a")).await.unwrap());
        assert!(!store.delete_step(&StepId::from("a")).await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_records_writes() {
        let store = MemoryElementStore::new();
        let step = StepId::from("s1");
        let list = vec![Element::new(ElementKind::Text)];

        store.set_elements(&step, &list).await.unwrap();
        assert_eq!(store.writes_for(&step).await, vec![list.clone()]);
        assert_eq!(store.get_elements(&step).await.unwrap(), list);
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_failures() {
        let store = MemoryElementStore::new();
        let step = StepId::from("s1");
        store.seed("s1", vec![Element::new(ElementKind::Text)]).await;

        store.fail_reads(true);
        tokio_test::assert_err!(store.get_elements(&step).await);

        store.fail_writes(true);
        let err = store.set_elements(&step, &[]).await.unwrap_err();
        assert_eq!(err.code(), "storage_error");
        assert!(store.writes().await.is_empty());
        assert_eq!(store.snapshot(&step).await.len(), 1);
    }
}
