/// Storage abstraction and SQLite persistence
///
/// The `Storage` trait is the single seam between the API/simulator and
/// whatever holds workflow and test-run state. The default deployment uses the
/// in-memory store; this module also provides a SQLite implementation with
/// workflows and runs stored as JSON for flexibility while keeping structured
/// lookup columns.

use crate::workflow::types::{
    new_run_id, InsertWorkflow, NewTestRun, TestRun, TestRunPatch, Workflow, WorkflowPatch,
};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};

/// Persistence seam for workflows and their test runs
///
/// Reads return clones of stored state; repeated reads of an unmodified
/// entity serialize byte-identically. Updates are partial: absent fields keep
/// their stored values, and ids never change.
#[async_trait]
pub trait Storage: Send + Sync {
    /// All workflows, insertion order
    async fn list_workflows(&self) -> Result<Vec<Workflow>>;

    /// A single workflow by id
    async fn get_workflow(&self, id: &str) -> Result<Option<Workflow>>;

    /// Persist a new workflow with a generated id
    async fn create_workflow(&self, insert: InsertWorkflow) -> Result<Workflow>;

    /// Apply a partial update; None when the id is unknown
    async fn update_workflow(&self, id: &str, patch: WorkflowPatch) -> Result<Option<Workflow>>;

    /// Delete a workflow; false when the id is unknown. Historical test runs
    /// are retained.
    async fn delete_workflow(&self, id: &str) -> Result<bool>;

    /// All test runs for a workflow, insertion order
    async fn list_test_runs(&self, workflow_id: &str) -> Result<Vec<TestRun>>;

    /// A single test run by id
    async fn get_test_run(&self, id: &str) -> Result<Option<TestRun>>;

    /// Persist a new test run with a generated id
    async fn create_test_run(&self, new_run: NewTestRun) -> Result<TestRun>;

    /// Apply a partial update; None when the id is unknown
    async fn update_test_run(&self, id: &str, patch: TestRunPatch) -> Result<Option<TestRun>>;
}

/// SQLite-backed storage
///
/// Workflow and run definitions live in JSON columns keyed by id; an indexed
/// `workflow_id` column serves the per-workflow run listing. Insertion order
/// falls out of rowid ordering.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a storage instance over an existing connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                definition JSON NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS test_runs (
                id TEXT PRIMARY KEY,
                workflow_id TEXT NOT NULL,
                definition JSON NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_test_runs_workflow
            ON test_runs(workflow_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a workflow, updating in place when the id already exists
    async fn save_workflow(&self, workflow: &Workflow) -> Result<()> {
        let definition_json = serde_json::to_string(workflow)?;

        sqlx::query(
            r#"
            INSERT INTO workflows (id, name, definition, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                definition = excluded.definition,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&workflow.id)
        .bind(&workflow.name)
        .bind(&definition_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a test run, updating in place when the id already exists
    async fn save_test_run(&self, run: &TestRun) -> Result<()> {
        let definition_json = serde_json::to_string(run)?;

        sqlx::query(
            r#"
            INSERT INTO test_runs (id, workflow_id, definition)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                definition = excluded.definition
            "#,
        )
        .bind(&run.id)
        .bind(&run.workflow_id)
        .bind(&definition_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        let rows = sqlx::query("SELECT definition FROM workflows ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        let mut workflows = Vec::with_capacity(rows.len());
        for row in rows {
            let definition_json: String = row.get("definition");
            workflows.push(serde_json::from_str(&definition_json)?);
        }

        Ok(workflows)
    }

    async fn get_workflow(&self, id: &str) -> Result<Option<Workflow>> {
        let row = sqlx::query("SELECT definition FROM workflows WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let definition_json: String = row.get("definition");
                Ok(Some(serde_json::from_str(&definition_json)?))
            }
            None => Ok(None),
        }
    }

    async fn create_workflow(&self, insert: InsertWorkflow) -> Result<Workflow> {
        let workflow = Workflow::from_insert(insert);
        self.save_workflow(&workflow).await?;
        Ok(workflow)
    }

    async fn update_workflow(&self, id: &str, patch: WorkflowPatch) -> Result<Option<Workflow>> {
        let Some(mut workflow) = self.get_workflow(id).await? else {
            return Ok(None);
        };

        workflow.apply_patch(patch);
        self.save_workflow(&workflow).await?;
        Ok(Some(workflow))
    }

    async fn delete_workflow(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_test_runs(&self, workflow_id: &str) -> Result<Vec<TestRun>> {
        let rows =
            sqlx::query("SELECT definition FROM test_runs WHERE workflow_id = ? ORDER BY rowid")
                .bind(workflow_id)
                .fetch_all(&self.pool)
                .await?;

        let mut runs = Vec::with_capacity(rows.len());
        for row in rows {
            let definition_json: String = row.get("definition");
            runs.push(serde_json::from_str(&definition_json)?);
        }

        Ok(runs)
    }

    async fn get_test_run(&self, id: &str) -> Result<Option<TestRun>> {
        let row = sqlx::query("SELECT definition FROM test_runs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let definition_json: String = row.get("definition");
                Ok(Some(serde_json::from_str(&definition_json)?))
            }
            None => Ok(None),
        }
    }

    async fn create_test_run(&self, new_run: NewTestRun) -> Result<TestRun> {
        let run = new_run.into_run(new_run_id());
        self.save_test_run(&run).await?;
        Ok(run)
    }

    async fn update_test_run(&self, id: &str, patch: TestRunPatch) -> Result<Option<TestRun>> {
        let Some(mut run) = self.get_test_run(id).await? else {
            return Ok(None);
        };

        run.apply_patch(patch);
        self.save_test_run(&run).await?;
        Ok(Some(run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::{RunStatus, WorkflowStatus};
    use chrono::Utc;
    use sqlx::sqlite::SqlitePoolOptions;

    // A single-connection pool keeps every query on the same :memory: db.
    async fn storage() -> SqliteStorage {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let storage = SqliteStorage::new(pool);
        storage.init_schema().await.unwrap();
        storage
    }

    fn insert(name: &str) -> InsertWorkflow {
        InsertWorkflow {
            name: name.to_string(),
            description: String::new(),
            nodes: Vec::new(),
            connections: Vec::new(),
            status: WorkflowStatus::Draft,
        }
    }

    #[tokio::test]
    async fn workflow_crud_round_trips() {
        let storage = storage().await;

        let created = storage.create_workflow(insert("X")).await.unwrap();
        let fetched = storage.get_workflow(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let updated = storage
            .update_workflow(
                &created.id,
                WorkflowPatch {
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Renamed");

        assert!(storage.delete_workflow(&created.id).await.unwrap());
        assert!(!storage.delete_workflow(&created.id).await.unwrap());
        assert!(storage.get_workflow(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_runs_list_per_workflow_in_insertion_order() {
        let storage = storage().await;
        let workflow = storage.create_workflow(insert("w")).await.unwrap();

        let mut ids = Vec::new();
        for _ in 0..2 {
            let run = storage
                .create_test_run(NewTestRun {
                    workflow_id: workflow.id.clone(),
                    status: RunStatus::Running,
                    results: Vec::new(),
                    started_at: Utc::now(),
                })
                .await
                .unwrap();
            ids.push(run.id);
        }

        let listed: Vec<String> = storage
            .list_test_runs(&workflow.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, ids);

        let finished = storage
            .update_test_run(
                &ids[0],
                TestRunPatch {
                    status: Some(RunStatus::Completed),
                    completed_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(finished.status, RunStatus::Completed);
        assert!(finished.completed_at.is_some());
    }
}
