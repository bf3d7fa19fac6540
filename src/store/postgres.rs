//! PostgreSQL implementation of the planning and board repositories

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::instrument;

use super::{BoardRepository, BoardTransaction, PlanningRepository, StoreError};
use crate::domain::{Assignee, Task, TaskStatus, WbsNode, WbsNodeWithTasks, WbsTask};

/// Column list matching `TaskRow`; expects `tasks t` joined with `users u`
pub const TASK_COLUMNS: &str = r#"
    t.id, t.title, t.description, t.status, t.assigned_to_id, u.name AS assignee_name,
    t.due_date, t.position, t.project_id, t.wbs_id,
    t.planned_start_date, t.planned_end_date, t.actual_start_date, t.actual_end_date,
    t.planned_duration_days, t.actual_duration_days, t.progress_percent,
    t.created_at, t.updated_at
"#;

/// Database row for task
#[derive(Debug, sqlx::FromRow)]
pub struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    status: String,
    assigned_to_id: Option<i64>,
    assignee_name: Option<String>,
    due_date: Option<NaiveDate>,
    position: i32,
    project_id: Option<i64>,
    wbs_id: Option<i64>,
    planned_start_date: Option<NaiveDate>,
    planned_end_date: Option<NaiveDate>,
    actual_start_date: Option<NaiveDate>,
    actual_end_date: Option<NaiveDate>,
    planned_duration_days: Option<i32>,
    actual_duration_days: Option<i32>,
    progress_percent: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn assignee(id: Option<i64>, name: Option<String>) -> Option<Assignee> {
    Some(Assignee { id: id?, name: name? })
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status: TaskStatus::from_db(&row.status),
            assignee: assignee(row.assigned_to_id, row.assignee_name),
            assigned_to_id: row.assigned_to_id,
            due_date: row.due_date,
            position: row.position,
            project_id: row.project_id,
            wbs_id: row.wbs_id,
            planned_start_date: row.planned_start_date,
            planned_end_date: row.planned_end_date,
            actual_start_date: row.actual_start_date,
            actual_end_date: row.actual_end_date,
            planned_duration_days: row.planned_duration_days,
            actual_duration_days: row.actual_duration_days,
            progress_percent: row.progress_percent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for WBS node
#[derive(Debug, sqlx::FromRow)]
pub struct WbsRow {
    id: i64,
    project_id: i64,
    parent_id: Option<i64>,
    name: String,
    code: Option<String>,
    phase_type: Option<String>,
    position: i32,
    description: Option<String>,
    planned_start_date: Option<NaiveDate>,
    planned_end_date: Option<NaiveDate>,
}

impl From<WbsRow> for WbsNode {
    fn from(row: WbsRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            parent_id: row.parent_id,
            name: row.name,
            code: row.code,
            phase_type: row.phase_type,
            position: row.position,
            description: row.description,
            planned_start_date: row.planned_start_date,
            planned_end_date: row.planned_end_date,
        }
    }
}

pub const WBS_COLUMNS: &str = r#"
    id, project_id, parent_id, name, code, phase_type, position, description,
    planned_start_date, planned_end_date
"#;

#[derive(Debug, sqlx::FromRow)]
struct WbsTaskRow {
    id: i64,
    wbs_id: i64,
    title: String,
    status: String,
    progress_percent: Option<Decimal>,
    planned_start_date: Option<NaiveDate>,
    planned_end_date: Option<NaiveDate>,
    position: i32,
    assigned_to_id: Option<i64>,
    assignee_name: Option<String>,
}

impl From<WbsTaskRow> for WbsTask {
    fn from(row: WbsTaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            status: TaskStatus::from_db(&row.status),
            progress_percent: row.progress_percent,
            planned_start_date: row.planned_start_date,
            planned_end_date: row.planned_end_date,
            position: row.position,
            assignee: assignee(row.assigned_to_id, row.assignee_name),
        }
    }
}

/// Repository backed by the shared connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanningRepository for PgStore {
    #[instrument(skip(self))]
    async fn wbs_nodes_with_tasks(
        &self,
        project_id: i64,
    ) -> Result<Vec<WbsNodeWithTasks>, StoreError> {
        let nodes = sqlx::query_as::<_, WbsRow>(&format!(
            "SELECT {WBS_COLUMNS} FROM work_breakdown_structures \
             WHERE project_id = $1 ORDER BY position, id"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        let node_ids: Vec<i64> = nodes.iter().map(|n| n.id).collect();

        let task_rows = sqlx::query_as::<_, WbsTaskRow>(
            r#"
            SELECT t.id, t.wbs_id, t.title, t.status, t.progress_percent,
                   t.planned_start_date, t.planned_end_date, t.position,
                   t.assigned_to_id, u.name AS assignee_name
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to_id
            WHERE t.wbs_id = ANY($1)
            ORDER BY t.position, t.id
            "#,
        )
        .bind(&node_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut tasks_by_node: HashMap<i64, Vec<WbsTask>> = HashMap::new();
        for row in task_rows {
            tasks_by_node.entry(row.wbs_id).or_default().push(row.into());
        }

        tracing::debug!(
            project_id,
            nodes = nodes.len(),
            "Loaded WBS nodes for planning tree"
        );

        Ok(nodes
            .into_iter()
            .map(|row| {
                let tasks = tasks_by_node.remove(&row.id).unwrap_or_default();
                WbsNodeWithTasks {
                    node: row.into(),
                    tasks,
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn task(&self, task_id: i64) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t \
             LEFT JOIN users u ON u.id = t.assigned_to_id \
             WHERE t.id = $1"
        ))
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}

/// Board write transaction; rolls back when dropped uncommitted
pub struct PgBoardTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BoardRepository for PgStore {
    type Tx = PgBoardTx;

    async fn begin(&self) -> Result<PgBoardTx, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(PgBoardTx { tx })
    }
}

#[async_trait]
impl BoardTransaction for PgBoardTx {
    async fn place_task(
        &mut self,
        task_id: i64,
        status: TaskStatus,
        position: i32,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE tasks SET status = $2, position = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(task_id)
        .bind(status.as_str())
        .bind(position)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::TaskNotFound(task_id));
        }

        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
