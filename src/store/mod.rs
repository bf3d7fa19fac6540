//! Persistence seam for the planning tree and the task board
//!
//! The tree builder and board reorder only talk to these traits. `PgStore`
//! backs them with PostgreSQL; tests use an in-memory store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Task, TaskStatus, WbsNodeWithTasks};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    TaskNotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read access used by the planning view
#[async_trait]
pub trait PlanningRepository: Send + Sync {
    /// All WBS nodes of a project, each with its tasks, ordered by position
    async fn wbs_nodes_with_tasks(&self, project_id: i64)
        -> Result<Vec<WbsNodeWithTasks>, StoreError>;

    async fn task(&self, task_id: i64) -> Result<Option<Task>, StoreError>;
}

/// Opens write transactions over board placement
#[async_trait]
pub trait BoardRepository: Send + Sync {
    type Tx: BoardTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// A unit of board writes
///
/// Dropping a transaction without calling `commit` discards its writes.
#[async_trait]
pub trait BoardTransaction: Send + Sized {
    /// Moves a task into a status column at the given position
    async fn place_task(
        &mut self,
        task_id: i64,
        status: TaskStatus,
        position: i32,
    ) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;
}
