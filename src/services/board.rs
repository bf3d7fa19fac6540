//! Task board reorder and column grouping
//!
//! The board client sends the full id list of every column it touched after a
//! drag and drop. Each listed task takes the column's status and its 1-based
//! index as position, all inside one transaction.
//!
//! Two clients reordering the same column at the same time are not
//! coordinated: both transactions commit and the last one wins.

use serde::{Deserialize, Serialize};

use crate::domain::{Task, TaskStatus};
use crate::store::{BoardRepository, BoardTransaction, StoreError};

/// One board column as submitted by the client
#[derive(Debug, Clone, Deserialize)]
pub struct BoardColumn {
    pub status: TaskStatus,
    #[serde(default)]
    pub task_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest {
    pub columns: Vec<BoardColumn>,
}

/// Target placement of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub task_id: i64,
    pub status: TaskStatus,
    pub position: i32,
}

/// Expands columns into per-task placements, in submission order
pub fn placements(columns: &[BoardColumn]) -> Vec<Placement> {
    columns
        .iter()
        .flat_map(|column| {
            column
                .task_ids
                .iter()
                .zip(1..)
                .map(move |(&task_id, position)| Placement {
                    task_id,
                    status: column.status,
                    position,
                })
        })
        .collect()
}

/// Applies a board reorder atomically.
///
/// Input is trusted: statuses come from the closed enum and ids were checked
/// by the caller. If any write fails, the transaction is dropped without
/// commit and nothing is persisted. Returns the number of tasks placed.
pub async fn reorder<R>(repo: &R, columns: &[BoardColumn]) -> Result<usize, StoreError>
where
    R: BoardRepository + ?Sized,
{
    let placements = placements(columns);
    let mut tx = repo.begin().await?;

    for p in &placements {
        tx.place_task(p.task_id, p.status, p.position).await?;
    }

    tx.commit().await?;

    tracing::info!(
        columns = columns.len(),
        tasks = placements.len(),
        "Board order updated"
    );

    Ok(placements.len())
}

/// Board column with its tasks, for the board view
#[derive(Debug, Clone, Serialize)]
pub struct BoardSection {
    pub key: TaskStatus,
    pub title: &'static str,
    pub tasks: Vec<Task>,
}

/// Groups tasks into one section per status, in column order.
///
/// Every status gets a section, even when empty. Task order within a section
/// is the order of `tasks`.
pub fn sections(tasks: Vec<Task>) -> Vec<BoardSection> {
    let mut sections: Vec<BoardSection> = TaskStatus::ALL
        .into_iter()
        .map(|status| BoardSection {
            key: status,
            title: status.label(),
            tasks: Vec::new(),
        })
        .collect();

    for task in tasks {
        if let Some(section) = sections.iter_mut().find(|s| s.key == task.status) {
            section.tasks.push(task);
        }
    }

    sections
}
