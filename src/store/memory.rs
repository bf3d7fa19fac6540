//! In-memory board store for tests
//!
//! Writes are staged inside the transaction and only reach the shared map on
//! commit. A task id can be marked as failing to simulate a row vanishing
//! between validation and commit.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::{BoardRepository, BoardTransaction, StoreError};
use crate::domain::TaskStatus;

/// Board placement of a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub status: TaskStatus,
    pub position: i32,
}

#[derive(Default)]
pub struct MemoryStore {
    board: Arc<Mutex<BTreeMap<i64, Placement>>>,
    failing: Mutex<HashSet<i64>>,
}

impl MemoryStore {
    pub fn with_tasks(tasks: impl IntoIterator<Item = (i64, TaskStatus, i32)>) -> Self {
        let board = tasks
            .into_iter()
            .map(|(id, status, position)| (id, Placement { status, position }))
            .collect();
        Self {
            board: Arc::new(Mutex::new(board)),
            ..Default::default()
        }
    }

    /// Makes every write touching `task_id` fail
    pub fn fail_on(&self, task_id: i64) {
        self.failing.lock().insert(task_id);
    }

    pub fn snapshot(&self) -> BTreeMap<i64, Placement> {
        self.board.lock().clone()
    }
}

pub struct MemoryTx {
    board: Arc<Mutex<BTreeMap<i64, Placement>>>,
    failing: HashSet<i64>,
    staged: Vec<(i64, Placement)>,
}

#[async_trait]
impl BoardRepository for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        Ok(MemoryTx {
            board: Arc::clone(&self.board),
            failing: self.failing.lock().clone(),
            staged: Vec::new(),
        })
    }
}

#[async_trait]
impl BoardTransaction for MemoryTx {
    async fn place_task(
        &mut self,
        task_id: i64,
        status: TaskStatus,
        position: i32,
    ) -> Result<(), StoreError> {
        if self.failing.contains(&task_id) || !self.board.lock().contains_key(&task_id) {
            return Err(StoreError::TaskNotFound(task_id));
        }
        self.staged.push((task_id, Placement { status, position }));
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let mut board = self.board.lock();
        for (task_id, placement) in self.staged {
            board.insert(task_id, placement);
        }
        Ok(())
    }
}
