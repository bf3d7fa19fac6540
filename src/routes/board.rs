//! Task board routes
//!
//! Column listing, status metadata and the drag-and-drop reorder endpoint.

use axum::{extract::State, response::IntoResponse, Json};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::api::{DataResponse, MessageResponse};
use crate::app::AppState;
use crate::domain::{StatusOption, Task, TaskStatus};
use crate::error::{ApiError, ApiResult};
use crate::services::board::{self, ReorderRequest};
use crate::store::postgres::{TaskRow, TASK_COLUMNS};

/// GET /task-statuses
pub async fn list_statuses() -> impl IntoResponse {
    let options: Vec<StatusOption> = TaskStatus::ALL.into_iter().map(StatusOption::from).collect();
    DataResponse::new(options)
}

/// GET /board
///
/// One section per status, tasks in board order.
pub async fn list_board(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks t \
         LEFT JOIN users u ON u.id = t.assigned_to_id \
         ORDER BY t.position, t.created_at"
    ))
    .fetch_all(&state.db)
    .await?;

    let tasks: Vec<Task> = rows.into_iter().map(Into::into).collect();
    Ok(DataResponse::new(board::sections(tasks)))
}

/// POST /tasks/reorder
///
/// Statuses are checked while decoding the body; unknown ones never reach
/// this handler. Task ids are checked here, before the write transaction.
pub async fn reorder_tasks(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.columns.is_empty() {
        return Err(ApiError::bad_request("columns must not be empty"));
    }

    let ids: Vec<i64> = req
        .columns
        .iter()
        .flat_map(|c| c.task_ids.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if !ids.is_empty() {
        let known: Vec<i64> = sqlx::query_scalar("SELECT id FROM tasks WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&state.db)
            .await?;
        let known: BTreeSet<i64> = known.into_iter().collect();
        let unknown: Vec<i64> = ids.into_iter().filter(|id| !known.contains(id)).collect();
        if !unknown.is_empty() {
            return Err(ApiError::bad_request(format!("Unknown task ids: {unknown:?}")));
        }
    }

    board::reorder(&state.store, &req.columns)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Board reorder rolled back");
            ApiError::conflict("Task order could not be saved")
        })?;

    Ok(Json(MessageResponse::with_code("Task order saved", "ORDER_SAVED")))
}
