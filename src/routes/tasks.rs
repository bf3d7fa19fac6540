//! Task routes
//!
//! Create, edit and schedule individual tasks. Board placement changes go
//! through `routes::board`.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::response::Created;
use crate::api::validation::{date_range, optional_text, percent, required_text};
use crate::api::{DataResponse, MessageResponse};
use crate::app::AppState;
use crate::domain::{
    CreateTaskRequest, Task, TaskDetailResponse, UpdateTaskAssigneeRequest, UpdateTaskRequest,
    UpdateTaskScheduleRequest, UpdateTaskStatusRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::services::Schedule;
use crate::store::PlanningRepository;

const TITLE_MAX_LEN: usize = 255;
const DESCRIPTION_MAX_LEN: usize = 10_000;

async fn load_task(state: &AppState, task_id: i64) -> ApiResult<Task> {
    state
        .store
        .task(task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))
}

async fn ensure_assignee_exists(db: &PgPool, assigned_to_id: Option<i64>) -> ApiResult<()> {
    let Some(user_id) = assigned_to_id else {
        return Ok(());
    };

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(db)
        .await?;

    if !exists {
        return Err(ApiError::bad_request("Assignee does not exist"));
    }
    Ok(())
}

/// POST /tasks
///
/// Create a task on the board, or under a WBS node when `wbs_id` is given.
/// The task goes to the end of its status column, or of the node's task list.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let title = required_text("title", &req.title, TITLE_MAX_LEN)?;
    let description = optional_text("description", req.description.as_deref(), DESCRIPTION_MAX_LEN)?;
    let status = req.status.unwrap_or_default();

    ensure_assignee_exists(&state.db, req.assigned_to_id).await?;

    let (project_id, last_position) = match req.wbs_id {
        Some(wbs_id) => {
            let project_id: i64 = sqlx::query_scalar(
                "SELECT project_id FROM work_breakdown_structures WHERE id = $1",
            )
            .bind(wbs_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| ApiError::bad_request("WBS node does not exist"))?;

            let last: Option<i32> =
                sqlx::query_scalar("SELECT MAX(position) FROM tasks WHERE wbs_id = $1")
                    .bind(wbs_id)
                    .fetch_one(&state.db)
                    .await?;
            (Some(project_id), last)
        }
        None => {
            let last: Option<i32> =
                sqlx::query_scalar("SELECT MAX(position) FROM tasks WHERE status = $1")
                    .bind(status.as_str())
                    .fetch_one(&state.db)
                    .await?;
            (None, last)
        }
    };
    let position = last_position.unwrap_or(0) + 1;

    let task_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO tasks (title, description, status, assigned_to_id, due_date, position,
                           project_id, wbs_id, progress_percent, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, NOW(), NOW())
        RETURNING id
        "#,
    )
    .bind(&title)
    .bind(&description)
    .bind(status.as_str())
    .bind(req.assigned_to_id)
    .bind(req.due_date)
    .bind(position)
    .bind(project_id)
    .bind(req.wbs_id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(task_id, status = %status, position, wbs_id = ?req.wbs_id, "Task created");

    let task = load_task(&state, task_id).await?;
    Ok(Created(TaskDetailResponse::from(task)))
}

/// GET /tasks/:task_id
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let task = load_task(&state, task_id).await?;
    Ok(DataResponse::new(TaskDetailResponse::from(task)))
}

/// PATCH /tasks/:task_id
///
/// Full edit of the board fields of a task.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let title = required_text("title", &req.title, TITLE_MAX_LEN)?;
    let description = optional_text("description", req.description.as_deref(), DESCRIPTION_MAX_LEN)?;

    ensure_assignee_exists(&state.db, req.assigned_to_id).await?;

    let result = sqlx::query(
        r#"
        UPDATE tasks SET
            title = $2,
            description = $3,
            status = $4,
            assigned_to_id = $5,
            due_date = $6,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(task_id)
    .bind(&title)
    .bind(&description)
    .bind(req.status.as_str())
    .bind(req.assigned_to_id)
    .bind(req.due_date)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Task not found"));
    }

    tracing::info!(task_id, "Task updated");

    let task = load_task(&state, task_id).await?;
    Ok(DataResponse::new(TaskDetailResponse::from(task)))
}

/// PATCH /tasks/:task_id/status
///
/// Moves a task to another column without touching its position.
pub async fn update_task_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Json(req): Json<UpdateTaskStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = sqlx::query("UPDATE tasks SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(task_id)
        .bind(req.status.as_str())
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Task not found"));
    }

    tracing::info!(task_id, status = %req.status, "Task status changed");

    let task = load_task(&state, task_id).await?;
    Ok(DataResponse::new(TaskDetailResponse::from(task)))
}

/// PATCH /tasks/:task_id/assignee
///
/// A missing or null `assigned_to_id` unassigns the task.
pub async fn update_task_assignee(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Json(req): Json<UpdateTaskAssigneeRequest>,
) -> ApiResult<impl IntoResponse> {
    ensure_assignee_exists(&state.db, req.assigned_to_id).await?;

    let result =
        sqlx::query("UPDATE tasks SET assigned_to_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(task_id)
            .bind(req.assigned_to_id)
            .execute(&state.db)
            .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Task not found"));
    }

    tracing::info!(task_id, assigned_to_id = ?req.assigned_to_id, "Task assignee changed");

    let task = load_task(&state, task_id).await?;
    Ok(DataResponse::new(TaskDetailResponse::from(task)))
}

/// PATCH /tasks/:task_id/schedule
///
/// Updates planned/actual dates and progress; `null` clears a field.
/// Durations are recomputed when both ends of a range are known and kept
/// otherwise.
pub async fn update_task_schedule(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Json(req): Json<UpdateTaskScheduleRequest>,
) -> ApiResult<impl IntoResponse> {
    date_range(
        "planned",
        req.planned_start_date.flatten(),
        req.planned_end_date.flatten(),
    )?;
    date_range("actual", req.actual_start_date.flatten(), req.actual_end_date.flatten())?;
    percent("progress_percent", req.progress_percent.flatten())?;

    let task = load_task(&state, task_id).await?;
    let schedule = Schedule::merge(&task, &req);

    // Stored values may combine with the new ones into an inverted range
    date_range("planned", schedule.planned_start_date, schedule.planned_end_date)?;
    date_range("actual", schedule.actual_start_date, schedule.actual_end_date)?;

    let planned_duration_days = schedule
        .planned_duration_days()
        .or(task.planned_duration_days);
    let actual_duration_days = schedule.actual_duration_days().or(task.actual_duration_days);

    sqlx::query(
        r#"
        UPDATE tasks SET
            planned_start_date = $2,
            planned_end_date = $3,
            actual_start_date = $4,
            actual_end_date = $5,
            planned_duration_days = $6,
            actual_duration_days = $7,
            progress_percent = $8,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(task_id)
    .bind(schedule.planned_start_date)
    .bind(schedule.planned_end_date)
    .bind(schedule.actual_start_date)
    .bind(schedule.actual_end_date)
    .bind(planned_duration_days)
    .bind(actual_duration_days)
    .bind(schedule.progress_percent)
    .execute(&state.db)
    .await?;

    tracing::info!(
        task_id,
        planned_duration_days = ?planned_duration_days,
        actual_duration_days = ?actual_duration_days,
        "Task schedule updated"
    );

    let task = load_task(&state, task_id).await?;
    Ok(DataResponse::new(TaskDetailResponse::from(task)))
}

/// DELETE /tasks/:task_id
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(task_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Task not found"));
    }

    tracing::info!(task_id, "Task deleted");

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}
