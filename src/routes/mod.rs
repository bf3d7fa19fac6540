pub mod board;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod wbs;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        // Board
        .route("/task-statuses", get(board::list_statuses))
        .route("/board", get(board::list_board))
        .route("/tasks/reorder", post(board::reorder_tasks))
        // Tasks
        .route("/tasks", post(tasks::create_task))
        .route(
            "/tasks/:task_id",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tasks/:task_id/status", patch(tasks::update_task_status))
        .route("/tasks/:task_id/assignee", patch(tasks::update_task_assignee))
        .route("/tasks/:task_id/schedule", patch(tasks::update_task_schedule))
        // Work breakdown structure
        .route("/wbs", post(wbs::create_wbs))
        .route("/wbs/:wbs_id", put(wbs::update_wbs).delete(wbs::delete_wbs))
        // Projects and planning
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/projects/:project_id/planning", get(projects::get_planning))
}
