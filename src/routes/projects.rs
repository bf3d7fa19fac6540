use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::Created;
use crate::api::validation::{date_range, optional_text, required_text};
use crate::api::{DataResponse, Paginated, PaginationParams};
use crate::app::AppState;
use crate::domain::{
    CreateProjectRequest, Project, ProjectStatus, ProjectSummary, ResourceUnit, SiteLog, Task,
    WbsTreeNode,
};
use crate::error::{ApiError, ApiResult};
use crate::services::{build_timeline, build_wbs_tree, TimelineEntry};
use crate::store::postgres::{TaskRow, TASK_COLUMNS};
use crate::store::PlanningRepository;

const NAME_MAX_LEN: usize = 255;
const CODE_MAX_LEN: usize = 50;
const DESCRIPTION_MAX_LEN: usize = 10_000;
const RECENT_SITE_LOGS: i64 = 7;

const PROJECT_COLUMNS: &str = r#"
    p.id, p.name, p.code, p.description, p.status,
    p.planned_start_date, p.planned_end_date, p.actual_start_date, p.actual_end_date
"#;

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: i64,
    name: String,
    code: Option<String>,
    description: Option<String>,
    status: String,
    planned_start_date: Option<NaiveDate>,
    planned_end_date: Option<NaiveDate>,
    actual_start_date: Option<NaiveDate>,
    actual_end_date: Option<NaiveDate>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        let status = row.status.parse::<ProjectStatus>().unwrap_or_else(|e| {
            tracing::warn!(project_id = row.id, error = %e, "Falling back to planning status");
            ProjectStatus::default()
        });
        Self {
            id: row.id,
            name: row.name,
            code: row.code,
            description: row.description,
            status,
            planned_start_date: row.planned_start_date,
            planned_end_date: row.planned_end_date,
            actual_start_date: row.actual_start_date,
            actual_end_date: row.actual_end_date,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectSummaryRow {
    #[sqlx(flatten)]
    project: ProjectRow,
    tasks_count: i64,
    completed_tasks_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ResourceRow {
    id: i64,
    name: String,
    resource_type: String,
    capacity: Option<i32>,
    cost_rate: Option<Decimal>,
    cost_rate_unit: String,
    is_active: bool,
}

impl From<ResourceRow> for ResourceUnit {
    fn from(row: ResourceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            resource_type: row.resource_type,
            capacity: row.capacity,
            cost_rate: row.cost_rate,
            cost_rate_unit: row.cost_rate_unit,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SiteLogRow {
    id: i64,
    log_date: NaiveDate,
    weather: Option<String>,
    temperature: Option<String>,
    progress_percent: Option<Decimal>,
    summary: Option<String>,
    manpower_count: Option<i32>,
}

impl From<SiteLogRow> for SiteLog {
    fn from(row: SiteLogRow) -> Self {
        Self {
            id: row.id,
            log_date: row.log_date,
            weather: row.weather,
            temperature: row.temperature,
            progress_percent: row.progress_percent,
            summary: row.summary,
            manpower_count: row.manpower_count,
        }
    }
}

/// Everything the planning screen shows for one project
#[derive(Debug, Serialize)]
pub struct PlanningView {
    pub project: Project,
    pub wbs_tree: Vec<WbsTreeNode>,
    pub resources: Vec<ResourceUnit>,
    pub site_logs: Vec<SiteLog>,
    pub timeline: Vec<TimelineEntry>,
}

/// POST /projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = required_text("name", &req.name, NAME_MAX_LEN)?;
    let code = optional_text("code", req.code.as_deref(), CODE_MAX_LEN)?;
    let description = optional_text("description", req.description.as_deref(), DESCRIPTION_MAX_LEN)?;
    date_range("planned", req.planned_start_date, req.planned_end_date)?;
    date_range("actual", req.actual_start_date, req.actual_end_date)?;
    let status = req.status.unwrap_or_default();

    if let Some(code) = code.as_deref() {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM projects WHERE code = $1)")
                .bind(code)
                .fetch_one(&state.db)
                .await?;
        if taken {
            return Err(ApiError::conflict(format!(
                "Project code '{code}' is already used"
            )));
        }
    }

    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        r#"
        INSERT INTO projects AS p
            (name, code, description, status, planned_start_date, planned_end_date,
             actual_start_date, actual_end_date, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(&name)
    .bind(&code)
    .bind(&description)
    .bind(status.as_str())
    .bind(req.planned_start_date)
    .bind(req.planned_end_date)
    .bind(req.actual_start_date)
    .bind(req.actual_end_date)
    .fetch_one(&state.db)
    .await?;

    let project = Project::from(row);
    tracing::info!(project_id = project.id, status = status.as_str(), "Project created");

    Ok(Created(project))
}

/// GET /projects
///
/// Ordered by name, with task completion counters.
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(&state.db)
        .await?;

    let rows = sqlx::query_as::<_, ProjectSummaryRow>(&format!(
        r#"
        SELECT {PROJECT_COLUMNS},
               COUNT(t.id) AS tasks_count,
               COUNT(t.id) FILTER (WHERE t.status = 'done') AS completed_tasks_count
        FROM projects p
        LEFT JOIN tasks t ON t.project_id = p.id
        GROUP BY p.id
        ORDER BY p.name, p.id
        LIMIT $1 OFFSET $2
        "#
    ))
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.db)
    .await?;

    let projects: Vec<ProjectSummary> = rows
        .into_iter()
        .map(|row| {
            ProjectSummary::new(row.project.into(), row.tasks_count, row.completed_tasks_count)
        })
        .collect();

    Ok(Paginated::new(
        projects,
        &pagination,
        u64::try_from(total).unwrap_or(0),
    ))
}

/// GET /projects/:project_id/planning
///
/// Project header, WBS tree with roll-ups, resources, recent site logs and
/// the task timeline.
pub async fn get_planning(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let project: Project = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = $1"
    ))
    .bind(project_id)
    .fetch_optional(&state.db)
    .await?
    .map(Into::into)
    .ok_or_else(|| ApiError::not_found("Project not found"))?;

    let items = state.store.wbs_nodes_with_tasks(project_id).await?;
    let nodes: Vec<_> = items.iter().map(|item| item.node.clone()).collect();
    let wbs_tree = build_wbs_tree(items);

    let resources: Vec<ResourceUnit> = sqlx::query_as::<_, ResourceRow>(
        r#"
        SELECT id, name, resource_type, capacity, cost_rate, cost_rate_unit, is_active
        FROM resource_units
        WHERE project_id = $1
        ORDER BY name, id
        "#,
    )
    .bind(project_id)
    .fetch_all(&state.db)
    .await?
    .into_iter()
    .map(Into::into)
    .collect();

    let site_logs: Vec<SiteLog> = sqlx::query_as::<_, SiteLogRow>(
        r#"
        SELECT id, log_date, weather, temperature, progress_percent, summary, manpower_count
        FROM site_logs
        WHERE project_id = $1
        ORDER BY log_date DESC
        LIMIT $2
        "#,
    )
    .bind(project_id)
    .bind(RECENT_SITE_LOGS)
    .fetch_all(&state.db)
    .await?
    .into_iter()
    .map(Into::into)
    .collect();

    let tasks: Vec<Task> = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks t \
         LEFT JOIN users u ON u.id = t.assigned_to_id \
         WHERE t.project_id = $1 \
         ORDER BY t.planned_start_date NULLS LAST, t.position"
    ))
    .bind(project_id)
    .fetch_all(&state.db)
    .await?
    .into_iter()
    .map(Into::into)
    .collect();

    let timeline = build_timeline(tasks, &nodes);

    tracing::debug!(
        project_id,
        wbs_roots = wbs_tree.len(),
        timeline = timeline.len(),
        "Planning view assembled"
    );

    Ok(DataResponse::new(PlanningView {
        project,
        wbs_tree,
        resources,
        site_logs,
        timeline,
    }))
}
