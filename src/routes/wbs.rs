//! Work breakdown structure maintenance
//!
//! Nodes are created under a project, optionally below a parent of the same
//! project. A node's parent is fixed at creation, so edits can never
//! introduce a cycle.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::response::Created;
use crate::api::validation::{date_range, non_negative, optional_text, required_text};
use crate::api::{DataResponse, MessageResponse};
use crate::app::AppState;
use crate::domain::{CreateWbsRequest, UpdateWbsRequest, WbsNode};
use crate::error::{ApiError, ApiResult};
use crate::store::postgres::{WbsRow, WBS_COLUMNS};

const NAME_MAX_LEN: usize = 255;
const CODE_MAX_LEN: usize = 100;
const PHASE_TYPE_MAX_LEN: usize = 100;
const DESCRIPTION_MAX_LEN: usize = 10_000;

async fn load_node(db: &PgPool, wbs_id: i64) -> ApiResult<WbsNode> {
    sqlx::query_as::<_, WbsRow>(&format!(
        "SELECT {WBS_COLUMNS} FROM work_breakdown_structures WHERE id = $1"
    ))
    .bind(wbs_id)
    .fetch_optional(db)
    .await?
    .map(Into::into)
    .ok_or_else(|| ApiError::not_found("WBS node not found"))
}

/// Codes are unique per project; `exclude_id` skips the node being edited
async fn ensure_code_available(
    db: &PgPool,
    project_id: i64,
    code: Option<&str>,
    exclude_id: Option<i64>,
) -> ApiResult<()> {
    let Some(code) = code else {
        return Ok(());
    };

    let taken: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM work_breakdown_structures
            WHERE project_id = $1 AND code = $2 AND ($3::BIGINT IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(project_id)
    .bind(code)
    .bind(exclude_id)
    .fetch_one(db)
    .await?;

    if taken {
        return Err(ApiError::conflict(format!(
            "WBS code '{code}' is already used in this project"
        )));
    }
    Ok(())
}

/// POST /wbs
pub async fn create_wbs(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateWbsRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = required_text("name", &req.name, NAME_MAX_LEN)?;
    let code = optional_text("code", req.code.as_deref(), CODE_MAX_LEN)?;
    let phase_type = optional_text("phase_type", req.phase_type.as_deref(), PHASE_TYPE_MAX_LEN)?;
    let description = optional_text("description", req.description.as_deref(), DESCRIPTION_MAX_LEN)?;
    non_negative("position", req.position)?;
    date_range("planned", req.planned_start_date, req.planned_end_date)?;

    let project_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
            .bind(req.project_id)
            .fetch_one(&state.db)
            .await?;
    if !project_exists {
        return Err(ApiError::bad_request("Project does not exist"));
    }

    if let Some(parent_id) = req.parent_id {
        let parent_project_id: i64 = sqlx::query_scalar(
            "SELECT project_id FROM work_breakdown_structures WHERE id = $1",
        )
        .bind(parent_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::bad_request("Parent WBS node does not exist"))?;
        if parent_project_id != req.project_id {
            return Err(ApiError::bad_request(
                "Parent WBS node belongs to another project",
            ));
        }
    }

    ensure_code_available(&state.db, req.project_id, code.as_deref(), None).await?;

    let position = match req.position {
        Some(position) => position,
        None => {
            let last: Option<i32> = sqlx::query_scalar(
                r#"
                SELECT MAX(position) FROM work_breakdown_structures
                WHERE project_id = $1 AND parent_id IS NOT DISTINCT FROM $2
                "#,
            )
            .bind(req.project_id)
            .bind(req.parent_id)
            .fetch_one(&state.db)
            .await?;
            last.unwrap_or(0) + 1
        }
    };

    let row = sqlx::query_as::<_, WbsRow>(&format!(
        r#"
        INSERT INTO work_breakdown_structures
            (project_id, parent_id, name, code, phase_type, position, description,
             planned_start_date, planned_end_date, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
        RETURNING {WBS_COLUMNS}
        "#
    ))
    .bind(req.project_id)
    .bind(req.parent_id)
    .bind(&name)
    .bind(&code)
    .bind(&phase_type)
    .bind(position)
    .bind(&description)
    .bind(req.planned_start_date)
    .bind(req.planned_end_date)
    .fetch_one(&state.db)
    .await?;

    let node = WbsNode::from(row);

    tracing::info!(
        wbs_id = node.id,
        project_id = node.project_id,
        parent_id = ?node.parent_id,
        position,
        "WBS node created"
    );

    Ok(Created(node))
}

/// PUT /wbs/:wbs_id
///
/// Omitted optional fields keep their stored values.
pub async fn update_wbs(
    State(state): State<Arc<AppState>>,
    Path(wbs_id): Path<i64>,
    Json(req): Json<UpdateWbsRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = required_text("name", &req.name, NAME_MAX_LEN)?;
    let code = optional_text("code", req.code.as_deref(), CODE_MAX_LEN)?;
    let phase_type = optional_text("phase_type", req.phase_type.as_deref(), PHASE_TYPE_MAX_LEN)?;
    let description = optional_text("description", req.description.as_deref(), DESCRIPTION_MAX_LEN)?;
    non_negative("position", req.position)?;
    date_range("planned", req.planned_start_date, req.planned_end_date)?;

    let current = load_node(&state.db, wbs_id).await?;

    date_range(
        "planned",
        req.planned_start_date.or(current.planned_start_date),
        req.planned_end_date.or(current.planned_end_date),
    )?;

    ensure_code_available(&state.db, current.project_id, code.as_deref(), Some(wbs_id)).await?;

    let row = sqlx::query_as::<_, WbsRow>(&format!(
        r#"
        UPDATE work_breakdown_structures SET
            name = $2,
            code = COALESCE($3, code),
            phase_type = COALESCE($4, phase_type),
            position = COALESCE($5, position),
            description = COALESCE($6, description),
            planned_start_date = COALESCE($7, planned_start_date),
            planned_end_date = COALESCE($8, planned_end_date),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {WBS_COLUMNS}
        "#
    ))
    .bind(wbs_id)
    .bind(&name)
    .bind(&code)
    .bind(&phase_type)
    .bind(req.position)
    .bind(&description)
    .bind(req.planned_start_date)
    .bind(req.planned_end_date)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("WBS node not found"))?;

    tracing::info!(wbs_id, "WBS node updated");

    Ok(DataResponse::new(WbsNode::from(row)))
}

/// DELETE /wbs/:wbs_id
///
/// Child nodes are removed by the database cascade.
pub async fn delete_wbs(
    State(state): State<Arc<AppState>>,
    Path(wbs_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let name: String =
        sqlx::query_scalar("DELETE FROM work_breakdown_structures WHERE id = $1 RETURNING name")
            .bind(wbs_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| ApiError::not_found("WBS node not found"))?;

    tracing::info!(wbs_id, name = %name, "WBS node deleted");

    Ok(Json(MessageResponse::new(format!("WBS node '{name}' deleted"))))
}
