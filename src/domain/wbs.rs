//! Work Breakdown Structure domain types
//!
//! WBS nodes form a per-project tree through `parent_id`. Tasks hang off
//! nodes through `tasks.wbs_id`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tasks::{Assignee, TaskStatus};

/// WBS node as stored
#[derive(Debug, Clone, Serialize)]
pub struct WbsNode {
    pub id: i64,
    pub project_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub code: Option<String>,
    pub phase_type: Option<String>,
    pub position: i32,
    pub description: Option<String>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
}

/// Task summary attached to a WBS node in the planning tree
#[derive(Debug, Clone, Serialize)]
pub struct WbsTask {
    pub id: i64,
    pub title: String,
    pub status: TaskStatus,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub progress_percent: Option<Decimal>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub position: i32,
    pub assignee: Option<Assignee>,
}

/// A node together with its directly attached tasks, as fetched for one project
#[derive(Debug, Clone)]
pub struct WbsNodeWithTasks {
    pub node: WbsNode,
    pub tasks: Vec<WbsTask>,
}

/// Node of the planning tree with its roll-up fields
#[derive(Debug, Clone, Serialize)]
pub struct WbsTreeNode {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    pub phase_type: Option<String>,
    pub position: i32,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub calculated_planned_start_date: Option<NaiveDate>,
    pub calculated_planned_end_date: Option<NaiveDate>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub calculated_progress: Option<Decimal>,
    pub tasks: Vec<WbsTask>,
    pub children: Vec<WbsTreeNode>,
}

/// Request DTO for creating a WBS node
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWbsRequest {
    pub project_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub phase_type: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub planned_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub planned_end_date: Option<NaiveDate>,
}

/// Request DTO for updating a WBS node
///
/// The parent cannot be changed after creation.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWbsRequest {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub phase_type: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub planned_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub planned_end_date: Option<NaiveDate>,
}
