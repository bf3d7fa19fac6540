//! Planning timeline
//!
//! Flat list of a project's tasks for the Gantt-style strip under the WBS
//! tree, each labelled with the name of its WBS node.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::{Task, WbsNode};

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub id: i64,
    pub title: String,
    pub wbs_name: Option<String>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub progress_percent: Option<Decimal>,
}

/// Builds timeline entries ordered by planned start, unscheduled tasks last
pub fn build_timeline(tasks: Vec<Task>, nodes: &[WbsNode]) -> Vec<TimelineEntry> {
    let names: HashMap<i64, &str> = nodes.iter().map(|n| (n.id, n.name.as_str())).collect();

    let mut entries: Vec<TimelineEntry> = tasks
        .into_iter()
        .map(|task| TimelineEntry {
            wbs_name: task
                .wbs_id
                .and_then(|id| names.get(&id))
                .map(|name| name.to_string()),
            id: task.id,
            title: task.title,
            planned_start_date: task.planned_start_date,
            planned_end_date: task.planned_end_date,
            actual_start_date: task.actual_start_date,
            actual_end_date: task.actual_end_date,
            progress_percent: task.progress_percent,
        })
        .collect();

    entries.sort_by_key(|e| (e.planned_start_date.is_none(), e.planned_start_date));
    entries
}
