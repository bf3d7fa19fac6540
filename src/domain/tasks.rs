//! Task domain types
//!
//! Board tasks, their status column and the planning fields attached to them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task status enum
///
/// Each variant is one column on the board, in display order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Backlog,
    InProgress,
    InReview,
    Done,
}

/// Presentation classes for a status column
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StatusTheme {
    pub icon: &'static str,
    pub accent: &'static str,
    pub card: &'static str,
    pub chip: &'static str,
    pub badge: &'static str,
    pub dot: &'static str,
    pub ring: &'static str,
    pub text: &'static str,
    pub header: &'static str,
}

static THEMES: [StatusTheme; 4] = [
    StatusTheme {
        icon: "🗂️",
        accent: "border-l-4 border-slate-300",
        card: "bg-slate-50",
        chip: "bg-slate-200 text-slate-700",
        badge: "bg-slate-100 text-slate-600",
        dot: "bg-slate-400",
        ring: "ring-slate-300",
        text: "text-slate-700",
        header: "bg-slate-50",
    },
    StatusTheme {
        icon: "⚙️",
        accent: "border-l-4 border-blue-500",
        card: "bg-blue-50",
        chip: "bg-blue-100 text-blue-700",
        badge: "bg-blue-100 text-blue-600",
        dot: "bg-blue-500",
        ring: "ring-blue-300",
        text: "text-blue-700",
        header: "bg-blue-50",
    },
    StatusTheme {
        icon: "🧐",
        accent: "border-l-4 border-amber-400",
        card: "bg-amber-50",
        chip: "bg-amber-100 text-amber-700",
        badge: "bg-amber-100 text-amber-700",
        dot: "bg-amber-500",
        ring: "ring-amber-300",
        text: "text-amber-700",
        header: "bg-amber-50",
    },
    StatusTheme {
        icon: "✅",
        accent: "border-l-4 border-emerald-500",
        card: "bg-emerald-50",
        chip: "bg-emerald-100 text-emerald-700",
        badge: "bg-emerald-100 text-emerald-700",
        dot: "bg-emerald-500",
        ring: "ring-emerald-300",
        text: "text-emerald-700",
        header: "bg-emerald-50",
    },
];

impl TaskStatus {
    /// All statuses in board column order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Backlog,
        TaskStatus::InProgress,
        TaskStatus::InReview,
        TaskStatus::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::InProgress => "In lucru",
            Self::InReview => "In verificare",
            Self::Done => "Terminat",
        }
    }

    pub fn theme(self) -> &'static StatusTheme {
        &THEMES[self as usize]
    }

    /// Decode a stored status, falling back to backlog for unknown values
    pub fn from_db(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(status = value, "Unknown task status in database");
            Self::default()
        })
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Status option exposed to clients for pickers and column headers
#[derive(Debug, Clone, Serialize)]
pub struct StatusOption {
    pub value: TaskStatus,
    pub label: &'static str,
    pub meta: &'static StatusTheme,
}

impl From<TaskStatus> for StatusOption {
    fn from(status: TaskStatus) -> Self {
        Self {
            value: status,
            label: status.label(),
            meta: status.theme(),
        }
    }
}

/// Minimal user reference shown next to a task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignee {
    pub id: i64,
    pub name: String,
}

/// Task entity
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assigned_to_id: Option<i64>,
    pub assignee: Option<Assignee>,
    pub due_date: Option<NaiveDate>,
    pub position: i32,
    pub project_id: Option<i64>,
    pub wbs_id: Option<i64>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub planned_duration_days: Option<i32>,
    pub actual_duration_days: Option<i32>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub progress_percent: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a task
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub assigned_to_id: Option<i64>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Places the task under a WBS node (planning view)
    #[serde(default)]
    pub wbs_id: Option<i64>,
}

/// Request DTO for editing a task
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_to_id: Option<i64>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskAssigneeRequest {
    #[serde(default)]
    pub assigned_to_id: Option<i64>,
}

/// Request DTO for the planning schedule of a task
///
/// An omitted field keeps its stored value (`None`); an explicit `null`
/// clears it (`Some(None)`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskScheduleRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub planned_start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub planned_end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub actual_start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub actual_end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable_float")]
    pub progress_percent: Option<Option<Decimal>>,
}

/// A key that is present, even as `null`, deserializes to `Some`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn nullable_float<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    rust_decimal::serde::float_option::deserialize(deserializer).map(Some)
}

/// Response DTO for the task detail view
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetailResponse {
    #[serde(flatten)]
    pub task: Task,
    pub status_label: &'static str,
    pub meta: &'static StatusTheme,
}

impl From<Task> for TaskDetailResponse {
    fn from(task: Task) -> Self {
        let status = task.status;
        Self {
            task,
            status_label: status.label(),
            meta: status.theme(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_wire_name() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn unknown_stored_status_falls_back_to_backlog() {
        assert_eq!(TaskStatus::from_db("in_review"), TaskStatus::InReview);
        assert_eq!(TaskStatus::from_db("bogus"), TaskStatus::Backlog);
    }

    #[test]
    fn every_status_has_its_own_theme() {
        assert_eq!(TaskStatus::Backlog.theme().dot, "bg-slate-400");
        assert_eq!(TaskStatus::InProgress.theme().dot, "bg-blue-500");
        assert_eq!(TaskStatus::InReview.theme().dot, "bg-amber-500");
        assert_eq!(TaskStatus::Done.theme().icon, "✅");
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: TaskStatus = serde_json::from_str("\"in_review\"").unwrap();
        assert_eq!(parsed, TaskStatus::InReview);
    }

    #[test]
    fn schedule_request_reads_progress_as_number() {
        let req: UpdateTaskScheduleRequest =
            serde_json::from_str(r#"{"progress_percent": 42.5, "planned_start_date": "2025-03-01"}"#)
                .unwrap();
        assert_eq!(req.progress_percent, Some(Some(Decimal::new(425, 1))));
        assert_eq!(req.planned_start_date, Some(NaiveDate::from_ymd_opt(2025, 3, 1)));
        assert_eq!(req.actual_end_date, None);
    }

    #[test]
    fn schedule_request_tells_null_from_omitted() {
        let req: UpdateTaskScheduleRequest =
            serde_json::from_str(r#"{"planned_end_date": null, "progress_percent": null}"#)
                .unwrap();
        assert_eq!(req.planned_end_date, Some(None));
        assert_eq!(req.progress_percent, Some(None));
        assert_eq!(req.planned_start_date, None);
        assert_eq!(req.actual_start_date, None);
    }
}
