//! Task schedule merging and duration calculation

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{Task, UpdateTaskScheduleRequest};

/// Planned and actual dates of a task after applying an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub progress_percent: Option<Decimal>,
}

impl Schedule {
    /// Overlays the fields present in `req` on the task's stored schedule.
    ///
    /// A field sent as `null` clears the stored value.
    pub fn merge(task: &Task, req: &UpdateTaskScheduleRequest) -> Self {
        Self {
            planned_start_date: req.planned_start_date.unwrap_or(task.planned_start_date),
            planned_end_date: req.planned_end_date.unwrap_or(task.planned_end_date),
            actual_start_date: req.actual_start_date.unwrap_or(task.actual_start_date),
            actual_end_date: req.actual_end_date.unwrap_or(task.actual_end_date),
            progress_percent: req.progress_percent.unwrap_or(task.progress_percent),
        }
    }

    pub fn planned_duration_days(&self) -> Option<i32> {
        duration_days(self.planned_start_date, self.planned_end_date)
    }

    pub fn actual_duration_days(&self) -> Option<i32> {
        duration_days(self.actual_start_date, self.actual_end_date)
    }
}

/// Inclusive day count between two dates; both ends must be present
pub fn duration_days(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<i32> {
    let days = (end? - start?).num_days().abs() + 1;
    i32::try_from(days).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn duration_counts_both_ends() {
        assert_eq!(duration_days(date(2025, 4, 1), date(2025, 4, 1)), Some(1));
        assert_eq!(duration_days(date(2025, 4, 1), date(2025, 4, 10)), Some(10));
        assert_eq!(duration_days(date(2025, 2, 27), date(2025, 3, 2)), Some(4));
    }

    fn stored_task() -> Task {
        let now = chrono::Utc::now();
        Task {
            id: 1,
            title: "Turnare fundatie".to_string(),
            description: None,
            status: crate::domain::TaskStatus::InProgress,
            assigned_to_id: None,
            assignee: None,
            due_date: None,
            position: 1,
            project_id: Some(1),
            wbs_id: Some(3),
            planned_start_date: date(2025, 5, 1),
            planned_end_date: date(2025, 5, 20),
            actual_start_date: date(2025, 5, 2),
            actual_end_date: None,
            planned_duration_days: Some(20),
            actual_duration_days: None,
            progress_percent: Some(Decimal::from(30)),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn merge_keeps_stored_values_for_omitted_fields() {
        let task = stored_task();
        let req = UpdateTaskScheduleRequest {
            planned_end_date: Some(date(2025, 5, 25)),
            actual_end_date: Some(date(2025, 5, 6)),
            ..Default::default()
        };

        let merged = Schedule::merge(&task, &req);

        assert_eq!(merged.planned_start_date, date(2025, 5, 1));
        assert_eq!(merged.planned_end_date, date(2025, 5, 25));
        assert_eq!(merged.progress_percent, Some(Decimal::from(30)));
        assert_eq!(merged.planned_duration_days(), Some(25));
        assert_eq!(merged.actual_duration_days(), Some(5));
    }

    #[test]
    fn explicit_null_clears_a_stored_date() {
        let task = stored_task();
        let req: UpdateTaskScheduleRequest =
            serde_json::from_str(r#"{"planned_end_date": null}"#).unwrap();

        let merged = Schedule::merge(&task, &req);

        assert_eq!(merged.planned_end_date, None);
        assert_eq!(merged.planned_start_date, date(2025, 5, 1));
        assert_eq!(merged.actual_start_date, date(2025, 5, 2));
        assert_eq!(merged.planned_duration_days(), None);
    }

    #[test]
    fn explicit_null_clears_progress() {
        let task = stored_task();
        let req: UpdateTaskScheduleRequest =
            serde_json::from_str(r#"{"progress_percent": null}"#).unwrap();

        assert_eq!(Schedule::merge(&task, &req).progress_percent, None);
    }

    #[test]
    fn duration_needs_both_dates() {
        assert_eq!(duration_days(date(2025, 4, 1), None), None);
        assert_eq!(duration_days(None, date(2025, 4, 1)), None);
    }
}
