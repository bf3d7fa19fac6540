use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Project status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Executie,
    InVerificare,
    Finalizat,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Executie => "executie",
            Self::InVerificare => "in_verificare",
            Self::Finalizat => "finalizat",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(Self::Planning),
            "executie" => Ok(Self::Executie),
            "in_verificare" => Ok(Self::InVerificare),
            "finalizat" => Ok(Self::Finalizat),
            other => Err(format!("unknown project status '{other}'")),
        }
    }
}

/// Project entity
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
}

/// Project row in the planning project picker
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub tasks_count: i64,
    pub completed_tasks_count: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub progress_percent: Decimal,
}

impl ProjectSummary {
    pub fn new(project: Project, tasks_count: i64, completed_tasks_count: i64) -> Self {
        Self {
            project,
            tasks_count,
            completed_tasks_count,
            progress_percent: completion_percent(completed_tasks_count, tasks_count),
        }
    }
}

/// Share of done tasks, as a percentage rounded to one decimal
///
/// A project without tasks reports 0.
pub fn completion_percent(completed: i64, total: i64) -> Decimal {
    if total <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(completed) * Decimal::ONE_HUNDRED / Decimal::from(total))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Request DTO for creating a project
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub planned_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub planned_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_percent_rounds_to_one_decimal() {
        assert_eq!(completion_percent(1, 3), Decimal::new(333, 1));
        assert_eq!(completion_percent(2, 3), Decimal::new(667, 1));
        assert_eq!(completion_percent(4, 4), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn project_without_tasks_is_zero_percent_complete() {
        assert_eq!(completion_percent(0, 0), Decimal::ZERO);
    }

    #[test]
    fn project_status_uses_stored_names() {
        assert_eq!("in_verificare".parse(), Ok(ProjectStatus::InVerificare));
        assert_eq!(ProjectStatus::Executie.as_str(), "executie");
        assert!("active".parse::<ProjectStatus>().is_err());
    }
}
