//! Resource units and site logs attached to a project
//!
//! Read-only in this service; they are listed in the planning view.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Labour, equipment or material pool available to a project
#[derive(Debug, Clone, Serialize)]
pub struct ResourceUnit {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub capacity: Option<i32>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub cost_rate: Option<Decimal>,
    pub cost_rate_unit: String,
    pub is_active: bool,
}

/// Daily site log entry
#[derive(Debug, Clone, Serialize)]
pub struct SiteLog {
    pub id: i64,
    #[serde(rename = "date")]
    pub log_date: NaiveDate,
    pub weather: Option<String>,
    pub temperature: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub progress_percent: Option<Decimal>,
    pub summary: Option<String>,
    pub manpower_count: Option<i32>,
}
