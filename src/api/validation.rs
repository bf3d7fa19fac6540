//! Request validation helpers shared by the route handlers

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{ApiError, ApiResult};

/// Trims a required text field and enforces its maximum length
pub fn required_text(field: &str, value: &str, max_len: usize) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(ApiError::bad_request(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Normalizes an optional text field; blank strings become `None`
pub fn optional_text(field: &str, value: Option<&str>, max_len: usize) -> ApiResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required_text(field, v, max_len).map(Some),
    }
}

/// Rejects a range whose end falls before its start
pub fn date_range(field: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> ApiResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(ApiError::bad_request(format!(
            "{field} end date must be on or after the start date"
        ))),
        _ => Ok(()),
    }
}

pub fn percent(field: &str, value: Option<Decimal>) -> ApiResult<()> {
    match value {
        Some(v) if v < Decimal::ZERO || v > Decimal::ONE_HUNDRED => Err(ApiError::bad_request(
            format!("{field} must be between 0 and 100"),
        )),
        _ => Ok(()),
    }
}

pub fn non_negative(field: &str, value: Option<i32>) -> ApiResult<()> {
    match value {
        Some(v) if v < 0 => Err(ApiError::bad_request(format!("{field} must be at least 0"))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("title", "  Zidarie  ", 255).unwrap(), "Zidarie");
        assert!(matches!(required_text("title", "   ", 255), Err(ApiError::BadRequest(_))));
        assert!(required_text("title", &"x".repeat(256), 255).is_err());
    }

    #[test]
    fn optional_text_treats_blank_as_missing() {
        assert_eq!(optional_text("code", Some("  "), 100).unwrap(), None);
        assert_eq!(optional_text("code", None, 100).unwrap(), None);
        assert_eq!(optional_text("code", Some(" A.1 "), 100).unwrap(), Some("A.1".to_string()));
    }

    #[test]
    fn date_range_allows_same_day_and_open_ranges() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 10);
        let earlier = NaiveDate::from_ymd_opt(2025, 1, 9);
        assert!(date_range("planned", d, d).is_ok());
        assert!(date_range("planned", d, None).is_ok());
        assert!(date_range("planned", None, d).is_ok());
        assert!(date_range("planned", d, earlier).is_err());
    }

    #[test]
    fn percent_is_bounded() {
        assert!(percent("progress", Some(Decimal::ZERO)).is_ok());
        assert!(percent("progress", Some(Decimal::ONE_HUNDRED)).is_ok());
        assert!(percent("progress", Some(Decimal::new(1001, 1))).is_err());
        assert!(percent("progress", Some(Decimal::NEGATIVE_ONE)).is_err());
    }
}
