//! Recovery command handlers

pub mod initiate;
pub mod process_batch;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

pub use initiate::{InitiateRecoveryCommand, InitiateRecoveryResponse};
pub use process_batch::{ProcessBatchCommand, ProcessBatchResponse};

/// Errors shared by the recovery commands
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No more orders to process")]
    NoMoreOrders,

    #[error(transparent)]
    Sync(#[from] shipguard_common::SyncError),
}

/// Parse the operator-supplied date range into inclusive bounds.
///
/// Input is `YYYY-MM-DD`; the upper bound is extended to the end of its
/// day so both bounds stay inclusive for date-only input.
pub fn parse_range(
    date_from: Option<&str>,
    date_to: Option<&str>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), RecoveryError> {
    let from_raw = date_from
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RecoveryError::Validation("date_from is required".to_string()))?;
    let to_raw = date_to
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RecoveryError::Validation("date_to is required".to_string()))?;

    let from = parse_day(from_raw)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| RecoveryError::Validation("invalid date_from".to_string()))?;
    let to = parse_day(to_raw)?
        .and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| RecoveryError::Validation("invalid date_to".to_string()))?;

    if from > to {
        return Err(RecoveryError::Validation(
            "date_from must not be after date_to".to_string(),
        ));
    }

    Ok((from, to))
}

fn parse_day(raw: &str) -> Result<NaiveDate, RecoveryError> {
    raw.parse::<NaiveDate>()
        .map_err(|_| RecoveryError::Validation(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_requires_both_bounds() {
        assert!(matches!(
            parse_range(None, Some("2024-01-31")),
            Err(RecoveryError::Validation(_))
        ));
        assert!(matches!(
            parse_range(Some("2024-01-01"), Some("")),
            Err(RecoveryError::Validation(_))
        ));
    }

    #[test]
    fn upper_bound_covers_whole_day() {
        let (from, to) = parse_range(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        assert_eq!(from.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2024-01-31T23:59:59+00:00");
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(
            parse_range(Some("2024-02-01"), Some("2024-01-01")),
            Err(RecoveryError::Validation(_))
        ));
    }
}
