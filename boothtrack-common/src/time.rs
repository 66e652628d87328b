//! Fixed-timezone timestamp normalization
//!
//! Every persisted instant is rendered as an ISO-8601 string in one
//! configured timezone, regardless of how the scanner encoded it. The zone
//! is a deployment constant (Asia/Kolkata in the reference deployment), not
//! a per-request concern.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::scan::TimeInput;

/// Plausible epoch-seconds window: 1990-01-01 .. 2100-01-01 UTC.
/// Anything outside is scanner clock garbage, not a real dwell window.
const EPOCH_MIN: i64 = 631_152_000;
const EPOCH_MAX: i64 = 4_102_444_800;

/// Accepted formats for pre-formatted timestamp strings without an offset,
/// interpreted as local time in the fixed zone.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Timestamp normalization errors, surfaced to clients as 4xx
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    /// Epoch seconds outside the plausible window
    #[error("epoch seconds out of plausible range: {0}")]
    EpochOutOfRange(i64),

    /// Timestamp string in no recognized format
    #[error("unrecognized timestamp format: {0:?}")]
    UnparseableTimestamp(String),
}

/// Renders externally supplied instants in one fixed timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimeNormalizer {
    tz: Tz,
}

impl TimeNormalizer {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The fixed zone this normalizer renders into
    pub fn zone(&self) -> Tz {
        self.tz
    }

    /// Canonical ISO-8601 string in the fixed zone for either wire encoding.
    ///
    /// Epoch seconds are converted through the zone's offset; formatted
    /// strings are parsed and re-rendered (offset-carrying strings are
    /// shifted into the fixed zone, naive strings are interpreted as local
    /// time already in it).
    pub fn normalize(&self, input: &TimeInput) -> Result<String, NormalizationError> {
        match input {
            TimeInput::Epoch(secs) => self.from_epoch(*secs),
            TimeInput::Formatted(raw) => self.from_formatted(raw),
        }
    }

    /// Missing instants pass through as `None`; callers decide whether an
    /// absent field is acceptable for their record.
    pub fn normalize_opt(
        &self,
        input: Option<&TimeInput>,
    ) -> Result<Option<String>, NormalizationError> {
        input.map(|t| self.normalize(t)).transpose()
    }

    /// Current wall clock rendered in the fixed zone.
    ///
    /// Called at derivation time, not request-receipt time, so the stamp
    /// stays close to the persisted instant.
    pub fn now(&self) -> String {
        Utc::now().with_timezone(&self.tz).to_rfc3339()
    }

    fn from_epoch(&self, secs: i64) -> Result<String, NormalizationError> {
        if !(EPOCH_MIN..EPOCH_MAX).contains(&secs) {
            return Err(NormalizationError::EpochOutOfRange(secs));
        }
        let instant = self
            .tz
            .timestamp_opt(secs, 0)
            .single()
            .ok_or(NormalizationError::EpochOutOfRange(secs))?;
        Ok(instant.to_rfc3339())
    }

    fn from_formatted(&self, raw: &str) -> Result<String, NormalizationError> {
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Ok(instant.with_timezone(&self.tz).to_rfc3339());
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                if let Some(instant) = self.tz.from_local_datetime(&naive).earliest() {
                    return Ok(instant.to_rfc3339());
                }
            }
        }
        Err(NormalizationError::UnparseableTimestamp(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    fn ist() -> TimeNormalizer {
        TimeNormalizer::new(Kolkata)
    }

    #[test]
    fn epoch_converts_through_fixed_zone_offset() {
        let normalized = ist().normalize(&TimeInput::Epoch(1_700_000_000)).unwrap();
        assert_eq!(normalized, "2023-11-15T03:43:20+05:30");
    }

    #[test]
    fn epoch_round_trips_to_same_instant() {
        let normalized = ist().normalize(&TimeInput::Epoch(1_700_000_000)).unwrap();
        let parsed = DateTime::parse_from_rfc3339(&normalized).unwrap();
        assert_eq!(parsed.timestamp(), 1_700_000_000);
    }

    #[test]
    fn epoch_below_plausible_range_is_rejected() {
        let err = ist().normalize(&TimeInput::Epoch(12)).unwrap_err();
        assert_eq!(err, NormalizationError::EpochOutOfRange(12));
    }

    #[test]
    fn epoch_above_plausible_range_is_rejected() {
        let err = ist()
            .normalize(&TimeInput::Epoch(9_999_999_999))
            .unwrap_err();
        assert_eq!(err, NormalizationError::EpochOutOfRange(9_999_999_999));
    }

    #[test]
    fn offset_string_is_shifted_into_fixed_zone() {
        let normalized = ist()
            .normalize(&TimeInput::Formatted(
                "2023-11-14T22:13:20+00:00".to_string(),
            ))
            .unwrap();
        assert_eq!(normalized, "2023-11-15T03:43:20+05:30");
    }

    #[test]
    fn naive_string_is_interpreted_as_fixed_zone_local_time() {
        let normalized = ist()
            .normalize(&TimeInput::Formatted("2024-03-01T10:15:00".to_string()))
            .unwrap();
        assert_eq!(normalized, "2024-03-01T10:15:00+05:30");
    }

    #[test]
    fn naive_string_with_space_separator_is_accepted() {
        let normalized = ist()
            .normalize(&TimeInput::Formatted("2024-03-01 10:15:00".to_string()))
            .unwrap();
        assert_eq!(normalized, "2024-03-01T10:15:00+05:30");
    }

    #[test]
    fn garbage_string_is_rejected() {
        let err = ist()
            .normalize(&TimeInput::Formatted("yesterday-ish".to_string()))
            .unwrap_err();
        assert!(matches!(err, NormalizationError::UnparseableTimestamp(_)));
    }

    #[test]
    fn normalize_opt_passes_none_through() {
        assert_eq!(ist().normalize_opt(None).unwrap(), None);
    }

    #[test]
    fn normalize_opt_normalizes_present_values() {
        let normalized = ist()
            .normalize_opt(Some(&TimeInput::Epoch(1_700_000_000)))
            .unwrap();
        assert_eq!(normalized.as_deref(), Some("2023-11-15T03:43:20+05:30"));
    }

    #[test]
    fn now_carries_fixed_zone_offset() {
        let stamp = ist().now();
        assert!(stamp.ends_with("+05:30"), "unexpected stamp: {stamp}");
    }

    #[test]
    fn different_zone_renders_different_offset() {
        let utc = TimeNormalizer::new(chrono_tz::UTC);
        let normalized = utc.normalize(&TimeInput::Epoch(1_700_000_000)).unwrap();
        assert_eq!(normalized, "2023-11-14T22:13:20+00:00");
    }
}
