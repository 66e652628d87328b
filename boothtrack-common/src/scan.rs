//! Scan and session data models

use serde::{Deserialize, Serialize};

/// An instant supplied by a scanner, in one of the two accepted wire encodings.
///
/// Beacon firmware reports epoch seconds; the synthetic back-fill path and
/// some older scanners send pre-formatted local timestamp strings. The
/// normalizer accepts either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeInput {
    /// Seconds since the Unix epoch
    Epoch(i64),
    /// Pre-formatted timestamp string (RFC 3339 or naive local)
    Formatted(String),
}

/// Validated scan, produced exclusively by [`crate::validate::validate`].
///
/// Downstream components never touch the raw payload shape; this record is
/// the only input to reduction, normalization, and persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRecord {
    pub device_id: String,
    /// Ordered RSSI samples as received; guaranteed non-empty
    pub rssi_values: Vec<i64>,
    pub in_time: TimeInput,
    pub out_time: TimeInput,
    pub average_distance: f64,
    /// Absent on input means "use the configured default booth"
    pub booth_id: Option<i64>,
}

/// Derived session ready for insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSession {
    pub booth_id: i64,
    pub device_id: String,
    pub rssi_values: Vec<i64>,
    /// Representative RSSI value chosen by the signal reducer;
    /// always an element of `rssi_values`
    pub user_retention: i64,
    /// Fixed-timezone ISO-8601 string
    pub in_time: String,
    /// Fixed-timezone ISO-8601 string
    pub out_time: String,
    pub average_distance: f64,
    /// When the record was committed, in the same fixed timezone
    pub timestamp: String,
}

/// A stored session as returned by the read path. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Store-assigned opaque identifier, rendered as a string
    pub id: String,
    pub booth_id: i64,
    pub device_id: String,
    pub rssi_values: Vec<i64>,
    pub user_retention: i64,
    pub in_time: String,
    pub out_time: String,
    pub average_distance: f64,
    pub timestamp: String,
}
