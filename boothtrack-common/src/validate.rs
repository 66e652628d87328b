//! Inbound scan validation
//!
//! The validator is the only component that touches the raw payload shape.
//! It checks presence and type of every required field, collecting every
//! violation rather than stopping at the first, and produces the typed
//! [`ScanRecord`] consumed by the rest of the pipeline.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::scan::{ScanRecord, TimeInput};

/// Field-keyed validation failure.
///
/// Maps each offending field to the list of rules it violated, so clients
/// see every problem in one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("invalid scan payload: {} field(s) rejected", .fields.len())]
pub struct ValidationFailure {
    pub fields: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationFailure {
    fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    fn push(&mut self, field: &'static str, reason: &str) {
        self.fields
            .entry(field)
            .or_default()
            .push(reason.to_string());
    }

    fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Validate an inbound scan payload into a [`ScanRecord`].
///
/// Pure check, no side effects. `booth_id` is optional; everything else is
/// required. On failure the result enumerates every offending field.
pub fn validate(payload: &Value) -> Result<ScanRecord, ValidationFailure> {
    let mut failure = ValidationFailure::new();

    let Some(object) = payload.as_object() else {
        failure.push("payload", "must be a JSON object");
        return Err(failure);
    };

    let device_id = match object.get("device_id") {
        None | Some(Value::Null) => {
            failure.push("device_id", "missing required field");
            None
        }
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::String(_)) => {
            failure.push("device_id", "must not be empty");
            None
        }
        Some(_) => {
            failure.push("device_id", "must be a string");
            None
        }
    };

    let rssi_values = match object.get("rssi_values") {
        None | Some(Value::Null) => {
            failure.push("rssi_values", "missing required field");
            None
        }
        Some(Value::Array(items)) => {
            let samples: Option<Vec<i64>> = items.iter().map(Value::as_i64).collect();
            match samples {
                Some(samples) if samples.is_empty() => {
                    failure.push("rssi_values", "must contain at least one sample");
                    None
                }
                Some(samples) => Some(samples),
                None => {
                    failure.push("rssi_values", "must be an array of integers");
                    None
                }
            }
        }
        Some(_) => {
            failure.push("rssi_values", "must be an array of integers");
            None
        }
    };

    let in_time = check_time(object.get("in_time"), "in_time", &mut failure);
    let out_time = check_time(object.get("out_time"), "out_time", &mut failure);

    let average_distance = match object.get("average_distance") {
        None | Some(Value::Null) => {
            failure.push("average_distance", "missing required field");
            None
        }
        Some(value) => match value.as_f64() {
            Some(distance) if distance >= 0.0 => Some(distance),
            Some(_) => {
                failure.push("average_distance", "must be non-negative");
                None
            }
            None => {
                failure.push("average_distance", "must be a number");
                None
            }
        },
    };

    let booth_id = match object.get("booth_id") {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_i64() {
            Some(id) => Some(id),
            None => {
                failure.push("booth_id", "must be an integer");
                None
            }
        },
    };

    match (device_id, rssi_values, in_time, out_time, average_distance) {
        (
            Some(device_id),
            Some(rssi_values),
            Some(in_time),
            Some(out_time),
            Some(average_distance),
        ) if failure.is_empty() => Ok(ScanRecord {
            device_id,
            rssi_values,
            in_time,
            out_time,
            average_distance,
            booth_id,
        }),
        _ => Err(failure),
    }
}

fn check_time(
    value: Option<&Value>,
    field: &'static str,
    failure: &mut ValidationFailure,
) -> Option<TimeInput> {
    match value {
        None | Some(Value::Null) => {
            failure.push(field, "missing required field");
            None
        }
        Some(value) => {
            if let Some(epoch) = value.as_i64() {
                Some(TimeInput::Epoch(epoch))
            } else if let Some(s) = value.as_str() {
                Some(TimeInput::Formatted(s.to_string()))
            } else {
                failure.push(field, "must be epoch seconds or a timestamp string");
                None
            }
        }
    }
}
