//! HTTP API handlers for boothtrack-ingest

pub mod health;
pub mod scans;
pub mod sse;

pub use health::health_routes;
pub use scans::{ingest_scan, list_scans};
pub use sse::event_stream;
