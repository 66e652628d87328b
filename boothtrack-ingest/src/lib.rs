//! boothtrack-ingest library - Scan ingestion service
//!
//! Receives proximity scans from booth hardware, derives dwell-time
//! sessions, persists them, and notifies connected dashboards over SSE.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use boothtrack_common::db::SessionStore;
use boothtrack_common::events::EventBus;
use boothtrack_common::time::TimeNormalizer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Session persistence adapter
    pub store: SessionStore,
    /// Fixed-timezone timestamp normalizer
    pub normalizer: TimeNormalizer,
    /// Broadcast bus feeding connected SSE clients
    pub events: Arc<EventBus>,
    /// Booth id stamped on scans that omit one
    pub default_booth_id: i64,
}

impl AppState {
    /// Create new application state
    pub fn new(
        store: SessionStore,
        normalizer: TimeNormalizer,
        events: Arc<EventBus>,
        default_booth_id: i64,
    ) -> Self {
        Self {
            store,
            normalizer,
            events,
            default_booth_id,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        // Scan ingestion and session read path
        .route("/api/scans", post(api::ingest_scan))
        .route("/api/scans", get(api::list_scans))
        // SSE event stream for dashboards
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        // Enable CORS for dashboard access
        .layer(CorsLayer::permissive())
        .with_state(state)
}
