//! # REST API for Bookable Time Slots
//!
//! Serves the fixed slot universe schedule pickers work from, both raw
//! and display-formatted.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;

use crate::backend::domain::time_slots::{DEFAULT_TIME_SLOTS, DEFAULT_TIME_SLOT_LABELS};
use crate::backend::AppState;
use shared::TimeSlotsResponse;

/// Create a router for time-slot related APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/time-slots", get(get_time_slots))
}

/// Get the bookable slot universe with matching 12-hour labels
pub async fn get_time_slots() -> impl IntoResponse {
    info!("GET /api/time-slots");

    let response = TimeSlotsResponse {
        slots: DEFAULT_TIME_SLOTS.clone(),
        display: DEFAULT_TIME_SLOT_LABELS.clone(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_time_slots_returns_full_universe() {
        let response = get_time_slots().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body: TimeSlotsResponse =
            serde_json::from_slice(&bytes).expect("Failed to parse body");

        assert_eq!(body.slots.len(), 29);
        assert_eq!(body.slots.first().map(String::as_str), Some("06:00"));
        assert_eq!(body.slots.last().map(String::as_str), Some("20:00"));
        assert_eq!(body.display.len(), body.slots.len());
        assert_eq!(body.display[0], "06:00 AM");
    }
}
