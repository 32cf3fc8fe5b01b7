//! # REST API for Submitted Subscriptions
//!
//! Read-only endpoints over the subscription store. All writes go through
//! the wizard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{error, info};

use crate::backend::io::rest::mappers::subscription_mapper::SubscriptionMapper;
use crate::backend::AppState;

/// Create a router for subscription related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", get(list_subscriptions))
        .route("/subscriptions/:subscription_id", get(get_subscription))
}

/// List all subscriptions, most recently created first
pub async fn list_subscriptions(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/subscriptions");

    match state.subscription_service.list_subscriptions().await {
        Ok(subscriptions) => {
            let response = SubscriptionMapper::to_list_response(subscriptions);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list subscriptions: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving subscriptions").into_response()
        }
    }
}

/// Get a subscription by ID
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/subscriptions/{}", subscription_id);

    match state
        .subscription_service
        .get_subscription(&subscription_id)
        .await
    {
        Ok(Some(subscription)) => {
            (StatusCode::OK, Json(SubscriptionMapper::to_dto(&subscription))).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "Subscription not found").into_response(),
        Err(e) => {
            error!("Failed to get subscription {}: {}", subscription_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving subscription").into_response()
        }
    }
}
