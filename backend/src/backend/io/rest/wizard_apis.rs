//! # REST API for the Subscription Wizard
//!
//! Endpoints for opening, inspecting, mutating, and closing the wizard
//! session. All draft mutations go through POST /api/wizard/draft with a
//! tagged action payload.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{error, info};

use crate::backend::domain::commands::wizard::{OpenWizardCommand, SubmitOutcome};
use crate::backend::io::rest::mappers::draft_mapper::DraftMapper;
use crate::backend::AppState;
use shared::{DiscardWizardResponse, DraftActionRequest, OpenWizardRequest, SubmitWizardResponse};

/// Create a router for wizard related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wizard/open", post(open_wizard))
        .route("/wizard", get(get_wizard_state).delete(discard_wizard))
        .route("/wizard/draft", post(apply_draft_action))
        .route("/wizard/next", post(advance_wizard))
        .route("/wizard/back", post(retreat_wizard))
        .route("/wizard/submit", post(submit_wizard))
}

/// Open a wizard session, fresh or hydrated from an existing subscription
pub async fn open_wizard(
    State(state): State<AppState>,
    Json(request): Json<OpenWizardRequest>,
) -> impl IntoResponse {
    info!("POST /api/wizard/open - request: {:?}", request);

    let command = OpenWizardCommand {
        subscription_id: request.subscription_id,
    };

    match state.wizard_service.open(command).await {
        Ok(snapshot) => {
            let response = DraftMapper::snapshot_to_state(snapshot);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to open wizard: {}", e);
            let status = if e.to_string().contains("Subscription not found") {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string()).into_response()
        }
    }
}

/// Get the current wizard session state
pub async fn get_wizard_state(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/wizard");

    match state.wizard_service.state() {
        Ok(snapshot) => {
            let response = DraftMapper::snapshot_to_state(snapshot);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to get wizard state: {}", e);
            let status = if e.to_string().contains("No wizard session is open") {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string()).into_response()
        }
    }
}

/// Apply one draft action to the open session
pub async fn apply_draft_action(
    State(state): State<AppState>,
    Json(request): Json<DraftActionRequest>,
) -> impl IntoResponse {
    info!("POST /api/wizard/draft - action: {:?}", request);

    let action = match DraftMapper::action_to_domain(request) {
        Ok(action) => action,
        Err(message) => {
            error!("Rejected draft action: {}", message);
            return (StatusCode::BAD_REQUEST, message).into_response();
        }
    };

    match state.wizard_service.apply(action).await {
        Ok(result) => {
            let response = DraftMapper::apply_result_to_response(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to apply draft action: {}", e);
            let status = if e.to_string().contains("No wizard session is open") {
                StatusCode::NOT_FOUND
            } else if e.to_string().contains("locked") {
                StatusCode::CONFLICT
            } else if e.to_string().contains("not found") {
                StatusCode::NOT_FOUND
            } else if e.to_string().contains("Months duration must be")
                || e.to_string().contains("at index")
                || e.to_string().contains("start date is required")
            {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string()).into_response()
        }
    }
}

/// Advance the wizard to the next step if the current one validates
pub async fn advance_wizard(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/wizard/next");

    match state.wizard_service.next().await {
        Ok(result) => {
            let response = DraftMapper::advance_to_response(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to advance wizard: {}", e);
            let status = if e.to_string().contains("No wizard session is open") {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string()).into_response()
        }
    }
}

/// Step the wizard back without validation
pub async fn retreat_wizard(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/wizard/back");

    match state.wizard_service.back().await {
        Ok(result) => {
            let response = DraftMapper::advance_to_response(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to step wizard back: {}", e);
            let status = if e.to_string().contains("No wizard session is open") {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string()).into_response()
        }
    }
}

/// Submit the wizard, persisting the subscription and closing the session
pub async fn submit_wizard(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/wizard/submit");

    match state.wizard_service.submit().await {
        Ok(SubmitOutcome::Completed(subscription)) => {
            let response = SubmitWizardResponse {
                subscription_id: subscription.id.clone(),
                success_message: format!("Subscription saved for {}", subscription.customer_name),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Ok(SubmitOutcome::Rejected(errors)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
        }
        Err(e) => {
            error!("Failed to submit wizard: {}", e);
            let status = if e.to_string().contains("only available on the final step") {
                StatusCode::CONFLICT
            } else if e.to_string().contains("No wizard session is open") {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string()).into_response()
        }
    }
}

/// Discard the wizard session and any cached draft
pub async fn discard_wizard(State(state): State<AppState>) -> impl IntoResponse {
    info!("DELETE /api/wizard");

    match state.wizard_service.discard().await {
        Ok(()) => {
            let response = DiscardWizardResponse {
                success_message: "Wizard session discarded".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to discard wizard: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
