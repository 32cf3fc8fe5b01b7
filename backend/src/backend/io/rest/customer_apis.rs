//! # REST API for Customer Lookup
//!
//! Endpoints backing the wizard's customer step: a debounced typeahead
//! search and a by-ID fetch.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{error, info};
use serde::Deserialize;

use crate::backend::domain::commands::customers::CustomerSearchQuery;
use crate::backend::io::rest::mappers::customer_mapper::CustomerMapper;
use crate::backend::AppState;

/// Create a router for customer related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers/search", get(search_customers))
        .route("/customers/:customer_id", get(get_customer))
}

#[derive(Debug, Deserialize)]
pub struct CustomerSearchParams {
    /// Name or phone fragment to match, case-insensitive
    pub q: String,
    pub limit: Option<usize>,
}

/// Debounced customer search for the typeahead. Requests superseded by a
/// newer keystroke come back empty with the `superseded` flag set.
pub async fn search_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerSearchParams>,
) -> impl IntoResponse {
    info!("GET /api/customers/search - query: {:?}", params);

    let query = CustomerSearchQuery {
        query: params.q,
        limit: params.limit,
    };

    match state.customer_service.search_debounced(query).await {
        Ok(result) => {
            let response = CustomerMapper::to_search_response(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to search customers: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error searching customers").into_response()
        }
    }
}

/// Get a customer by ID
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/customers/{}", customer_id);

    match state.customer_service.get_customer(&customer_id).await {
        Ok(Some(customer)) => {
            (StatusCode::OK, Json(CustomerMapper::to_dto(&customer))).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "Customer not found").into_response(),
        Err(e) => {
            error!("Failed to get customer {}: {}", customer_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving customer").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::Customer;
    use crate::backend::domain::{
        CatalogService, CustomerService, SubscriptionService, WizardService,
    };
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use crate::backend::storage::csv::CustomerRepository;
    use crate::backend::storage::CustomerStorage;
    use chrono::Utc;
    use shared::CustomerSearchResponse;
    use std::sync::Arc;

    fn setup_test_state() -> (AppState, TestEnvironment) {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let conn = Arc::new(env.connection.clone());
        let app_state = AppState {
            catalog_service: CatalogService::new(conn.clone()),
            customer_service: CustomerService::new(conn.clone()),
            subscription_service: SubscriptionService::new(conn.clone()),
            wizard_service: WizardService::new(conn),
        };
        (app_state, env)
    }

    async fn seed_customer(env: &TestEnvironment, id: &str, name: &str, phone: &str) {
        let now = Utc::now().to_rfc3339();
        let repository = CustomerRepository::new(env.connection.clone());
        repository
            .store_customer(&Customer {
                id: id.to_string(),
                name: name.to_string(),
                phone: phone.to_string(),
                email: None,
                address: None,
                created_at: now.clone(),
                updated_at: now,
            })
            .await
            .expect("Failed to seed customer");
    }

    #[tokio::test]
    async fn test_search_customers_matches_name() {
        let (app_state, env) = setup_test_state();
        seed_customer(&env, "customer::1", "Asha Verma", "9811122233").await;
        seed_customer(&env, "customer::2", "Rahul Nair", "9844556677").await;

        let response = search_customers(
            State(app_state),
            Query(CustomerSearchParams {
                q: "asha".to_string(),
                limit: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body: CustomerSearchResponse =
            serde_json::from_slice(&bytes).expect("Failed to parse body");
        assert!(!body.superseded);
        assert_eq!(body.customers.len(), 1);
        assert_eq!(body.customers[0].name, "Asha Verma");
    }

    #[tokio::test]
    async fn test_get_customer_by_id() {
        let (app_state, env) = setup_test_state();
        seed_customer(&env, "customer::1", "Asha Verma", "9811122233").await;

        let response = get_customer(State(app_state), Path("customer::1".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_unknown_customer_returns_404() {
        let (app_state, _env) = setup_test_state();

        let response = get_customer(State(app_state), Path("customer::404".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
