//! # Backend Module
//!
//! Contains all non-UI logic for the wash subscription back office.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Domain**: Business logic for pricing, scheduling, and the wizard
//! - **Storage**: Data persistence mechanisms (CSV, YAML, file system)
//! - **IO**: Interface layer that exposes functionality to the UI
//!
//! The backend is designed to be UI-agnostic, meaning it could theoretically
//! support different frontend frameworks or even CLI interfaces without modification.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! UI Layer (operator console)
//!     ↓
//! IO Layer (REST API, handlers, mappers)
//!     ↓
//! Domain Layer (Business logic, services)
//!     ↓
//! Storage Layer (CSV catalog, YAML subscriptions, draft cache)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize and configure the application state
//! - Set up the REST API router with proper CORS configuration
//! - Coordinate between domain logic and data persistence
//! - Provide a clean separation of concerns for maintainability

pub mod storage;
pub mod domain;
pub mod io;


use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use anyhow::Result;
use std::sync::Arc;
use crate::backend::domain::{CatalogService, CustomerService, SubscriptionService, WizardService};
use crate::backend::storage::csv::CsvConnection;
use log::info;

pub use storage::*;
pub use domain::*;
pub use io::*;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: CatalogService,
    pub customer_service: CustomerService,
    pub subscription_service: SubscriptionService,
    pub wizard_service: WizardService,
}

/// Initialize the backend with all required services
pub async fn initialize_backend() -> Result<AppState> {
    info!("Setting up file storage");
    let csv_conn = Arc::new(CsvConnection::new_default()?);

    info!("Setting up domain model");
    let catalog_service = CatalogService::new(csv_conn.clone());
    let customer_service = CustomerService::new(csv_conn.clone());
    let subscription_service = SubscriptionService::new(csv_conn.clone());
    let wizard_service = WizardService::new(csv_conn);

    info!("Setting up application state");
    let app_state = AppState {
        catalog_service,
        customer_service,
        subscription_service,
        wizard_service,
    };

    Ok(app_state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    // Set up our application routes
    let api_routes = Router::new()
        .merge(io::wizard_apis::router())
        .merge(io::catalog_apis::router())
        .merge(io::customer_apis::router())
        .merge(io::subscription_apis::router())
        .merge(io::time_slot_apis::router());

    // Define our main application router
    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
