//! # REST API for the Wash Catalog
//!
//! Read-only endpoints for the packages and add-ons operators pick from.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{error, info};
use serde::Deserialize;

use crate::backend::domain::commands::catalog::PackageListQuery;
use crate::backend::io::rest::mappers::catalog_mapper::CatalogMapper;
use crate::backend::AppState;
use shared::VehicleType;

/// Create a router for catalog related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/packages", get(list_packages))
        .route("/addons", get(list_addons))
}

#[derive(Debug, Deserialize)]
pub struct PackageListParams {
    /// Optional vehicle filter: hatchback, sedan, suv, or luxury
    pub vehicle_type: Option<String>,
}

/// List active wash packages, optionally narrowed to one vehicle type
pub async fn list_packages(
    State(state): State<AppState>,
    Query(params): Query<PackageListParams>,
) -> impl IntoResponse {
    info!("GET /api/packages - query: {:?}", params);

    let vehicle_type = match params.vehicle_type.as_deref() {
        Some(raw) => match raw.parse::<VehicleType>() {
            Ok(vehicle_type) => Some(vehicle_type),
            Err(message) => {
                error!("Rejected package listing: {}", message);
                return (StatusCode::BAD_REQUEST, message).into_response();
            }
        },
        None => None,
    };

    let query = PackageListQuery { vehicle_type };

    match state.catalog_service.list_packages(query).await {
        Ok(packages) => {
            let response = CatalogMapper::to_package_list_response(packages);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list packages: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving packages").into_response()
        }
    }
}

/// List active wash add-ons
pub async fn list_addons(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/addons");

    match state.catalog_service.list_addons().await {
        Ok(addons) => {
            let response = CatalogMapper::to_addon_list_response(addons);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list add-ons: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving add-ons").into_response()
        }
    }
}
