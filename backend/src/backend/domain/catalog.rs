use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::commands::catalog::PackageListQuery;
use crate::backend::domain::models::{WashAddon, WashPackage};
use crate::backend::storage::csv::{AddonRepository, CsvConnection, PackageRepository};
use crate::backend::storage::{AddonStorage, PackageStorage};

/// Read-side service for the wash package and add-on catalog
#[derive(Clone)]
pub struct CatalogService {
    package_repository: PackageRepository,
    addon_repository: AddonRepository,
}

impl CatalogService {
    /// Create a new CatalogService
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            package_repository: PackageRepository::new((*csv_conn).clone()),
            addon_repository: AddonRepository::new((*csv_conn).clone()),
        }
    }

    /// List active packages, optionally narrowed to one vehicle type
    pub async fn list_packages(&self, query: PackageListQuery) -> Result<Vec<WashPackage>> {
        info!(
            "Listing wash packages (vehicle filter: {:?})",
            query.vehicle_type
        );

        let packages = self
            .package_repository
            .list_packages(query.vehicle_type)
            .await?;

        info!("Found {} packages", packages.len());
        Ok(packages)
    }

    /// Get a package by ID
    pub async fn get_package(&self, package_id: &str) -> Result<Option<WashPackage>> {
        let package = self.package_repository.get_package(package_id).await?;

        if package.is_none() {
            warn!("Package not found: {}", package_id);
        }

        Ok(package)
    }

    /// List all active add-ons
    pub async fn list_addons(&self) -> Result<Vec<WashAddon>> {
        info!("Listing wash add-ons");

        let addons = self.addon_repository.list_addons().await?;

        info!("Found {} add-ons", addons.len());
        Ok(addons)
    }

    /// Get an add-on by ID
    pub async fn get_addon(&self, addon_id: &str) -> Result<Option<WashAddon>> {
        let addon = self.addon_repository.get_addon(addon_id).await?;

        if addon.is_none() {
            warn!("Add-on not found: {}", addon_id);
        }

        Ok(addon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use shared::VehicleType;

    fn setup_test() -> (CatalogService, TestEnvironment) {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let service = CatalogService::new(Arc::new(env.connection.clone()));
        (service, env)
    }

    #[tokio::test]
    async fn test_list_packages_returns_seeded_catalog() {
        let (service, _env) = setup_test();

        let packages = service
            .list_packages(PackageListQuery::default())
            .await
            .expect("Failed to list packages");

        assert_eq!(packages.len(), 4);
        // Ordered by name
        assert_eq!(packages[0].name, "Basic Shine");
        assert_eq!(packages[3].name, "Royale Detail");
    }

    #[tokio::test]
    async fn test_list_packages_with_vehicle_filter() {
        let (service, _env) = setup_test();

        let packages = service
            .list_packages(PackageListQuery {
                vehicle_type: Some(VehicleType::Suv),
            })
            .await
            .expect("Failed to list packages");

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "Premium Foam");
    }

    #[tokio::test]
    async fn test_get_package_by_id() {
        let (service, _env) = setup_test();

        let packages = service
            .list_packages(PackageListQuery::default())
            .await
            .expect("Failed to list packages");

        let found = service
            .get_package(&packages[0].id)
            .await
            .expect("Failed to get package");
        assert_eq!(found, Some(packages[0].clone()));

        let missing = service
            .get_package("package::nonexistent")
            .await
            .expect("Failed to query package");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_addons_returns_seeded_catalog() {
        let (service, _env) = setup_test();

        let addons = service.list_addons().await.expect("Failed to list addons");

        assert_eq!(addons.len(), 3);
        assert_eq!(addons[0].name, "Ceramic Spray");
        assert_eq!(addons[1].name, "Interior Vacuum");
        assert_eq!(addons[2].name, "Underbody Wash");
    }

    #[tokio::test]
    async fn test_get_addon_by_id() {
        let (service, _env) = setup_test();

        let addons = service.list_addons().await.expect("Failed to list addons");

        let found = service
            .get_addon(&addons[0].id)
            .await
            .expect("Failed to get addon");
        assert_eq!(found, Some(addons[0].clone()));

        let missing = service
            .get_addon("addon::nonexistent")
            .await
            .expect("Failed to query addon");
        assert!(missing.is_none());
    }
}
