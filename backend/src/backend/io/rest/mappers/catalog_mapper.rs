use crate::backend::domain::models::{WashAddon, WashPackage};
use shared::{AddonListResponse, PackageListResponse, WashAddonDto, WashPackageDto};

pub struct CatalogMapper;

impl CatalogMapper {
    /// Convert a domain package to its wire form
    pub fn package_to_dto(package: &WashPackage) -> WashPackageDto {
        WashPackageDto {
            id: package.id.clone(),
            name: package.name.clone(),
            vehicle_type: package.vehicle_type,
            subscription_price: package.subscription_price,
            max_washes_per_month: package.max_washes_per_month,
            description: package.description.clone(),
            is_active: package.is_active,
        }
    }

    /// Convert a domain add-on to its wire form
    pub fn addon_to_dto(addon: &WashAddon) -> WashAddonDto {
        WashAddonDto {
            id: addon.id.clone(),
            name: addon.name.clone(),
            price: addon.price,
            description: addon.description.clone(),
            is_active: addon.is_active,
        }
    }

    pub fn to_package_list_response(packages: Vec<WashPackage>) -> PackageListResponse {
        PackageListResponse {
            packages: packages.iter().map(Self::package_to_dto).collect(),
        }
    }

    pub fn to_addon_list_response(addons: Vec<WashAddon>) -> AddonListResponse {
        AddonListResponse {
            addons: addons.iter().map(Self::addon_to_dto).collect(),
        }
    }
}
