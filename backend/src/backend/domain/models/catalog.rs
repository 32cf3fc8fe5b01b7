use serde::{Deserialize, Serialize};
use shared::VehicleType;

/// A wash package as sold: a monthly price buying a fixed number of washes
/// for one vehicle category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WashPackage {
    pub id: String,
    pub name: String,
    pub vehicle_type: VehicleType,
    pub subscription_price: f64,
    pub max_washes_per_month: u32,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl WashPackage {
    pub fn generate_id(now_millis: u64) -> String {
        format!("package::{}", now_millis)
    }
}

/// An optional extra priced per wash it is applied to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WashAddon {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl WashAddon {
    pub fn generate_id(now_millis: u64) -> String {
        format!("addon::{}", now_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Customer {
    pub fn generate_id(now_millis: u64) -> String {
        format!("customer::{}", now_millis)
    }

    /// Case-insensitive substring match on name or phone
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.name.to_lowercase().contains(&needle) || self.phone.to_lowercase().contains(&needle)
    }
}
