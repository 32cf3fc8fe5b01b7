//! # Storage Traits
//!
//! Storage abstraction traits that let the domain layer work with any
//! persistence backend.

use anyhow::Result;
use async_trait::async_trait;

use crate::backend::domain::models::{
    Customer, DraftEnvelope, Subscription, WashAddon, WashPackage,
};
use shared::VehicleType;

/// Interface for wash-package catalog storage
#[async_trait]
pub trait PackageStorage: Send + Sync {
    /// Store a package, replacing any existing record with the same ID
    async fn store_package(&self, package: &WashPackage) -> Result<()>;

    /// Retrieve a specific package by ID
    async fn get_package(&self, package_id: &str) -> Result<Option<WashPackage>>;

    /// List active packages ordered by name, optionally for one vehicle type
    async fn list_packages(&self, vehicle_type: Option<VehicleType>) -> Result<Vec<WashPackage>>;
}

/// Interface for add-on catalog storage
#[async_trait]
pub trait AddonStorage: Send + Sync {
    /// Store an add-on, replacing any existing record with the same ID
    async fn store_addon(&self, addon: &WashAddon) -> Result<()>;

    /// Retrieve a specific add-on by ID
    async fn get_addon(&self, addon_id: &str) -> Result<Option<WashAddon>>;

    /// List active add-ons ordered by name
    async fn list_addons(&self) -> Result<Vec<WashAddon>>;
}

/// Interface for customer storage
#[async_trait]
pub trait CustomerStorage: Send + Sync {
    /// Store a customer, replacing any existing record with the same ID
    async fn store_customer(&self, customer: &Customer) -> Result<()>;

    /// Retrieve a specific customer by ID
    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>>;

    /// List all customers ordered by name
    async fn list_customers(&self) -> Result<Vec<Customer>>;

    /// Case-insensitive substring search over name and phone, capped at
    /// `limit` results, ordered by name
    async fn search_customers(&self, query: &str, limit: usize) -> Result<Vec<Customer>>;
}

/// Interface for submitted-subscription storage. `store_subscription` is
/// the acceptor the wizard hands a finished draft to.
#[async_trait]
pub trait SubscriptionStorage: Send + Sync {
    /// Persist a subscription, replacing any existing record with the same ID
    async fn store_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Retrieve a specific subscription by ID
    async fn get_subscription(&self, subscription_id: &str) -> Result<Option<Subscription>>;

    /// List all subscriptions, most recently created first
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>>;
}

/// Interface for the single-slot wizard draft cache. The repository only
/// moves envelopes; expiry policy lives with the wizard.
#[async_trait]
pub trait DraftStorage: Send + Sync {
    /// Persist the draft envelope, overwriting any previous one
    async fn save_draft(&self, envelope: &DraftEnvelope) -> Result<()>;

    /// Load the stored envelope, if any. An unreadable file is removed and
    /// reported as absent.
    async fn load_draft(&self) -> Result<Option<DraftEnvelope>>;

    /// Remove the stored envelope. Returns true when something was deleted.
    async fn clear_draft(&self) -> Result<bool>;
}
