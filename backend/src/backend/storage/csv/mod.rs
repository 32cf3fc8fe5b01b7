//! File-backed storage: CSV for flat catalog and customer tables, YAML for
//! submitted subscriptions, JSON for the wizard draft cache.

pub mod addon_repository;
pub mod connection;
pub mod customer_repository;
pub mod draft_repository;
pub mod package_repository;
pub mod subscription_repository;
#[cfg(test)]
pub mod test_utils;

pub use addon_repository::AddonRepository;
pub use connection::CsvConnection;
pub use customer_repository::CustomerRepository;
pub use draft_repository::DraftRepository;
pub use package_repository::PackageRepository;
pub use subscription_repository::SubscriptionRepository;
