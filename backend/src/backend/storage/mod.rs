//! # Storage Module
//!
//! Handles all data persistence for the wash-subscription back office.
//!
//! The domain layer only ever talks to the traits in [`traits`]; the
//! file-backed implementations under [`csv`] keep catalog and customer data
//! in CSV files, submitted subscriptions as one YAML file each, and the
//! wizard draft as a single JSON envelope with an expiry timestamp.
//!
//! ## Key Responsibilities
//!
//! - **Data Persistence**: Catalog, customers, subscriptions, and the draft cache
//! - **Storage Abstraction**: Trait-per-aggregate so backends can be swapped
//! - **Atomic Writes**: Temp-file-plus-rename so a crash never half-writes a file
//! - **First-Run Setup**: Creating files with headers and seeding the default catalog

pub mod csv;
pub mod traits;

pub use csv::{
    AddonRepository, CsvConnection, CustomerRepository, DraftRepository, PackageRepository,
    SubscriptionRepository,
};
pub use traits::{
    AddonStorage, CustomerStorage, DraftStorage, PackageStorage, SubscriptionStorage,
};
