//! # Domain Module
//!
//! Contains all business logic for the wash-subscription back office.
//!
//! This module encapsulates the business rules, entities, and services that
//! define how wash packages are priced, how wash calendars are generated,
//! and how the subscription wizard walks an operator from customer selection
//! to a submitted subscription. It operates independently of any specific UI
//! framework or storage mechanism.
//!
//! ## Module Organization
//!
//! - **wizard**: The five-step subscription wizard state machine
//! - **pricing**: Line-item and totals math (discounts, tax, rounding)
//! - **schedule**: Wash-calendar generation, manual slot allocation, validation
//! - **catalog**: Read access to the package and add-on catalog
//! - **customers**: Customer lookup and debounced search
//! - **subscriptions**: Read access to submitted subscriptions
//! - **time_slots**: The bookable time-slot universe and display formatting
//! - **commands**: Command and query types the service layer accepts
//! - **models**: Domain entities shared across the services
//!
//! ## Key Responsibilities
//!
//! - **Wizard Orchestration**: One in-progress draft, stepped validation, locks
//! - **Pricing**: Recomputing every derived money figure after each mutation
//! - **Schedule Generation**: Weekly and interval recurrence rules with
//!   shortfall reporting
//! - **Draft Persistence**: Caching the in-progress draft so an interrupted
//!   session can resume within its expiry window
//! - **Search**: Debounced customer search where only the latest query wins
//!
//! ## Business Rules
//!
//! - Package lines are priced per month of the term; quantity is recorded
//!   but never multiplied into the price
//! - Add-ons are priced per wash they apply to
//! - Each package contributes its monthly wash count for every month of the
//!   term; the wash calendar must match that total exactly
//! - Wash schedules freeze once any payment has been taken; payment details
//!   freeze once the subscription is fully settled
//! - A cached draft expires on a rolling clock, restarted on every save
//!
//! ## Design Principles
//!
//! - **Single Responsibility**: Each service has a focused purpose
//! - **Storage Agnostic**: Services talk to storage through traits
//! - **UI Agnostic**: Business logic separate from presentation concerns
//! - **Validation as Data**: Field problems are returned, never thrown

pub mod catalog;
pub mod commands;
pub mod customers;
pub mod models;
pub mod pricing;
pub mod schedule;
pub mod subscriptions;
pub mod time_slots;
pub mod wizard;

pub use catalog::*;
pub use customers::*;
pub use pricing::*;
pub use schedule::*;
pub use subscriptions::*;
pub use time_slots::*;
pub use wizard::*;
