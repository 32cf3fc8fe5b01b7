//! # REST API Interface Layer
//!
//! Provides HTTP REST endpoints for the wash subscription back office.
//! This layer handles:
//! - HTTP request/response serialization and deserialization
//! - Wire-format parsing for dates, times, and enum parameters
//! - Error translation from domain to HTTP status codes
//! - Request logging and monitoring
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: RESTful HTTP interfaces for all operations
//! - **Error Handling**: Converting domain errors to proper HTTP responses
//! - **Serialization**: JSON request/response handling
//! - **Mapping**: DTO <-> domain conversion, including all date and time
//!   string formats
//!
//! ## Design Principles
//!
//! - **REST Compliance**: Following RESTful design patterns
//! - **Error Transparency**: Clear error messages for debugging
//! - **Domain Separation**: Pure translation layer without business logic

// Module declarations
pub mod mappers;

pub mod catalog_apis;
pub mod customer_apis;
pub mod subscription_apis;
pub mod time_slot_apis;
pub mod wizard_apis;
