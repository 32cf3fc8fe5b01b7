//! # IO Module
//!
//! Provides the interface layer between the user interface and the domain logic.
//!
//! This module serves as the adapter layer that translates UI requests into domain
//! operations and formats domain responses for UI consumption. It handles the
//! communication protocol (REST API), serialization/deserialization, and maintains
//! the boundary between the presentation layer and business logic.
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: Exposing the back-office REST surface to the console UI
//! - **Request/Response Handling**: Processing HTTP requests and formatting responses
//! - **Data Serialization**: Converting between wire DTOs and domain objects
//! - **Error Translation**: Converting domain errors to appropriate HTTP status codes
//! - **Wire Parsing**: Rejecting malformed dates, times, and enum values up front
//!
//! ## Current Implementation
//!
//! - **Web Framework**: Axum for high-performance async HTTP handling
//! - **Serialization**: Serde for JSON serialization/deserialization
//! - **State Management**: Axum extractors for dependency injection
//! - **Error Handling**: Structured error responses with appropriate HTTP codes
//!
//! ## API Design Principles
//!
//! - **RESTful Architecture**: Standard HTTP methods and status codes
//! - **Resource-Oriented**: URLs represent resources (wizard, packages, customers)
//! - **Single Writer**: Subscriptions are only ever written through the wizard;
//!   every other surface is read-only
//! - **Validation Is Data**: Field-level errors travel as 422 payloads, never 500s
//!
//! ## Supported Operations
//!
//! - **POST /api/wizard/open**: Open a wizard session, fresh or for editing
//! - **GET /api/wizard**: Snapshot of the open session
//! - **POST /api/wizard/draft**: Apply one draft action
//! - **POST /api/wizard/next, /api/wizard/back**: Step navigation
//! - **POST /api/wizard/submit**: Validate, persist, and close the session
//! - **DELETE /api/wizard**: Discard the session and any cached draft
//! - **GET /api/packages, /api/addons**: Catalog listings
//! - **GET /api/customers/search, /api/customers/:id**: Customer lookup
//! - **GET /api/subscriptions, /api/subscriptions/:id**: Subscription store
//! - **GET /api/time-slots**: Bookable slot universe
//!
//! ## Design Patterns
//!
//! - **Handler Pattern**: Separate handler functions for each endpoint
//! - **Dependency Injection**: Services injected via Axum state
//! - **Result Mapping**: Clean error handling with appropriate HTTP responses
//! - **Request/Response DTOs**: Dedicated types for API communication

pub mod rest;

pub use rest::*;
