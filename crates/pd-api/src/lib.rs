//! # pd-api
//!
//! JSON REST API for ProjectDesk.
//!
//! Handlers stay thin: they rebuild the caller's session from the bearer
//! token, hand it to a service from `pd-services` and map the result.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::AppState;
pub use routes::router;
