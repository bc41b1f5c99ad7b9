//! # pd-core
//!
//! Core types, traits, and utilities for ProjectDesk.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Error kinds shared by every layer (`PdError`, `ValidationErrors`)
//! - The `PdResult` alias
//! - Entity traits (`Identifiable`, `Timestamped`, `Entity`)
//! - Application configuration

pub mod config;
pub mod error;
pub mod traits;

pub use error::*;
pub use traits::*;
