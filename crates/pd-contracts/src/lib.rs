//! # pd-contracts
//!
//! Structural validation of projects, tasks and registrations.
//!
//! Contracts only answer "is this input well formed"; who may submit it is
//! decided by `pd_auth::permissions`. Failures are reported as
//! [`pd_core::ValidationErrors`].

pub mod base;
pub mod projects;
pub mod tasks;
pub mod users;

pub use base::{check_input, Contract, ValidationResult};
pub use projects::ProjectContract;
pub use tasks::TaskContract;
pub use users::RegistrationContract;
