//! # pd-services
//!
//! Business operations for ProjectDesk.
//!
//! Every service takes the caller's [`Session`](pd_auth::Session)
//! explicitly, checks it against `pd_auth::permissions` before touching
//! data, and reports failures as [`PdError`](pd_core::PdError).
//!
//! Task writes go through a single commit step in [`TaskService`] that
//! recomputes the owning project's progress afterwards.

pub mod dashboard;
pub mod lifecycle;
pub mod progress;
pub mod projects;
pub mod tasks;
pub mod users;

pub use dashboard::DashboardStats;
pub use lifecycle::{apply_task_update, update_task_status};
pub use progress::{reconcile_project_progress, ProgressReconciler};
pub use projects::ProjectService;
pub use tasks::TaskService;
pub use users::UserService;
