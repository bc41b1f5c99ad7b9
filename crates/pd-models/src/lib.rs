//! # pd-models
//!
//! Domain models for ProjectDesk.
//!
//! Status, priority and role are closed enums here. Their legacy storage codes
//! are handled by the store adapter in `pd-db`, never by the models.

pub use pd_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};

pub mod priority;
pub mod project;
pub mod role;
pub mod status;
pub mod task;
pub mod user;

pub use priority::Priority;
pub use project::{CreateProject, Project, UpdateProject};
pub use role::Role;
pub use status::{ProjectStatus, TaskStatus};
pub use task::{CreateTask, Task, TaskUpdate};
pub use user::{RegisterUser, UpdateUser, User};
