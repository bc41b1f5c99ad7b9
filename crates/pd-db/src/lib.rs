//! # pd-db
//!
//! Persistence for users, projects and tasks.
//!
//! - [`EntityStore`]: the store contract consumed by the services
//! - [`MemoryStore`]: process-local backend, used by tests and demos
//! - [`PgStore`]: PostgreSQL backend over an sqlx pool
//! - [`codec`]: conversion between the model enums and the stored codes
//!
//! ## Example
//!
//! ```ignore
//! use pd_core::config::AppConfig;
//! use pd_db::{Database, DatabaseConfig, EntityStore, PgStore, TaskFilter};
//!
//! let config = AppConfig::from_env()?;
//! let db = Database::connect(&DatabaseConfig::from_app(&config.database)).await?;
//! let store = PgStore::new(db.pool().clone());
//! let tasks = store.list_tasks(TaskFilter::for_project(1)).await?;
//! ```

pub mod codec;
pub mod memory;
pub mod pool;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use pool::{Database, DatabaseConfig, PoolStats};
pub use postgres::PgStore;
pub use store::{EntityStore, ProjectFilter, StoreError, StoreResult, TaskFilter};
