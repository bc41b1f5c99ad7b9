//! Health checks
//!
//! Liveness never touches the store. Readiness pings it and caches the
//! result for a short while.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pd_core::config::StoreBackend;
use pd_db::EntityStore;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Individual component health
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
}

/// Overall health report
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Timeout for the store ping
    pub check_timeout: Duration,
    /// How long a report is reused
    pub cache_duration: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(5),
            cache_duration: Duration::from_secs(10),
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
    store: Arc<dyn EntityStore>,
    backend: StoreBackend,
}

impl HealthChecker {
    pub fn new(config: HealthConfig, store: Arc<dyn EntityStore>, backend: StoreBackend) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            cache: RwLock::new(None),
            store,
            backend,
        }
    }

    /// Get cached health or perform checks
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.config.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks().await;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedHealth {
            report: report.clone(),
            cached_at: Instant::now(),
        });

        report
    }

    async fn perform_checks(&self) -> HealthReport {
        let store = self.check_store().await;
        let status = store.status;

        HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components: vec![store],
            timestamp: chrono::Utc::now(),
        }
    }

    async fn check_store(&self) -> ComponentHealth {
        let start = Instant::now();

        let (status, message) =
            match tokio::time::timeout(self.config.check_timeout, self.store.ping()).await {
                Ok(Ok(())) => (HealthStatus::Healthy, None),
                Ok(Err(e)) => {
                    warn!(error = %e, "store ping failed");
                    (HealthStatus::Unhealthy, Some(e.to_string()))
                }
                Err(_) => {
                    warn!("store ping timed out");
                    (HealthStatus::Unhealthy, Some("timed out".to_string()))
                }
            };

        let name = match self.backend {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        };

        ComponentHealth {
            name: name.to_string(),
            status,
            message,
            response_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

pub struct HealthState {
    pub health: HealthChecker,
}

/// Liveness check
pub async fn liveness() -> &'static str {
    "OK"
}

/// Readiness check
pub async fn readiness(State(state): State<Arc<HealthState>>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check().await;
    (report.http_status(), Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pd_core::Id;
    use pd_db::{MemoryStore, ProjectFilter, StoreError, StoreResult, TaskFilter};
    use pd_models::{Project, Task, User};

    /// Delegates to a memory store but fails every ping
    struct Unreachable(MemoryStore);

    #[async_trait]
    impl EntityStore for Unreachable {
        async fn get_project(&self, id: Id) -> StoreResult<Project> {
            self.0.get_project(id).await
        }
        async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>> {
            self.0.list_projects(filter).await
        }
        async fn upsert_project(&self, project: Project) -> StoreResult<Project> {
            self.0.upsert_project(project).await
        }
        async fn delete_project(&self, id: Id) -> StoreResult<()> {
            self.0.delete_project(id).await
        }
        async fn get_task(&self, id: Id) -> StoreResult<Task> {
            self.0.get_task(id).await
        }
        async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
            self.0.list_tasks(filter).await
        }
        async fn upsert_task(&self, task: Task) -> StoreResult<Task> {
            self.0.upsert_task(task).await
        }
        async fn delete_task(&self, id: Id) -> StoreResult<()> {
            self.0.delete_task(id).await
        }
        async fn list_users(&self) -> StoreResult<Vec<User>> {
            self.0.list_users().await
        }
        async fn get_user(&self, id: Id) -> StoreResult<User> {
            self.0.get_user(id).await
        }
        async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
            self.0.find_user_by_email(email).await
        }
        async fn insert_user(&self, user: User) -> StoreResult<User> {
            self.0.insert_user(user).await
        }
        async fn update_user(&self, user: User) -> StoreResult<User> {
            self.0.update_user(user).await
        }
        async fn delete_user(&self, id: Id) -> StoreResult<()> {
            self.0.delete_user(id).await
        }
        async fn ping(&self) -> StoreResult<()> {
            Err(StoreError::Conflict("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_memory_store_is_healthy() {
        let checker = HealthChecker::new(
            HealthConfig::default(),
            Arc::new(MemoryStore::new()),
            StoreBackend::Memory,
        );
        let report = checker.check().await;

        assert!(report.status.is_healthy());
        assert_eq!(report.components[0].name, "memory");
    }

    #[tokio::test]
    async fn test_failed_ping_is_unhealthy() {
        let checker = HealthChecker::new(
            HealthConfig::default(),
            Arc::new(Unreachable(MemoryStore::new())),
            StoreBackend::Postgres,
        );
        let report = checker.check().await;

        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.http_status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(report.components[0].message.is_some());
    }

    #[tokio::test]
    async fn test_health_cache() {
        let checker = HealthChecker::new(
            HealthConfig {
                cache_duration: Duration::from_secs(60),
                ..Default::default()
            },
            Arc::new(MemoryStore::new()),
            StoreBackend::Memory,
        );

        let report1 = checker.check().await;
        let report2 = checker.check().await;

        assert_eq!(report1.timestamp, report2.timestamp);
    }
}
