//! Entity store contract
//!
//! Both backends implement [`EntityStore`]. Listings come back newest first
//! (`created_at` descending). Upserting a record without an id inserts it
//! and stamps `created_at`; upserting with an id replaces the stored record
//! but keeps its original `created_at`.

use async_trait::async_trait;
use pd_core::error::PdError;
use pd_core::traits::Id;
use pd_models::{Priority, Project, ProjectStatus, Task, TaskStatus, User};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} with id={id} not found")]
    NotFound { entity: &'static str, id: Id },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value that does not map back onto the model
    #[error("Cannot decode {column}: {value:?}")]
    Decode { column: &'static str, value: String },

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for PdError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => PdError::not_found(entity, id),
            StoreError::Conflict(message) => PdError::conflict(message),
            StoreError::Database(e) => PdError::Database(e.to_string()),
            decode @ StoreError::Decode { .. } => PdError::Database(decode.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Only projects listing this user as a member
    pub member_id: Option<Id>,
    pub status: Option<ProjectStatus>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        self.member_id.map_or(true, |id| project.has_member(id))
            && self.status.map_or(true, |status| project.status == status)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub project_id: Option<Id>,
    pub assigned_to: Option<Id>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn for_project(project_id: Id) -> Self {
        Self {
            project_id: Some(project_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.project_id.map_or(true, |id| task.project_id == id)
            && self.assigned_to.map_or(true, |id| task.assigned_to == id)
            && self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
    }
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_project(&self, id: Id) -> StoreResult<Project>;

    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>>;

    async fn upsert_project(&self, project: Project) -> StoreResult<Project>;

    /// Deletes the project and every task referencing it
    async fn delete_project(&self, id: Id) -> StoreResult<()>;

    async fn get_task(&self, id: Id) -> StoreResult<Task>;

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>>;

    async fn upsert_task(&self, task: Task) -> StoreResult<Task>;

    async fn delete_task(&self, id: Id) -> StoreResult<()>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn get_user(&self, id: Id) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Fails with `Conflict` when the e-mail is already registered
    async fn insert_user(&self, user: User) -> StoreResult<User>;

    /// Replaces a stored user; `Conflict` when the e-mail belongs to someone else
    async fn update_user(&self, user: User) -> StoreResult<User>;

    async fn delete_user(&self, id: Id) -> StoreResult<()>;

    /// Cheap reachability check for health reporting
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_task_filter() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let task = Task::new("T", 3, 7, due);

        assert!(TaskFilter::default().matches(&task));
        assert!(TaskFilter::for_project(3).matches(&task));
        assert!(!TaskFilter::for_project(4).matches(&task));

        let filter = TaskFilter {
            project_id: Some(3),
            assigned_to: Some(8),
            ..Default::default()
        };
        assert!(!filter.matches(&task));

        let open_high = TaskFilter {
            status: Some(TaskStatus::Todo),
            priority: Some(Priority::High),
            ..Default::default()
        };
        assert!(!open_high.matches(&task));
        let mut urgent = task.clone();
        urgent.priority = Priority::High;
        assert!(open_high.matches(&urgent));
    }

    #[test]
    fn test_project_filter() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let project = Project::new("P", start, end, 1).with_members([5]);

        let by_member = ProjectFilter {
            member_id: Some(5),
            ..Default::default()
        };
        assert!(by_member.matches(&project));

        let by_status = ProjectFilter {
            status: Some(ProjectStatus::Paused),
            ..Default::default()
        };
        assert!(!by_status.matches(&project));
    }

    #[test]
    fn test_store_error_to_pd_error() {
        let err: PdError = StoreError::NotFound { entity: "Task", id: 9 }.into();
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);

        let err: PdError = StoreError::Conflict("email taken".into()).into();
        assert_eq!(err.status_code(), 409);
    }
}
