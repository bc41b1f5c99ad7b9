//! Project progress reconciliation
//!
//! A project's `progress` is the rounded share of its tasks that are done.
//! With no tasks the stored value is left alone.

use std::sync::Arc;

use pd_core::{Id, PdResult};
use pd_db::{EntityStore, StoreError, TaskFilter};
use pd_models::{Project, Task};
use tracing::{debug, info};

/// Percentage of done tasks, rounded half up; `None` for an empty set
pub fn completion_percentage(tasks: &[Task]) -> Option<u8> {
    let total = tasks.len();
    if total == 0 {
        return None;
    }
    let done = tasks.iter().filter(|t| t.is_done()).count();
    Some(((200 * done + total) / (2 * total)) as u8)
}

/// Recompute `progress` from the given tasks of the project.
pub fn reconcile_project_progress(mut project: Project, tasks: &[Task]) -> Project {
    if let Some(progress) = completion_percentage(tasks) {
        project.progress = progress;
    }
    project
}

/// Loads a project's tasks and stores the recomputed progress.
#[derive(Clone)]
pub struct ProgressReconciler {
    store: Arc<dyn EntityStore>,
}

impl ProgressReconciler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Returns the reconciled project, or `None` if it no longer exists.
    /// Only writes when the value actually changes.
    pub async fn reconcile(&self, project_id: Id) -> PdResult<Option<Project>> {
        let project = match self.store.get_project(project_id).await {
            Ok(project) => project,
            Err(StoreError::NotFound { .. }) => {
                debug!(project_id, "nothing to reconcile, project is gone");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let tasks = self
            .store
            .list_tasks(TaskFilter::for_project(project_id))
            .await?;

        let previous = project.progress;
        let reconciled = reconcile_project_progress(project, &tasks);
        if reconciled.progress == previous {
            return Ok(Some(reconciled));
        }

        let saved = self.store.upsert_project(reconciled).await?;
        info!(
            project_id,
            from = previous,
            to = saved.progress,
            tasks = tasks.len(),
            "project progress reconciled"
        );
        Ok(Some(saved))
    }
}
