//! Dashboard statistics
//!
//! Computed from the projects and tasks the caller can see.

use chrono::NaiveDate;
use pd_auth::permissions::{visible_projects, visible_tasks};
use pd_auth::Session;
use pd_core::PdResult;
use pd_db::{EntityStore, ProjectFilter, TaskFilter};
use pd_models::{Project, Task};
use serde::Serialize;

use crate::progress::completion_percentage;

const RECENT_PROJECTS: usize = 3;
const RECENT_TASKS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
    /// Share of visible tasks that are done, 0 when there are none
    pub overall_progress: u8,
    pub recent_projects: Vec<Project>,
    pub recent_tasks: Vec<Task>,
}

impl DashboardStats {
    pub async fn load(store: &dyn EntityStore, session: &Session, today: NaiveDate) -> PdResult<Self> {
        let projects = store.list_projects(ProjectFilter::default()).await?;
        let tasks = store.list_tasks(TaskFilter::default()).await?;
        Ok(Self::compute(session, projects, tasks, today))
    }

    pub fn compute(
        session: &Session,
        projects: Vec<Project>,
        tasks: Vec<Task>,
        today: NaiveDate,
    ) -> Self {
        let mut projects = visible_projects(session, projects);
        let mut tasks = visible_tasks(session, tasks);

        let completed_tasks = tasks.iter().filter(|t| t.is_done()).count();
        let overdue_tasks = tasks.iter().filter(|t| t.is_overdue(today)).count();
        let overall_progress = completion_percentage(&tasks).unwrap_or(0);

        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Self {
            total_projects: projects.len(),
            active_projects: projects.iter().filter(|p| p.status.is_active()).count(),
            total_tasks: tasks.len(),
            completed_tasks,
            pending_tasks: tasks.len() - completed_tasks,
            overdue_tasks,
            overall_progress,
            recent_projects: projects.into_iter().take(RECENT_PROJECTS).collect(),
            recent_tasks: tasks.into_iter().take(RECENT_TASKS).collect(),
        }
    }
}
