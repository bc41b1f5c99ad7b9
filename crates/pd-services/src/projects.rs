//! Project service

use std::sync::Arc;

use pd_auth::permissions::{
    authorize, can_create_project, can_delete_project, can_edit_project, can_view_project,
    visible_projects, visible_tasks,
};
use pd_auth::Session;
use pd_contracts::{check_input, Contract, ProjectContract};
use pd_core::{Action, Id, PdError, PdResult};
use pd_db::{EntityStore, ProjectFilter, TaskFilter};
use pd_models::{CreateProject, Project, Task, UpdateProject};
use tracing::{debug, info};

use crate::progress::ProgressReconciler;

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn EntityStore>,
    reconciler: ProgressReconciler,
}

impl ProjectService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            reconciler: ProgressReconciler::new(store.clone()),
            store,
        }
    }

    /// Members only ever see projects they belong to, whatever the filter
    pub async fn list(&self, session: &Session, mut filter: ProjectFilter) -> PdResult<Vec<Project>> {
        if !session.is_manager() {
            filter.member_id = Some(session.user_id);
        }
        let projects = self.store.list_projects(filter).await?;
        let visible = visible_projects(session, projects);
        debug!(user_id = session.user_id, count = visible.len(), "projects listed");
        Ok(visible)
    }

    pub async fn get(&self, session: &Session, id: Id) -> PdResult<Project> {
        let project = self.store.get_project(id).await?;
        authorize(
            session,
            can_view_project(session, &project),
            Action::View,
            "Project",
            Some(id),
        )?;
        Ok(project)
    }

    pub async fn create(&self, session: &Session, input: CreateProject) -> PdResult<Project> {
        authorize(
            session,
            can_create_project(session),
            Action::Create,
            "Project",
            None,
        )?;
        ProjectContract.validate(&input)?;

        let (Some(start_date), Some(end_date)) = (input.start_date, input.end_date) else {
            return Err(PdError::Internal("validated project without dates".to_string()));
        };

        let mut project = Project::new(input.title.trim(), start_date, end_date, session.user_id)
            .with_members(input.members);
        project.description = input.description;
        project.status = input.status.unwrap_or_default();

        let saved = self.store.upsert_project(project).await?;
        info!(
            project_id = ?saved.id,
            manager_id = session.user_id,
            members = saved.members.len(),
            "project created"
        );
        Ok(saved)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Id,
        update: UpdateProject,
    ) -> PdResult<Project> {
        let mut project = self.store.get_project(id).await?;
        authorize(
            session,
            can_edit_project(session, &project),
            Action::Edit,
            "Project",
            Some(id),
        )?;
        check_input(&update)?;

        update.apply_to(&mut project);
        ProjectContract.validate(&project)?;

        self.store.upsert_project(project).await?;
        info!(project_id = id, user_id = session.user_id, "project updated");

        // an edited progress only sticks while the project has no tasks
        match self.reconciler.reconcile(id).await? {
            Some(reconciled) => Ok(reconciled),
            None => Err(PdError::not_found("Project", id)),
        }
    }

    /// Removes the project together with all of its tasks
    pub async fn delete(&self, session: &Session, id: Id) -> PdResult<()> {
        let project = self.store.get_project(id).await?;
        authorize(
            session,
            can_delete_project(session, &project),
            Action::Delete,
            "Project",
            Some(id),
        )?;

        self.store.delete_project(id).await?;
        info!(project_id = id, user_id = session.user_id, "project deleted");
        Ok(())
    }

    /// Tasks of a project the caller may see
    pub async fn tasks(&self, session: &Session, project_id: Id) -> PdResult<Vec<Task>> {
        self.get(session, project_id).await?;
        let tasks = self
            .store
            .list_tasks(TaskFilter::for_project(project_id))
            .await?;
        Ok(visible_tasks(session, tasks))
    }
}
