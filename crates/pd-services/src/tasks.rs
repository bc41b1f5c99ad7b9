//! Task service
//!
//! Every write ends in [`TaskService::commit`], which persists the change
//! and then reconciles the owning project's progress.

use std::sync::Arc;

use pd_auth::permissions::{authorize, can_create_task, can_delete_task, can_view_task, visible_tasks};
use pd_auth::Session;
use pd_contracts::{Contract, TaskContract};
use pd_core::{Action, Id, PdError, PdResult};
use pd_db::{EntityStore, TaskFilter};
use pd_models::{CreateTask, Task, TaskStatus, TaskUpdate};
use tracing::{debug, info};

use crate::lifecycle::{apply_task_update, update_task_status};
use crate::progress::ProgressReconciler;

enum Change {
    Save(Task),
    Remove(Task),
}

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn EntityStore>,
    reconciler: ProgressReconciler,
}

impl TaskService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            reconciler: ProgressReconciler::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, session: &Session, filter: TaskFilter) -> PdResult<Vec<Task>> {
        let tasks = self.store.list_tasks(filter).await?;
        let visible = visible_tasks(session, tasks);
        debug!(user_id = session.user_id, count = visible.len(), "tasks listed");
        Ok(visible)
    }

    pub async fn get(&self, session: &Session, id: Id) -> PdResult<Task> {
        let task = self.store.get_task(id).await?;
        authorize(
            session,
            can_view_task(session, &task),
            Action::View,
            "Task",
            Some(id),
        )?;
        Ok(task)
    }

    pub async fn create(&self, session: &Session, input: CreateTask) -> PdResult<Task> {
        authorize(session, can_create_task(session), Action::Create, "Task", None)?;
        TaskContract.validate(&input)?;

        let (Some(project_id), Some(assigned_to), Some(due_date)) =
            (input.project_id, input.assigned_to, input.due_date)
        else {
            return Err(PdError::Internal("validated task without references".to_string()));
        };
        // the project must exist before anything is written
        self.store.get_project(project_id).await?;

        let mut task = Task::new(input.title.trim(), project_id, assigned_to, due_date);
        task.description = input.description;
        task.status = input.status.unwrap_or_default();
        task.priority = input.priority.unwrap_or_default();

        let saved = self.commit(Change::Save(task)).await?;
        info!(task_id = ?saved.id, project_id, assigned_to, "task created");
        Ok(saved)
    }

    /// Managers replace editable fields, the assignee changes the status only
    pub async fn update(&self, session: &Session, id: Id, update: TaskUpdate) -> PdResult<Task> {
        let stored = self.store.get_task(id).await?;
        let task = apply_task_update(session, &stored, &update)?;
        TaskContract.validate(&task)?;

        let saved = self.commit(Change::Save(task)).await?;
        if saved.status != stored.status {
            info!(
                task_id = id,
                from = %stored.status,
                to = %saved.status,
                user_id = session.user_id,
                "task status changed"
            );
        } else {
            info!(task_id = id, user_id = session.user_id, "task updated");
        }
        Ok(saved)
    }

    pub async fn update_status(
        &self,
        session: &Session,
        id: Id,
        status: TaskStatus,
    ) -> PdResult<Task> {
        let stored = self.store.get_task(id).await?;
        let task = update_task_status(session, &stored, status)?;

        let saved = self.commit(Change::Save(task)).await?;
        info!(
            task_id = id,
            from = %stored.status,
            to = %saved.status,
            user_id = session.user_id,
            "task status changed"
        );
        Ok(saved)
    }

    pub async fn delete(&self, session: &Session, id: Id) -> PdResult<()> {
        let task = self.store.get_task(id).await?;
        authorize(
            session,
            can_delete_task(session, &task),
            Action::Delete,
            "Task",
            Some(id),
        )?;

        self.commit(Change::Remove(task)).await?;
        info!(task_id = id, user_id = session.user_id, "task deleted");
        Ok(())
    }

    /// Persist one task change, then reconcile its project.
    async fn commit(&self, change: Change) -> PdResult<Task> {
        let task = match change {
            Change::Save(task) => self.store.upsert_task(task).await?,
            Change::Remove(task) => {
                let id = task.id.ok_or_else(|| {
                    PdError::Internal("cannot delete an unsaved task".to_string())
                })?;
                self.store.delete_task(id).await?;
                task
            }
        };
        self.reconciler.reconcile(task.project_id).await?;
        Ok(task)
    }
}
