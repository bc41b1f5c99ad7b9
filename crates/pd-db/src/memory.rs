//! In-memory entity store
//!
//! Everything lives behind one `RwLock`, so a cascading project delete is
//! a single write section. Contents are lost when the process exits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use pd_core::traits::{Entity, Id, Identifiable, Timestamped};
use pd_models::{Project, Task, User};
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::{EntityStore, ProjectFilter, StoreError, StoreResult, TaskFilter};

#[derive(Default)]
struct Tables {
    last_id: Id,
    projects: HashMap<Id, Project>,
    tasks: HashMap<Id, Task>,
    users: HashMap<Id, User>,
}

impl Tables {
    fn next_id(&mut self) -> Id {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; ids break ties between records created in the same instant
fn newest_first<T: Identifiable + Timestamped>(mut records: Vec<T>) -> Vec<T> {
    records.sort_by(|a, b| {
        (b.created_at(), b.id()).cmp(&(a.created_at(), a.id()))
    });
    records
}

fn missing<T: Entity>(id: Id) -> StoreError {
    StoreError::NotFound {
        entity: T::TYPE_NAME,
        id,
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_project(&self, id: Id) -> StoreResult<Project> {
        let tables = self.tables.read().await;
        tables
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| missing::<Project>(id))
    }

    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        let projects = tables
            .projects
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(newest_first(projects))
    }

    async fn upsert_project(&self, mut project: Project) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        let id = match project.id {
            Some(id) => {
                let stored = tables
                    .projects
                    .get(&id)
                    .ok_or_else(|| missing::<Project>(id))?;
                project.created_at = stored.created_at;
                id
            }
            None => {
                let id = tables.next_id();
                project.id = Some(id);
                project.created_at = Some(Utc::now());
                id
            }
        };
        tables.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn delete_project(&self, id: Id) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.projects.remove(&id).is_none() {
            return Err(missing::<Project>(id));
        }
        let before = tables.tasks.len();
        tables.tasks.retain(|_, task| task.project_id != id);
        debug!(
            project_id = id,
            tasks_removed = before - tables.tasks.len(),
            "project removed from memory store"
        );
        Ok(())
    }

    async fn get_task(&self, id: Id) -> StoreResult<Task> {
        let tables = self.tables.read().await;
        tables
            .tasks
            .get(&id)
            .cloned()
            .ok_or_else(|| missing::<Task>(id))
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let tasks = tables
            .tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        Ok(newest_first(tasks))
    }

    async fn upsert_task(&self, mut task: Task) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        let id = match task.id {
            Some(id) => {
                let stored = tables.tasks.get(&id).ok_or_else(|| missing::<Task>(id))?;
                task.created_at = stored.created_at;
                id
            }
            None => {
                let id = tables.next_id();
                task.id = Some(id);
                task.created_at = Some(Utc::now());
                id
            }
        };
        tables.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn delete_task(&self, id: Id) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing::<Task>(id))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.users.values().cloned().collect()))
    }

    async fn get_user(&self, id: Id) -> StoreResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| missing::<User>(id))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn insert_user(&self, mut user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        let id = tables.next_id();
        user.id = Some(id);
        user.created_at = Some(Utc::now());
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, mut user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let id = user.id.ok_or_else(|| {
            StoreError::Conflict("cannot update a user that was never stored".to_string())
        })?;
        let stored = tables.users.get(&id).ok_or_else(|| missing::<User>(id))?;
        user.created_at = stored.created_at;
        if tables
            .users
            .values()
            .any(|u| u.id != Some(id) && u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: Id) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing::<User>(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pd_models::{Role, TaskStatus};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    async fn seeded_project(store: &MemoryStore) -> Project {
        store
            .upsert_project(Project::new("P", date(1), date(20), 1).with_members([2]))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_assigns_id_and_keeps_created_at() {
        let store = MemoryStore::new();
        let project = seeded_project(&store).await;
        let id = project.id.unwrap();
        let created_at = project.created_at;
        assert!(created_at.is_some());

        let mut edited = project.clone();
        edited.title = "Renamed".into();
        edited.created_at = None;
        let saved = store.upsert_project(edited).await.unwrap();

        assert_eq!(saved.id, Some(id));
        assert_eq!(saved.created_at, created_at);
        assert_eq!(store.get_project(id).await.unwrap().title, "Renamed");
    }

    #[tokio::test]
    async fn test_delete_project_cascades() {
        let store = MemoryStore::new();
        let project = seeded_project(&store).await;
        let other = seeded_project(&store).await;
        let pid = project.id.unwrap();

        for _ in 0..3 {
            store.upsert_task(Task::new("T", pid, 2, date(10))).await.unwrap();
        }
        store
            .upsert_task(Task::new("Keep", other.id.unwrap(), 2, date(10)))
            .await
            .unwrap();

        store.delete_project(pid).await.unwrap();

        assert!(store.list_tasks(TaskFilter::for_project(pid)).await.unwrap().is_empty());
        assert_eq!(store.list_tasks(TaskFilter::default()).await.unwrap().len(), 1);
        assert!(matches!(
            store.get_project(pid).await,
            Err(StoreError::NotFound { entity: "Project", .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_project() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.delete_project(42).await,
            Err(StoreError::NotFound { id: 42, .. })
        ));
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let store = MemoryStore::new();
        let pid = seeded_project(&store).await.id.unwrap();
        let first = store.upsert_task(Task::new("first", pid, 2, date(5))).await.unwrap();
        let second = store
            .upsert_task(Task::new("second", pid, 2, date(5)).with_status(TaskStatus::Done))
            .await
            .unwrap();

        let listed = store.list_tasks(TaskFilter::for_project(pid)).await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store
            .insert_user(User::new("Ana", "ana@example.com", Role::Manager))
            .await
            .unwrap();

        let err = store
            .insert_user(User::new("Other", "ANA@example.com", Role::Member))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let found = store.find_user_by_email("ana@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.name), Some("Ana".to_string()));
    }

    #[tokio::test]
    async fn test_update_and_delete_user() {
        let store = MemoryStore::new();
        let ana = store
            .insert_user(User::new("Ana", "ana@example.com", Role::Member))
            .await
            .unwrap();
        store
            .insert_user(User::new("Bea", "bea@example.com", Role::Member))
            .await
            .unwrap();

        let mut taken = ana.clone();
        taken.email = "BEA@example.com".into();
        assert!(matches!(
            store.update_user(taken).await,
            Err(StoreError::Conflict(_))
        ));

        let mut promoted = ana.clone();
        promoted.role = Role::Manager;
        let saved = store.update_user(promoted).await.unwrap();
        assert_eq!(saved.role, Role::Manager);
        assert_eq!(saved.created_at, ana.created_at);

        let id = ana.id.unwrap();
        store.delete_user(id).await.unwrap();
        assert!(matches!(
            store.get_user(id).await,
            Err(StoreError::NotFound { entity: "User", .. })
        ));
        assert!(matches!(
            store.delete_user(id).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
