//! Access policy
//!
//! Pure predicates and filters over a [`Session`] and already-fetched
//! entities. The flat model has two roles: managers may read and write
//! everything, members see the projects they belong to and the tasks
//! assigned to them, and may only change the status of those tasks.
//!
//! Nothing in here touches the store. Callers check before returning data;
//! a denied view is an error, not an empty result.

use pd_core::{Action, Id, PdError, PdResult};
use pd_models::{Project, Task};
use tracing::warn;

use crate::session::Session;

// ============================================================================
// Projects
// ============================================================================

pub fn can_view_project(session: &Session, project: &Project) -> bool {
    session.is_manager() || project.has_member(session.user_id)
}

pub fn can_create_project(session: &Session) -> bool {
    session.is_manager()
}

/// Any manager may edit any project; `manager_id` is not consulted.
pub fn can_edit_project(session: &Session, _project: &Project) -> bool {
    session.is_manager()
}

pub fn can_delete_project(session: &Session, _project: &Project) -> bool {
    session.is_manager()
}

/// Managers get the input back unfiltered; members get the projects
/// listing them as a member.
pub fn visible_projects(session: &Session, projects: Vec<Project>) -> Vec<Project> {
    if session.is_manager() {
        return projects;
    }
    projects
        .into_iter()
        .filter(|p| can_view_project(session, p))
        .collect()
}

// ============================================================================
// Tasks
// ============================================================================

pub fn can_view_task(session: &Session, task: &Task) -> bool {
    session.is_manager() || task.assigned_to == session.user_id
}

pub fn can_create_task(session: &Session) -> bool {
    session.is_manager()
}

/// Title, description, priority, assignee and due date
pub fn can_edit_task_full(session: &Session, _task: &Task) -> bool {
    session.is_manager()
}

pub fn can_edit_task_status(session: &Session, task: &Task) -> bool {
    session.is_manager() || task.assigned_to == session.user_id
}

pub fn can_delete_task(session: &Session, _task: &Task) -> bool {
    session.is_manager()
}

pub fn visible_tasks(session: &Session, tasks: Vec<Task>) -> Vec<Task> {
    if session.is_manager() {
        return tasks;
    }
    tasks
        .into_iter()
        .filter(|t| t.assigned_to == session.user_id)
        .collect()
}

// ============================================================================
// Users
// ============================================================================

/// Creating, editing and removing accounts
pub fn can_manage_users(session: &Session) -> bool {
    session.is_manager()
}

// ============================================================================
// Enforcement
// ============================================================================

/// Turn a predicate result into an `Authorization` error naming what was
/// refused.
pub fn authorize(
    session: &Session,
    allowed: bool,
    action: Action,
    entity: &'static str,
    id: Option<Id>,
) -> PdResult<()> {
    if allowed {
        return Ok(());
    }
    warn!(
        user_id = session.user_id,
        role = %session.role,
        action = action.as_str(),
        entity,
        ?id,
        "access denied"
    );
    Err(PdError::authorization(action, entity, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pd_models::TaskStatus;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn project(id: Id, members: &[Id]) -> Project {
        let mut p = Project::new(format!("P{id}"), date(1), date(20), 1)
            .with_members(members.iter().copied());
        p.id = Some(id);
        p
    }

    fn task(id: Id, assigned_to: Id) -> Task {
        let mut t = Task::new(format!("T{id}"), 1, assigned_to, date(10));
        t.id = Some(id);
        t
    }

    #[test]
    fn test_member_views_project_iff_member() {
        let member = Session::member(5);
        for members in [vec![], vec![4], vec![5], vec![4, 5, 6]] {
            let p = project(1, &members);
            assert_eq!(can_view_project(&member, &p), members.contains(&5));
        }
    }

    #[test]
    fn test_manager_views_every_project() {
        let manager = Session::manager(99);
        assert!(can_view_project(&manager, &project(1, &[])));
        assert!(can_view_project(&manager, &project(2, &[3])));
    }

    #[test]
    fn test_project_writes_are_manager_only() {
        let p = project(1, &[5]);
        let member = Session::member(5);
        let other_manager = Session::manager(42);

        assert!(!can_create_project(&member));
        assert!(!can_edit_project(&member, &p));
        assert!(!can_delete_project(&member, &p));

        // not the project's manager_id, still allowed
        assert!(can_edit_project(&other_manager, &p));
        assert!(can_delete_project(&other_manager, &p));
    }

    #[test]
    fn test_visible_projects() {
        let projects = vec![project(1, &[5]), project(2, &[6]), project(3, &[5, 6])];

        let seen: Vec<_> = visible_projects(&Session::member(5), projects.clone())
            .into_iter()
            .filter_map(|p| p.id)
            .collect();
        assert_eq!(seen, vec![1, 3]);

        assert_eq!(visible_projects(&Session::manager(1), projects.clone()), projects);
    }

    #[test]
    fn test_task_status_edit_requires_assignment() {
        let member = Session::member(5);
        let mine = task(1, 5);
        let theirs = task(2, 6).with_status(TaskStatus::Review);

        assert!(can_edit_task_status(&member, &mine));
        assert!(!can_edit_task_status(&member, &theirs));
        assert!(!can_edit_task_full(&member, &mine));
        assert!(!can_delete_task(&member, &mine));
        assert!(!can_create_task(&member));
    }

    #[test]
    fn test_manager_task_rights() {
        let manager = Session::manager(1);
        let t = task(1, 5);
        assert!(can_view_task(&manager, &t));
        assert!(can_edit_task_full(&manager, &t));
        assert!(can_edit_task_status(&manager, &t));
        assert!(can_delete_task(&manager, &t));
    }

    #[test]
    fn test_visible_tasks() {
        let tasks = vec![task(1, 5), task(2, 6), task(3, 5)];

        assert_eq!(visible_tasks(&Session::manager(1), tasks.clone()), tasks);

        let mine = visible_tasks(&Session::member(5), tasks);
        assert!(mine.iter().all(|t| t.assigned_to == 5));
        assert_eq!(mine.len(), 2);
    }

    #[test]
    fn test_user_management_is_manager_only() {
        assert!(can_manage_users(&Session::manager(1)));
        assert!(!can_manage_users(&Session::member(5)));
    }

    #[test]
    fn test_authorize() {
        let member = Session::member(5);
        assert!(authorize(&member, true, Action::View, "Project", Some(1)).is_ok());

        let err = authorize(&member, false, Action::Delete, "Task", Some(3)).unwrap_err();
        assert!(err.is_authorization());
        assert_eq!(err.to_string(), "Not authorized to delete Task 3");
    }
}
