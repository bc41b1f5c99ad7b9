//! Task lifecycle
//!
//! Any status may be set from any other status; there is no forward-only
//! workflow and `Done` can be reopened. What is restricted is *who* may
//! change *which* fields:
//!
//! - managers replace every editable field present in the update
//! - the assigned member changes `status` only; every other field in
//!   their update is discarded and the stored value kept
//!
//! Both operations work on a copy. A refused update returns an
//! `Authorization` error and the caller's task is left as it was.

use pd_auth::permissions::{authorize, can_edit_task_full, can_edit_task_status};
use pd_auth::Session;
use pd_core::{Action, PdResult};
use pd_models::{Task, TaskStatus, TaskUpdate};
use tracing::debug;

pub fn update_task_status(session: &Session, task: &Task, status: TaskStatus) -> PdResult<Task> {
    authorize(
        session,
        can_edit_task_status(session, task),
        Action::EditStatus,
        "Task",
        task.id,
    )?;

    let mut updated = task.clone();
    updated.status = status;
    Ok(updated)
}

/// Apply an update on behalf of `session`, masking it to what the caller
/// is allowed to change.
pub fn apply_task_update(session: &Session, task: &Task, update: &TaskUpdate) -> PdResult<Task> {
    let mut updated = task.clone();

    if can_edit_task_full(session, task) {
        update.apply_all(&mut updated);
        return Ok(updated);
    }

    authorize(
        session,
        can_edit_task_status(session, task),
        Action::EditStatus,
        "Task",
        task.id,
    )?;

    if update.touches_non_status_fields() {
        debug!(
            task_id = ?task.id,
            user_id = session.user_id,
            "discarding non-status fields from member update"
        );
    }
    update.apply_status_only(&mut updated);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pd_models::Priority;

    fn task(assigned_to: i64) -> Task {
        let mut t = Task::new("Original", 1, assigned_to, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        t.id = Some(10);
        t.description = "Stored".into();
        t
    }

    fn hacked() -> TaskUpdate {
        TaskUpdate {
            title: Some("hacked".into()),
            status: Some(TaskStatus::Done),
            priority: Some(Priority::High),
            assigned_to: Some(99),
            ..Default::default()
        }
    }

    #[test]
    fn test_member_update_is_status_only() {
        let stored = task(5);
        let updated = apply_task_update(&Session::member(5), &stored, &hacked()).unwrap();

        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.title, "Original");
        assert_eq!(updated.priority, stored.priority);
        assert_eq!(updated.assigned_to, 5);
    }

    #[test]
    fn test_manager_update_is_full() {
        let updated = apply_task_update(&Session::manager(1), &task(5), &hacked()).unwrap();

        assert_eq!(updated.title, "hacked");
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.assigned_to, 99);
        assert_eq!(updated.description, "Stored");
    }

    #[test]
    fn test_member_cannot_touch_others_task() {
        let stored = task(6);
        let err = apply_task_update(&Session::member(5), &stored, &hacked()).unwrap_err();
        assert!(err.is_authorization());

        let err = update_task_status(&Session::member(5), &stored, TaskStatus::Done).unwrap_err();
        assert!(err.is_authorization());
        assert_eq!(stored.status, TaskStatus::Todo);
    }

    #[test]
    fn test_done_can_be_reopened() {
        let done = task(5).with_status(TaskStatus::Done);
        let reopened = update_task_status(&Session::member(5), &done, TaskStatus::Todo).unwrap();
        assert_eq!(reopened.status, TaskStatus::Todo);
    }

    #[test]
    fn test_every_transition_allowed() {
        let manager = Session::manager(1);
        for from in TaskStatus::ALL {
            for to in TaskStatus::ALL {
                let t = task(5).with_status(from);
                assert_eq!(update_task_status(&manager, &t, to).unwrap().status, to);
            }
        }
    }
}
