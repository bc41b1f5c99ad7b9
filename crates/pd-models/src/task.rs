//! Task model
//!
//! Table: tasks

use chrono::{DateTime, NaiveDate, Utc};
use pd_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::priority::Priority;
use crate::status::TaskStatus;

/// Task entity
///
/// `project_id` is fixed at creation. Members may only ever change `status`
/// on tasks assigned to them; managers may change every editable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Option<Id>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    pub project_id: Id,
    pub assigned_to: Id,
    pub due_date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}

impl Identifiable for Task {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Task {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl ProjectScoped for Task {
    fn project_id(&self) -> Id {
        self.project_id
    }
}

impl Entity for Task {
    const TABLE_NAME: &'static str = "tasks";
    const TYPE_NAME: &'static str = "Task";
}

impl Task {
    pub fn new(title: impl Into<String>, project_id: Id, assigned_to: Id, due_date: NaiveDate) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: Priority::default(),
            project_id,
            assigned_to,
            due_date,
            created_at: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    /// Past its due date and not done
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && !self.is_done()
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[validate(length(max = 255))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project_id: Option<Id>,
    pub assigned_to: Option<Id>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
}

/// A requested change to a task.
///
/// Which fields take effect depends on who submits it: see
/// `pd_services::lifecycle`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<Id>,
    pub due_date: Option<NaiveDate>,
}

impl TaskUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Apply every editable field present in the update
    pub fn apply_all(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assigned_to) = self.assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }

    /// Apply the status field only; everything else keeps its stored value
    pub fn apply_status_only(&self, task: &mut Task) {
        if let Some(status) = self.status {
            task.status = status;
        }
    }

    /// Whether the update touches anything besides `status`
    pub fn touches_non_status_fields(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.priority.is_some()
            || self.assigned_to.is_some()
            || self.due_date.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_task_defaults() {
        let task = Task::new("Write docs", 1, 2, due());
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.is_done());
    }

    #[test]
    fn test_apply_all() {
        let mut task = Task::new("Old", 1, 2, due());
        let update = TaskUpdate {
            title: Some("New".into()),
            status: Some(TaskStatus::Review),
            assigned_to: Some(3),
            ..Default::default()
        };
        update.apply_all(&mut task);

        assert_eq!(task.title, "New");
        assert_eq!(task.status, TaskStatus::Review);
        assert_eq!(task.assigned_to, 3);
        assert_eq!(task.project_id, 1);
    }

    #[test]
    fn test_apply_status_only_ignores_other_fields() {
        let mut task = Task::new("Original", 1, 2, due());
        let update = TaskUpdate {
            title: Some("hacked".into()),
            status: Some(TaskStatus::Done),
            assigned_to: Some(99),
            ..Default::default()
        };
        assert!(update.touches_non_status_fields());
        update.apply_status_only(&mut task);

        assert_eq!(task.title, "Original");
        assert_eq!(task.assigned_to, 2);
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[test]
    fn test_overdue() {
        let task = Task::new("T", 1, 2, due());
        let after = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert!(task.is_overdue(after));
        assert!(!task.with_status(TaskStatus::Done).is_overdue(after));
    }

    #[test]
    fn test_update_ignores_project_id_in_json() {
        let update: TaskUpdate =
            serde_json::from_str(r#"{"status":"done","projectId":42}"#).unwrap();
        assert_eq!(update.status, Some(TaskStatus::Done));
        assert!(!update.touches_non_status_fields());
    }
}
