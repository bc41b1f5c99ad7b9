//! Task contract
//!
//! Whether the referenced project exists is a store lookup and is checked
//! by the task service, not here.

use pd_core::error::ValidationErrors;
use pd_models::{CreateTask, Task};

use crate::base::{merge_field_rules, validate_present, validate_required, Contract, ValidationResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct TaskContract;

impl Contract<CreateTask> for TaskContract {
    fn validate(&self, input: &CreateTask) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        merge_field_rules(input, &mut errors);

        validate_present("title", &input.title, &mut errors);
        validate_present("description", &input.description, &mut errors);
        validate_required("projectId", &input.project_id, &mut errors);
        validate_required("assignedTo", &input.assigned_to, &mut errors);
        validate_required("dueDate", &input.due_date, &mut errors);

        errors.into_result()
    }
}

impl Contract<Task> for TaskContract {
    fn validate(&self, task: &Task) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_present("title", &task.title, &mut errors);
        validate_present("description", &task.description, &mut errors);
        if task.title.chars().count() > 255 {
            errors.add("title", "is too long (maximum is 255 characters)");
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_create_requires_references() {
        let input = CreateTask {
            title: "Design".into(),
            description: "Mockups".into(),
            ..Default::default()
        };
        let errors = TaskContract.validate(&input).unwrap_err();
        assert!(errors.has_error("projectId"));
        assert!(errors.has_error("assignedTo"));
        assert!(errors.has_error("dueDate"));
        assert!(!errors.has_error("title"));
    }

    #[test]
    fn test_valid_create() {
        let input = CreateTask {
            title: "Design".into(),
            description: "Mockups".into(),
            project_id: Some(1),
            assigned_to: Some(2),
            due_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            ..Default::default()
        };
        assert!(TaskContract.validate(&input).is_ok());
    }

    #[test]
    fn test_blank_title_after_edit() {
        let due = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let mut task = Task::new("  ", 1, 2, due);
        task.description = "d".into();
        let errors = TaskContract.validate(&task).unwrap_err();
        assert_eq!(errors.full_messages(), vec!["title can't be blank".to_string()]);
    }

    #[test]
    fn test_title_limit_counts_characters() {
        let due = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let mut task = Task::new("é".repeat(255), 1, 2, due);
        task.description = "d".into();
        assert!(TaskContract.validate(&task).is_ok());

        task.title.push('é');
        let errors = TaskContract.validate(&task).unwrap_err();
        assert!(errors.has_error("title"));
    }
}
