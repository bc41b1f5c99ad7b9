//! Project contract

use chrono::NaiveDate;
use pd_core::error::ValidationErrors;
use pd_models::{CreateProject, Project};

use crate::base::{merge_field_rules, validate_present, validate_required, Contract, ValidationResult};

/// Checks new project input and edited projects.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectContract;

impl ProjectContract {
    /// The end date must fall strictly after the start date
    pub fn validate_dates(&self, start: NaiveDate, end: NaiveDate, errors: &mut ValidationErrors) {
        if end <= start {
            errors.add("endDate", "must be after the start date");
        }
    }

    pub fn validate_members(&self, member_count: usize, errors: &mut ValidationErrors) {
        if member_count == 0 {
            errors.add("members", "must include at least one user");
        }
    }

    pub fn validate_progress(&self, progress: u8, errors: &mut ValidationErrors) {
        if progress > 100 {
            errors.add("progress", "must be less than or equal to 100");
        }
    }
}

impl Contract<CreateProject> for ProjectContract {
    fn validate(&self, input: &CreateProject) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        merge_field_rules(input, &mut errors);

        validate_present("title", &input.title, &mut errors);
        validate_present("description", &input.description, &mut errors);
        validate_required("startDate", &input.start_date, &mut errors);
        validate_required("endDate", &input.end_date, &mut errors);
        if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
            self.validate_dates(start, end, &mut errors);
        }
        self.validate_members(input.members.len(), &mut errors);

        errors.into_result()
    }
}

/// Re-check of a stored project after edits were applied
impl Contract<Project> for ProjectContract {
    fn validate(&self, project: &Project) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_present("title", &project.title, &mut errors);
        validate_present("description", &project.description, &mut errors);
        self.validate_dates(project.start_date, project.end_date, &mut errors);
        self.validate_members(project.members.len(), &mut errors);
        self.validate_progress(project.progress, &mut errors);

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn valid_input() -> CreateProject {
        CreateProject {
            title: "Website relaunch".into(),
            description: "New marketing site".into(),
            status: None,
            start_date: Some(date(1, 1)),
            end_date: Some(date(3, 1)),
            members: vec![2, 3],
        }
    }

    #[test]
    fn test_valid_create() {
        assert!(ProjectContract.validate(&valid_input()).is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let input = CreateProject::default();
        let errors = ProjectContract.validate(&input).unwrap_err();
        for field in ["title", "description", "startDate", "endDate", "members"] {
            assert!(errors.has_error(field), "expected error on {field}");
        }
    }

    #[test]
    fn test_end_must_follow_start() {
        let mut input = valid_input();
        input.end_date = input.start_date;
        let errors = ProjectContract.validate(&input).unwrap_err();
        assert_eq!(
            errors.get("endDate").unwrap(),
            &vec!["must be after the start date".to_string()]
        );
    }

    #[test]
    fn test_edited_project_rechecked() {
        let mut project = Project::new("P", date(1, 1), date(2, 1), 1).with_members([2]);
        project.description = "d".into();
        assert!(ProjectContract.validate(&project).is_ok());

        project.members.clear();
        project.end_date = date(1, 1);
        let errors = ProjectContract.validate(&project).unwrap_err();
        assert!(errors.has_error("members"));
        assert!(errors.has_error("endDate"));
    }
}
