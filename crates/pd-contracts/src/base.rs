//! Base contract system

use pd_core::error::ValidationErrors;
use validator::Validate;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Trait for contracts
pub trait Contract<T>: Send + Sync {
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Run the field rules declared with `#[derive(Validate)]` on an input
/// type and report them as [`ValidationErrors`].
pub fn check_input<T: Validate>(input: &T) -> ValidationResult {
    let mut errors = ValidationErrors::new();
    merge_field_rules(input, &mut errors);
    errors.into_result()
}

pub(crate) fn merge_field_rules<T: Validate>(input: &T, errors: &mut ValidationErrors) {
    let Err(failures) = input.validate() else {
        return;
    };
    for (field, field_errors) in failures.field_errors() {
        for error in field_errors {
            let message = match error.message {
                Some(ref message) => message.to_string(),
                None => describe(&error.code, error.params.get("max")),
            };
            errors.add(field, message);
        }
    }
}

fn describe(code: &str, max: Option<&impl std::fmt::Display>) -> String {
    match (code, max) {
        ("length", Some(max)) => format!("is too long (maximum is {} characters)", max),
        ("range", Some(max)) => format!("must be less than or equal to {}", max),
        ("email", _) => "is not a valid email address".to_string(),
        _ => "is invalid".to_string(),
    }
}

/// Blank check shared by every contract
pub(crate) fn validate_present(field: &str, value: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(field, "can't be blank");
    }
}

pub(crate) fn validate_required<T>(field: &str, value: &Option<T>, errors: &mut ValidationErrors) {
    if value.is_none() {
        errors.add(field, "can't be blank");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_models::UpdateProject;

    #[test]
    fn test_check_input_reports_field_rules() {
        let update = UpdateProject {
            title: Some("x".repeat(300)),
            progress: Some(150),
            ..Default::default()
        };
        let errors = check_input(&update).unwrap_err();
        assert_eq!(
            errors.get("title").unwrap(),
            &vec!["is too long (maximum is 255 characters)".to_string()]
        );
        assert!(errors.has_error("progress"));
    }

    #[test]
    fn test_check_input_passes_valid_input() {
        assert!(check_input(&UpdateProject::default()).is_ok());
    }

    #[test]
    fn test_validate_present() {
        let mut errors = ValidationErrors::new();
        validate_present("title", "   ", &mut errors);
        validate_present("description", "ok", &mut errors);
        assert!(errors.has_error("title"));
        assert!(!errors.has_error("description"));
    }
}
