//! Registration contract

use std::sync::LazyLock;

use pd_core::error::ValidationErrors;
use pd_models::{RegisterUser, UpdateUser};
use regex::Regex;

use crate::base::{merge_field_rules, validate_present, Contract, ValidationResult};

/// Valid email pattern
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

pub struct RegistrationContract {
    password_min_length: usize,
}

impl RegistrationContract {
    pub fn new(password_min_length: usize) -> Self {
        Self { password_min_length }
    }

    pub fn validate_email(&self, email: &str, errors: &mut ValidationErrors) {
        if email.trim().is_empty() {
            errors.add("email", "can't be blank");
        } else if !EMAIL_PATTERN.is_match(email.trim()) {
            errors.add("email", "is not a valid email address");
        }
    }

    pub fn validate_password(&self, password: &str, errors: &mut ValidationErrors) {
        if password.chars().count() < self.password_min_length {
            errors.add(
                "password",
                format!(
                    "is too short (minimum is {} characters)",
                    self.password_min_length
                ),
            );
        }
    }
}

impl Contract<RegisterUser> for RegistrationContract {
    fn validate(&self, input: &RegisterUser) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        merge_field_rules(input, &mut errors);

        validate_present("name", &input.name, &mut errors);
        self.validate_email(&input.email, &mut errors);
        self.validate_password(&input.password, &mut errors);

        errors.into_result()
    }
}

/// Only the fields present in the edit are checked
impl Contract<UpdateUser> for RegistrationContract {
    fn validate(&self, input: &UpdateUser) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        merge_field_rules(input, &mut errors);

        if let Some(ref name) = input.name {
            validate_present("name", name, &mut errors);
        }
        if let Some(ref email) = input.email {
            self.validate_email(email, &mut errors);
        }
        if let Some(ref password) = input.password {
            self.validate_password(password, &mut errors);
        }

        errors.into_result()
    }
}
