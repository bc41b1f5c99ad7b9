//! Core error types for ProjectDesk
//!
//! Every layer reports one of the kinds below. Authorization failures are kept
//! apart from validation failures all the way up to the HTTP edge.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::traits::Id;

/// Result type used across all ProjectDesk crates
pub type PdResult<T> = Result<T, PdError>;

/// Core error type for all ProjectDesk operations
#[derive(Error, Debug)]
pub enum PdError {
    #[error("Not authorized to {action} {entity}{}", fmt_id(.id))]
    Authorization {
        action: Action,
        entity: &'static str,
        id: Option<Id>,
    },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: Id },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn fmt_id(id: &Option<Id>) -> String {
    match id {
        Some(id) => format!(" {}", id),
        None => String::new(),
    }
}

/// The permission a caller was missing when an `Authorization` error is raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Edit,
    EditStatus,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::EditStatus => "change the status of",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PdError {
    pub fn authorization(action: Action, entity: &'static str, id: Option<Id>) -> Self {
        PdError::Authorization { action, entity, id }
    }

    pub fn not_found(entity: &'static str, id: Id) -> Self {
        PdError::NotFound { entity, id }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        PdError::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PdError::Conflict {
            message: message.into(),
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, PdError::Authorization { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PdError::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PdError::Validation(_))
    }

    /// HTTP status code mapping
    pub fn status_code(&self) -> u16 {
        match self {
            PdError::Authorization { .. } => 403,
            PdError::Validation(_) => 422,
            PdError::NotFound { .. } => 404,
            PdError::Unauthenticated { .. } => 401,
            PdError::Conflict { .. } => 409,
            PdError::Database(_) | PdError::Internal(_) | PdError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PdError::Authorization { .. } => "forbidden",
            PdError::Validation(_) => "validation_failed",
            PdError::NotFound { .. } => "not_found",
            PdError::Unauthenticated { .. } => "unauthenticated",
            PdError::Conflict { .. } => "conflict",
            PdError::Database(_) => "database_error",
            PdError::Internal(_) => "internal_error",
            PdError::Config(_) => "configuration_error",
        }
    }
}

/// Validation errors collection
#[derive(Error, Debug, Default, Clone, PartialEq)]
#[error("{}", self.full_messages().join(", "))]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: BTreeMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "can't be blank");
        errors.add_base("something is off");

        assert!(errors.has_error("title"));
        assert!(!errors.has_error("description"));
        assert_eq!(
            errors.full_messages(),
            vec!["something is off".to_string(), "title can't be blank".to_string()]
        );
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationErrors::new();
        a.add("title", "can't be blank");
        let mut b = ValidationErrors::new();
        b.add("title", "is too long");
        b.add("members", "must not be empty");

        a.merge(b);
        assert_eq!(a.get("title").map(Vec::len), Some(2));
        assert!(a.has_error("members"));
    }

    #[test]
    fn test_authorization_message_and_status() {
        let err = PdError::authorization(Action::EditStatus, "Task", Some(7));
        assert_eq!(err.to_string(), "Not authorized to change the status of Task 7");
        assert_eq!(err.status_code(), 403);
        assert!(err.is_authorization());

        let err = PdError::authorization(Action::Create, "Project", None);
        assert_eq!(err.to_string(), "Not authorized to create Project");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PdError::not_found("Project", 1).status_code(), 404);
        assert_eq!(PdError::Validation(ValidationErrors::new()).status_code(), 422);
        assert_eq!(PdError::unauthenticated("no token").status_code(), 401);
        assert_eq!(PdError::conflict("taken").error_code(), "conflict");
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());
        let mut errors = ValidationErrors::new();
        errors.add_base("nope");
        assert!(errors.into_result().is_err());
    }
}
