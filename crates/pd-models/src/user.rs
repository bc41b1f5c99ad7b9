//! User model
//!
//! Table: users

use chrono::{DateTime, Utc};
use pd_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::role::Role;

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<Id>,

    /// Display name
    pub name: String,

    pub email: String,

    #[serde(default)]
    pub role: Role,

    /// Initials shown in place of a picture
    pub avatar: String,

    /// Argon2 password hash
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

impl Identifiable for User {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for User {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Entity for User {
    const TABLE_NAME: &'static str = "users";
    const TYPE_NAME: &'static str = "User";
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        let name = name.into();
        Self {
            id: None,
            avatar: Self::initials(&name),
            name,
            email: email.into(),
            role,
            password_hash: None,
            created_at: None,
        }
    }

    /// Upper-cased first letter of every word, or `"U"` for an empty name
    pub fn initials(name: &str) -> String {
        let initials: String = name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}

/// Self-registration input
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[validate(length(max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

/// Manager edit of an account; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub email: Option<String>,
    pub role: Option<Role>,
    /// Hashed by the user service, never applied as is
    pub password: Option<String>,
}

impl UpdateUser {
    /// A new name also refreshes the avatar initials
    pub fn apply_to(&self, user: &mut User) {
        if let Some(ref name) = self.name {
            user.name = name.trim().to_string();
            user.avatar = User::initials(&user.name);
        }
        if let Some(ref email) = self.email {
            user.email = email.trim().to_lowercase();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}
