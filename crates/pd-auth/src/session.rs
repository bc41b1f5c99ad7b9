//! The authenticated caller

use pd_core::traits::Id;
use pd_models::{Role, User};
use serde::{Deserialize, Serialize};

/// Identity of the caller for one request.
///
/// Built at the edge (from a validated token) and handed to every policy,
/// lifecycle and service call. Nothing below the edge looks up a "current
/// user" on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: Id,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: Id, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn manager(user_id: Id) -> Self {
        Self::new(user_id, Role::Manager)
    }

    pub fn member(user_id: Id) -> Self {
        Self::new(user_id, Role::Member)
    }

    /// Session for a persisted user; `None` if the user has no id yet
    pub fn for_user(user: &User) -> Option<Self> {
        user.id.map(|id| Self::new(id, user.role))
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(Session::manager(1).is_manager());
        assert!(!Session::member(2).is_manager());
        assert_eq!(Session::member(2).user_id, 2);
    }

    #[test]
    fn test_for_user_requires_id() {
        let mut user = User::new("Ana", "ana@example.com", Role::Manager);
        assert!(Session::for_user(&user).is_none());

        user.id = Some(7);
        assert_eq!(Session::for_user(&user), Some(Session::manager(7)));
    }
}
