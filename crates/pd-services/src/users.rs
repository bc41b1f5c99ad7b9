//! User accounts: registration, login and manager administration

use std::sync::Arc;

use pd_auth::password::{hash_password, verify_password};
use pd_auth::permissions::{authorize, can_manage_users};
use pd_auth::Session;
use pd_contracts::{Contract, RegistrationContract};
use pd_core::{Action, Id, PdError, PdResult};
use pd_db::{EntityStore, ProjectFilter, TaskFilter};
use pd_models::{RegisterUser, UpdateUser, User};
use tracing::{debug, info, warn};

const INVALID_CREDENTIALS: &str = "invalid email or password";

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn EntityStore>,
    password_min_length: usize,
}

impl UserService {
    pub fn new(store: Arc<dyn EntityStore>, password_min_length: usize) -> Self {
        Self {
            store,
            password_min_length,
        }
    }

    pub async fn register(&self, input: RegisterUser) -> PdResult<User> {
        let saved = self.insert(input).await?;
        info!(user_id = ?saved.id, role = %saved.role, "user registered");
        Ok(saved)
    }

    async fn insert(&self, input: RegisterUser) -> PdResult<User> {
        RegistrationContract::new(self.password_min_length).validate(&input)?;

        let email = input.email.trim().to_lowercase();
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(PdError::conflict(format!("email {email} is already registered")));
        }

        let mut user = User::new(input.name.trim(), email, input.role.unwrap_or_default());
        user.password_hash = Some(hash(&input.password)?);

        Ok(self.store.insert_user(user).await?)
    }

    /// Unknown e-mail and wrong password fail the same way
    pub async fn login(&self, email: &str, password: &str) -> PdResult<User> {
        let user = self.store.find_user_by_email(email.trim()).await?;

        match user {
            Some(user)
                if user
                    .password_hash
                    .as_deref()
                    .is_some_and(|hash| verify_password(password, hash)) =>
            {
                debug!(user_id = ?user.id, "login succeeded");
                Ok(user)
            }
            _ => {
                warn!("login failed");
                Err(PdError::unauthenticated(INVALID_CREDENTIALS))
            }
        }
    }

    /// Every registered user; callers only need to be signed in
    pub async fn list(&self, session: &Session) -> PdResult<Vec<User>> {
        let users = self.store.list_users().await?;
        debug!(user_id = session.user_id, count = users.len(), "users listed");
        Ok(users)
    }

    pub async fn get(&self, session: &Session, id: Id) -> PdResult<User> {
        let user = self.store.get_user(id).await?;
        debug!(user_id = session.user_id, target_id = id, "user fetched");
        Ok(user)
    }

    /// Account created by a manager on someone else's behalf
    pub async fn create(&self, session: &Session, input: RegisterUser) -> PdResult<User> {
        authorize(session, can_manage_users(session), Action::Create, "User", None)?;

        let saved = self.insert(input).await?;
        info!(
            user_id = session.user_id,
            created_id = ?saved.id,
            role = %saved.role,
            "user created"
        );
        Ok(saved)
    }

    pub async fn update(&self, session: &Session, id: Id, input: UpdateUser) -> PdResult<User> {
        authorize(session, can_manage_users(session), Action::Edit, "User", Some(id))?;
        RegistrationContract::new(self.password_min_length).validate(&input)?;

        let mut user = self.store.get_user(id).await?;
        input.apply_to(&mut user);

        if let Some(other) = self.store.find_user_by_email(&user.email).await? {
            if other.id != Some(id) {
                return Err(PdError::conflict(format!(
                    "email {} is already registered",
                    user.email
                )));
            }
        }
        if let Some(ref password) = input.password {
            user.password_hash = Some(hash(password)?);
        }

        let saved = self.store.update_user(user).await?;
        info!(user_id = session.user_id, target_id = id, role = %saved.role, "user updated");
        Ok(saved)
    }

    /// Refused while the user still manages, belongs to or is assigned work
    pub async fn delete(&self, session: &Session, id: Id) -> PdResult<()> {
        authorize(session, can_manage_users(session), Action::Delete, "User", Some(id))?;

        if id == session.user_id {
            return Err(PdError::conflict("you cannot delete your own account"));
        }
        self.store.get_user(id).await?;

        let projects = self.store.list_projects(ProjectFilter::default()).await?;
        if projects
            .iter()
            .any(|p| p.manager_id == id || p.has_member(id))
        {
            return Err(PdError::conflict(format!(
                "user {id} still manages or belongs to a project"
            )));
        }

        let assigned = self
            .store
            .list_tasks(TaskFilter {
                assigned_to: Some(id),
                ..Default::default()
            })
            .await?;
        if !assigned.is_empty() {
            return Err(PdError::conflict(format!(
                "user {id} still has {} assigned task(s)",
                assigned.len()
            )));
        }

        self.store.delete_user(id).await?;
        info!(user_id = session.user_id, target_id = id, "user deleted");
        Ok(())
    }
}

fn hash(password: &str) -> PdResult<String> {
    hash_password(password).map_err(|e| PdError::Internal(e.to_string()))
}
