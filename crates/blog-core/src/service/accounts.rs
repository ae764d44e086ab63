//! Sign-up and credential checks.

use super::profiles::username_taken;
use super::{BlogService, Requester};
use crate::domain::User;
use crate::error::{DomainError, RepoError};
use crate::forms::RegistrationForm;
use crate::ports::PasswordService;

impl BlogService {
    /// Create an account with a hashed password.
    pub async fn register(
        &self,
        form: &RegistrationForm,
        passwords: &dyn PasswordService,
    ) -> Result<User, DomainError> {
        let data = form.clean().map_err(DomainError::Validation)?;

        if self.users.find_by_username(&data.username).await?.is_some() {
            return Err(username_taken());
        }

        let password_hash = passwords
            .hash(&data.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let user = self
            .users
            .insert(User::new(data.username, data.email, password_hash))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => username_taken(),
                other => other.into(),
            })?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Make sure a staff account exists under `form.username`. A missing
    /// account is created with the given password; an existing one is only
    /// promoted and keeps its password.
    pub async fn ensure_staff(
        &self,
        form: &RegistrationForm,
        passwords: &dyn PasswordService,
    ) -> Result<User, DomainError> {
        let data = form.clean().map_err(DomainError::Validation)?;

        if let Some(mut user) = self.users.find_by_username(&data.username).await? {
            if user.is_staff {
                return Ok(user);
            }
            user.is_staff = true;
            let user = self.users.update(user).await?;
            tracing::info!(user_id = user.id, "User promoted to staff");
            return Ok(user);
        }

        let password_hash = passwords
            .hash(&data.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let mut user = User::new(data.username, data.email, password_hash);
        user.is_staff = true;
        let user = self.users.insert(user).await?;

        tracing::info!(user_id = user.id, "Staff account created");
        Ok(user)
    }

    /// The user behind a username/password pair. Unknown users and wrong
    /// passwords fail the same way.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        passwords: &dyn PasswordService,
    ) -> Result<User, DomainError> {
        let Some(user) = self.users.find_by_username(username.trim()).await? else {
            return Err(DomainError::Unauthorized);
        };

        let valid = passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !valid {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(DomainError::Unauthorized);
        }
        Ok(user)
    }

    pub async fn current_user(&self, requester: &Requester) -> Result<User, DomainError> {
        self.requesting_user(requester).await
    }
}
