//! Public profiles and editing one's own account.

use super::{BlogService, PageMode, ProfileContext, ProfileFormContext, Redirect, Requester};
use crate::domain::User;
use crate::error::{DomainError, RepoError};
use crate::forms::{FormErrors, ProfileForm};
use crate::ports::PostQuery;
use crate::urls;

const USERNAME_TAKEN: &str = "A user with that username already exists.";

impl BlogService {
    /// A user's profile with all of their posts, including drafts and
    /// scheduled ones.
    pub async fn profile(
        &self,
        username: &str,
        page: Option<&str>,
    ) -> Result<ProfileContext, DomainError> {
        let profile = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))?;

        let query = PostQuery::ByAuthor {
            author_id: profile.id,
        };
        let page_obj = self.paginate(query, page, PageMode::Lenient).await?;
        Ok(ProfileContext { profile, page_obj })
    }

    pub async fn edit_profile_form(
        &self,
        requester: &Requester,
    ) -> Result<ProfileFormContext, DomainError> {
        let user = self.requesting_user(requester).await?;
        Ok(ProfileFormContext {
            form: ProfileForm::from_user(&user),
        })
    }

    /// Update the requester's own account.
    pub async fn update_profile(
        &self,
        requester: &Requester,
        form: &ProfileForm,
    ) -> Result<Redirect, DomainError> {
        let mut user = self.requesting_user(requester).await?;
        let data = form.clean().map_err(DomainError::Validation)?;

        if let Some(existing) = self.users.find_by_username(&data.username).await? {
            if existing.id != user.id {
                return Err(username_taken());
            }
        }

        data.apply_to(&mut user);
        let user = self.users.update(user).await.map_err(|e| match e {
            RepoError::Constraint(_) => username_taken(),
            other => other.into(),
        })?;

        tracing::info!(user_id = user.id, "Profile updated");
        Ok(Redirect::to(urls::index()))
    }

    pub(super) async fn requesting_user(&self, requester: &Requester) -> Result<User, DomainError> {
        self.users
            .find_by_id(requester.user_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }
}

pub(super) fn username_taken() -> DomainError {
    let mut errors = FormErrors::new();
    errors.add("username", USERNAME_TAKEN);
    DomainError::Validation(errors)
}
