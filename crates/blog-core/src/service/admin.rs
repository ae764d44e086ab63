//! Reference data management and moderation, for staff only.

use super::{BlogService, Redirect, Requester};
use crate::domain::{Category, Location};
use crate::error::{DomainError, RepoError};
use crate::forms::{CategoryForm, FormErrors, LocationForm};
use crate::urls;

const SLUG_TAKEN: &str = "Category with this slug already exists.";

fn require_staff(requester: &Requester) -> Result<(), DomainError> {
    if requester.is_staff {
        Ok(())
    } else {
        tracing::debug!(requester_id = requester.user_id, "Staff-only operation refused");
        Err(DomainError::Forbidden)
    }
}

fn slug_taken() -> DomainError {
    let mut errors = FormErrors::new();
    errors.add("slug", SLUG_TAKEN);
    DomainError::Validation(errors)
}

impl BlogService {
    pub async fn admin_categories(
        &self,
        requester: &Requester,
    ) -> Result<Vec<Category>, DomainError> {
        require_staff(requester)?;
        Ok(self.categories.list_all().await?)
    }

    pub async fn admin_create_category(
        &self,
        requester: &Requester,
        form: &CategoryForm,
    ) -> Result<Category, DomainError> {
        require_staff(requester)?;
        let category = form.clean().map_err(DomainError::Validation)?;
        if self.categories.find_by_slug(&category.slug).await?.is_some() {
            return Err(slug_taken());
        }

        let category = self.categories.insert(category).await.map_err(slug_error)?;
        tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    pub async fn admin_update_category(
        &self,
        requester: &Requester,
        category_id: i64,
        form: &CategoryForm,
    ) -> Result<Category, DomainError> {
        require_staff(requester)?;
        let mut category = self
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category"))?;

        let cleaned = form.clean().map_err(DomainError::Validation)?;
        if let Some(existing) = self.categories.find_by_slug(&cleaned.slug).await? {
            if existing.id != category.id {
                return Err(slug_taken());
            }
        }

        category.title = cleaned.title;
        category.description = cleaned.description;
        category.slug = cleaned.slug;
        category.is_published = cleaned.is_published;
        let category = self.categories.update(category).await.map_err(slug_error)?;

        tracing::info!(category_id = category.id, "Category updated");
        Ok(category)
    }

    pub async fn admin_locations(
        &self,
        requester: &Requester,
    ) -> Result<Vec<Location>, DomainError> {
        require_staff(requester)?;
        Ok(self.locations.list_all().await?)
    }

    pub async fn admin_create_location(
        &self,
        requester: &Requester,
        form: &LocationForm,
    ) -> Result<Location, DomainError> {
        require_staff(requester)?;
        let location = form.clean().map_err(DomainError::Validation)?;
        let location = self.locations.insert(location).await?;

        tracing::info!(location_id = location.id, "Location created");
        Ok(location)
    }

    pub async fn admin_update_location(
        &self,
        requester: &Requester,
        location_id: i64,
        form: &LocationForm,
    ) -> Result<Location, DomainError> {
        require_staff(requester)?;
        let mut location = self
            .locations
            .find_by_id(location_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Location"))?;

        let cleaned = form.clean().map_err(DomainError::Validation)?;
        location.name = cleaned.name;
        location.is_published = cleaned.is_published;
        let location = self.locations.update(location).await?;

        tracing::info!(location_id = location.id, "Location updated");
        Ok(location)
    }

    /// Moderation: remove any post regardless of its author.
    pub async fn admin_delete_post(
        &self,
        requester: &Requester,
        post_id: i64,
    ) -> Result<Redirect, DomainError> {
        require_staff(requester)?;
        self.posts.delete(post_id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post"),
            other => other.into(),
        })?;

        tracing::info!(post_id, requester_id = requester.user_id, "Post removed by staff");
        Ok(Redirect::to(urls::index()))
    }
}

fn slug_error(err: RepoError) -> DomainError {
    match err {
        RepoError::Constraint(_) => slug_taken(),
        other => other.into(),
    }
}
