//! Post listings, detail, and owner-only post writes.

use super::{
    BlogService, CategoryContext, IndexContext, Outcome, PageMode, PostDeleteContext,
    PostDetailContext, PostFormContext, Redirect, Requester,
};
use crate::domain::Post;
use crate::error::DomainError;
use crate::forms::{INVALID_CHOICE, PostData, PostForm};
use crate::ports::PostQuery;
use crate::urls;

impl BlogService {
    /// Public index: visible posts, newest first.
    pub async fn index(&self, page: Option<&str>) -> Result<IndexContext, DomainError> {
        let query = PostQuery::Published { now: Self::now() };
        let page_obj = self.paginate(query, page, PageMode::Strict).await?;
        Ok(IndexContext { page_obj })
    }

    /// Visible posts of a published category.
    pub async fn category_posts(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<CategoryContext, DomainError> {
        let category = self
            .categories
            .find_published_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Category"))?;

        let query = PostQuery::PublishedInCategory {
            category_id: category.id,
            now: Self::now(),
        };
        let page_obj = self.paginate(query, page, PageMode::Strict).await?;
        Ok(CategoryContext { category, page_obj })
    }

    /// A post that is public, or that the requester wrote (draft preview).
    pub async fn post_detail(
        &self,
        post_id: i64,
        requester: Option<&Requester>,
    ) -> Result<PostDetailContext, DomainError> {
        let viewer = requester.map(|r| r.user_id);
        let post = self
            .posts
            .find_visible(post_id, viewer, Self::now())
            .await?
            .ok_or_else(|| DomainError::not_found("Post"))?;

        let author_username = self
            .users
            .find_by_id(post.author_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_default();
        let category = match post.category_id {
            Some(id) => self.categories.find_by_id(id).await?,
            None => None,
        };
        let location = match post.location_id {
            Some(id) => self.locations.find_by_id(id).await?,
            None => None,
        };
        let comments = self.comments.list_for_post(post.id).await?;

        Ok(PostDetailContext {
            post,
            author_username,
            category,
            location,
            comments,
            form: Default::default(),
        })
    }

    /// Empty create form.
    pub async fn new_post_form(
        &self,
        _requester: &Requester,
    ) -> Result<PostFormContext, DomainError> {
        self.post_form_context(None, PostForm::default()).await
    }

    /// Create a post authored by the requester, then go to their profile.
    pub async fn create_post(
        &self,
        requester: &Requester,
        form: &PostForm,
    ) -> Result<Redirect, DomainError> {
        let author = self.requesting_user(requester).await?;

        let data = self.clean_post_form(form).await?;
        let post = self.posts.insert(data.into_post(author.id)).await?;

        tracing::info!(post_id = post.id, author_id = author.id, "Post created");
        Ok(Redirect::to(urls::profile(&author.username)))
    }

    /// Edit form for the author; anyone else is sent back to the post.
    pub async fn edit_post_form(
        &self,
        requester: &Requester,
        post_id: i64,
    ) -> Result<Outcome<PostFormContext>, DomainError> {
        let post = self.post_for_edit(requester, post_id).await?;
        match post {
            Some(post) => {
                let context = self
                    .post_form_context(Some(post.id), PostForm::from_post(&post))
                    .await?;
                Ok(Outcome::Render(context))
            }
            None => Ok(Outcome::Redirect(Redirect::to(urls::post_detail(post_id)))),
        }
    }

    /// Apply an edit. A non-author changes nothing and is redirected to the
    /// post just like a successful edit.
    pub async fn update_post(
        &self,
        requester: &Requester,
        post_id: i64,
        form: &PostForm,
    ) -> Result<Redirect, DomainError> {
        let Some(mut post) = self.post_for_edit(requester, post_id).await? else {
            return Ok(Redirect::to(urls::post_detail(post_id)));
        };

        let data = self.clean_post_form(form).await?;
        data.apply_to(&mut post);
        let post = self.posts.update(post).await?;

        tracing::info!(post_id = post.id, "Post updated");
        Ok(Redirect::to(urls::post_detail(post.id)))
    }

    /// Delete confirmation. Only the author's own posts resolve.
    pub async fn delete_post_form(
        &self,
        requester: &Requester,
        post_id: i64,
    ) -> Result<PostDeleteContext, DomainError> {
        let post = self.owned_post(requester, post_id).await?;
        let form = PostForm::from_post(&post);
        Ok(PostDeleteContext { post, form })
    }

    /// Delete the requester's own post and its comments.
    pub async fn delete_post(
        &self,
        requester: &Requester,
        post_id: i64,
    ) -> Result<Redirect, DomainError> {
        let post = self.owned_post(requester, post_id).await?;
        self.posts.delete(post.id).await?;

        tracing::info!(post_id = post.id, "Post deleted");
        Ok(Redirect::to(urls::index()))
    }

    /// Look the post up unscoped (404 if absent), then check ownership.
    async fn post_for_edit(
        &self,
        requester: &Requester,
        post_id: i64,
    ) -> Result<Option<Post>, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post"))?;

        if !post.is_authored_by(requester.user_id) {
            tracing::debug!(
                post_id,
                requester_id = requester.user_id,
                "Edit by non-author, redirecting to detail"
            );
            return Ok(None);
        }
        Ok(Some(post))
    }

    /// Someone else's post is indistinguishable from a missing one.
    async fn owned_post(&self, requester: &Requester, post_id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_owned(post_id, requester.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post"))
    }

    async fn post_form_context(
        &self,
        post_id: Option<i64>,
        form: PostForm,
    ) -> Result<PostFormContext, DomainError> {
        Ok(PostFormContext {
            post_id,
            form,
            categories: self.categories.list_all().await?,
            locations: self.locations.list_all().await?,
        })
    }

    /// Field validation plus existence of the chosen category and location.
    async fn clean_post_form(&self, form: &PostForm) -> Result<PostData, DomainError> {
        let cleaned = form.clean();
        let mut errors = cleaned.as_ref().err().cloned().unwrap_or_default();

        if let Some(category_id) = form.category {
            if self.categories.find_by_id(category_id).await?.is_none() {
                errors.add("category", INVALID_CHOICE);
            }
        }
        if let Some(location_id) = form.location {
            if self.locations.find_by_id(location_id).await?.is_none() {
                errors.add("location", INVALID_CHOICE);
            }
        }

        match cleaned {
            Ok(data) if errors.is_empty() => Ok(data),
            _ => Err(DomainError::Validation(errors)),
        }
    }
}
