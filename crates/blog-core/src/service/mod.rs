//! Request use cases.
//!
//! One method per route. Each method authorizes, queries and validates
//! through the ports, and returns either a rendering context or a
//! [`Redirect`]. Operations that need a logged-in user take a [`Requester`];
//! turning "nobody is logged in" into a login redirect is the caller's job.

mod accounts;
mod admin;
mod comments;
pub mod context;
mod posts;
mod profiles;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::PostSummary;
use crate::error::DomainError;
use crate::pagination::{PAGE_SIZE, Page, Paginator};
use crate::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostQuery, PostRepository,
    Repositories, UserRepository,
};

pub use context::*;

/// The authenticated user a request is made on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: i64,
    pub is_staff: bool,
}

impl Requester {
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id,
            is_staff: false,
        }
    }

    pub fn staff(user_id: i64) -> Self {
        Self {
            user_id,
            is_staff: true,
        }
    }
}

/// Successful completion of a write: where the client goes next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub location: String,
}

impl Redirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

/// Either a page to render or a redirect elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<C> {
    Render(C),
    Redirect(Redirect),
}

/// How a `?page=` value that names no page is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageMode {
    /// Malformed or out-of-range pages are not found.
    Strict,
    /// Malformed pages fall back to the first, out-of-range ones to the last.
    Lenient,
}

/// Blog use cases over a set of repositories.
pub struct BlogService {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    locations: Arc<dyn LocationRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl BlogService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            users: repos.users,
            categories: repos.categories,
            locations: repos.locations,
            posts: repos.posts,
            comments: repos.comments,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    /// Count, resolve the requested page, then fetch just that slice.
    async fn paginate(
        &self,
        query: PostQuery,
        raw_page: Option<&str>,
        mode: PageMode,
    ) -> Result<Page<PostSummary>, DomainError> {
        let paginator = Paginator::new(self.posts.count(query).await?, PAGE_SIZE);
        let number = match mode {
            PageMode::Strict => paginator.page(raw_page).map_err(|e| {
                tracing::debug!(error = %e, "Rejected page number");
                DomainError::not_found("Page")
            })?,
            PageMode::Lenient => paginator.get_page(raw_page),
        };
        let items = self
            .posts
            .list(query, paginator.offset(number), paginator.per_page())
            .await?;
        Ok(Page::new(items, number, &paginator))
    }
}
