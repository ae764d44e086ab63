use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Category, Comment, CommentView, Location, Post, PostSummary, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity; the store assigns its ID.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Dependent rows follow the schema's
    /// delete rules (comments cascade with their post).
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    /// Find a user by their unique username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Find a category by slug, ignoring unpublished ones.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;
}

#[async_trait]
pub trait LocationRepository: BaseRepository<Location, i64> {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError>;
}

/// Which posts a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostQuery {
    /// Published posts in a published category whose `pub_date` has passed.
    Published { now: DateTime<Utc> },
    /// Same as `Published`, restricted to one category.
    PublishedInCategory { category_id: i64, now: DateTime<Utc> },
    /// Every post by one author, regardless of publication state.
    ByAuthor { author_id: i64 },
}

/// Post repository.
///
/// Listings are ordered by `pub_date` descending (ties by id descending) and
/// annotated with the author's username and the comment count.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    async fn count(&self, query: PostQuery) -> Result<u64, RepoError>;

    async fn list(
        &self,
        query: PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostSummary>, RepoError>;

    /// Find a post that is either publicly visible at `now` or authored by `viewer`.
    async fn find_visible(
        &self,
        id: i64,
        viewer: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError>;

    /// Find a post only if `author_id` wrote it.
    async fn find_owned(&self, id: i64, author_id: i64) -> Result<Option<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    /// All comments of a post, oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, RepoError>;

    /// Find a comment only if `author_id` wrote it.
    async fn find_owned(&self, id: i64, author_id: i64) -> Result<Option<Comment>, RepoError>;
}

/// The full set of repositories a service needs, shareable across workers.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}
