//! In-memory store - used when no database is configured, and in tests.
//!
//! Every table lives behind one async `RwLock`, so each repository call is
//! atomic just like a single SQL statement. Delete rules match the
//! PostgreSQL schema: comments cascade with their post, posts and comments
//! cascade with their author, and a removed category or location is
//! detached from its posts. Note: Data is lost on process restart.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use blog_core::domain::{Category, Comment, CommentView, Location, Post, PostSummary, User};
use blog_core::error::RepoError;
use blog_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostQuery,
    PostRepository, Repositories, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    categories: BTreeMap<i64, Category>,
    locations: BTreeMap<i64, Location>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn publicly_visible(&self, post: &Post, now: DateTime<Utc>) -> bool {
        let category = post.category_id.and_then(|id| self.categories.get(&id));
        post.is_publicly_visible(category, now)
    }

    fn matches(&self, post: &Post, query: PostQuery) -> bool {
        match query {
            PostQuery::Published { now } => self.publicly_visible(post, now),
            PostQuery::PublishedInCategory { category_id, now } => {
                post.category_id == Some(category_id) && self.publicly_visible(post, now)
            }
            PostQuery::ByAuthor { author_id } => post.author_id == author_id,
        }
    }

    fn username_of(&self, user_id: i64) -> String {
        self.users
            .get(&user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn check_username(&self, user: &User) -> Result<(), RepoError> {
        let taken = self
            .users
            .values()
            .any(|u| u.username == user.username && u.id != user.id);
        if taken {
            return Err(RepoError::Constraint(format!(
                "username {:?} already exists",
                user.username
            )));
        }
        Ok(())
    }

    fn check_slug(&self, category: &Category) -> Result<(), RepoError> {
        let taken = self
            .categories
            .values()
            .any(|c| c.slug == category.slug && c.id != category.id);
        if taken {
            return Err(RepoError::Constraint(format!(
                "slug {:?} already exists",
                category.slug
            )));
        }
        Ok(())
    }

    fn check_post_refs(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("post author does not exist".into()));
        }
        if post.category_id.is_some_and(|id| !self.categories.contains_key(&id)) {
            return Err(RepoError::Constraint("post category does not exist".into()));
        }
        if post.location_id.is_some_and(|id| !self.locations.contains_key(&id)) {
            return Err(RepoError::Constraint("post location does not exist".into()));
        }
        Ok(())
    }

    fn check_comment_refs(&self, comment: &Comment) -> Result<(), RepoError> {
        if !self.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("comment post does not exist".into()));
        }
        if !self.users.contains_key(&comment.author_id) {
            return Err(RepoError::Constraint("comment author does not exist".into()));
        }
        Ok(())
    }

    fn comment_count(&self, post_id: i64) -> u64 {
        self.comments
            .values()
            .filter(|c| c.post_id == post_id)
            .count() as u64
    }
}

/// All repositories backed by process memory.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out this store as every port of a service.
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            categories: self.clone(),
            locations: self.clone(),
            posts: self.clone(),
            comments: self.clone(),
        }
    }
}

/// `BaseRepository` for one table; `$check` guards writes, deletes run the
/// table's `on_delete` rule.
macro_rules! table_repository {
    ($entity:ty, $table:ident, $check:expr) => {
        #[async_trait]
        impl BaseRepository<$entity, i64> for InMemoryStore {
            async fn find_by_id(&self, id: i64) -> Result<Option<$entity>, RepoError> {
                Ok(self.tables.read().await.$table.get(&id).cloned())
            }

            async fn insert(&self, mut entity: $entity) -> Result<$entity, RepoError> {
                let mut tables = self.tables.write().await;
                let check: fn(&Tables, &$entity) -> Result<(), RepoError> = $check;
                check(&tables, &entity)?;
                entity.id = tables.next_id();
                tables.$table.insert(entity.id, entity.clone());
                Ok(entity)
            }

            async fn update(&self, entity: $entity) -> Result<$entity, RepoError> {
                let mut tables = self.tables.write().await;
                if !tables.$table.contains_key(&entity.id) {
                    return Err(RepoError::NotFound);
                }
                let check: fn(&Tables, &$entity) -> Result<(), RepoError> = $check;
                check(&tables, &entity)?;
                tables.$table.insert(entity.id, entity.clone());
                Ok(entity)
            }

            async fn delete(&self, id: i64) -> Result<(), RepoError> {
                let mut tables = self.tables.write().await;
                tables.$table.remove(&id).ok_or(RepoError::NotFound)?;
                on_delete::$table(&mut tables, id);
                Ok(())
            }
        }
    };
}

/// Delete rules, mirroring the foreign keys of the SQL schema.
mod on_delete {
    use super::Tables;

    pub(super) fn users(tables: &mut Tables, id: i64) {
        tables.posts.retain(|_, p| p.author_id != id);
        tables.comments.retain(|_, c| c.author_id != id);
        let posts = &tables.posts;
        tables.comments.retain(|_, c| posts.contains_key(&c.post_id));
    }

    pub(super) fn categories(tables: &mut Tables, id: i64) {
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
    }

    pub(super) fn locations(tables: &mut Tables, id: i64) {
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
    }

    pub(super) fn posts(tables: &mut Tables, id: i64) {
        tables.comments.retain(|_, c| c.post_id != id);
    }

    pub(super) fn comments(_tables: &mut Tables, _id: i64) {}
}

table_repository!(User, users, Tables::check_username);
table_repository!(Category, categories, Tables::check_slug);
table_repository!(Location, locations, |_, _| Ok(()));
table_repository!(Post, posts, Tables::check_post_refs);
table_repository!(Comment, comments, Tables::check_comment_refs);

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.slug == slug && c.is_published)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<_> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(categories)
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let tables = self.tables.read().await;
        let mut locations: Vec<_> = tables.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(locations)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn count(&self, query: PostQuery) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|p| tables.matches(p, query))
            .count() as u64)
    }

    async fn list(
        &self,
        query: PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostSummary>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables
            .posts
            .values()
            .filter(|p| tables.matches(p, query))
            .collect();
        posts.sort_by_key(|p| Reverse((p.pub_date, p.id)));

        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| PostSummary {
                post: p.clone(),
                author_username: tables.username_of(p.author_id),
                comment_count: tables.comment_count(p.id),
            })
            .collect())
    }

    async fn find_visible(
        &self,
        id: i64,
        viewer: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .get(&id)
            .filter(|p| {
                tables.publicly_visible(p, now) || viewer.is_some_and(|v| p.is_authored_by(v))
            })
            .cloned())
    }

    async fn find_owned(&self, id: i64, author_id: i64) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .get(&id)
            .filter(|p| p.is_authored_by(author_id))
            .cloned())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                comment: c.clone(),
                author_username: tables.username_of(c.author_id),
            })
            .collect())
    }

    async fn find_owned(&self, id: i64, author_id: i64) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .get(&id)
            .filter(|c| c.author_id == author_id)
            .cloned())
    }
}
