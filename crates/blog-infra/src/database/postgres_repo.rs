//! PostgreSQL repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, Iterable, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};

use blog_core::domain::{Category, Comment, CommentView, Location, Post, PostSummary, User};
use blog_core::error::RepoError;
use blog_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostQuery, PostRepository,
    Repositories, UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Wire every port to the given connection.
pub fn postgres_repositories(db: DatabaseConnection) -> Repositories {
    Repositories {
        users: Arc::new(PostgresUserRepository::new(db.clone())),
        categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
        locations: Arc::new(PostgresLocationRepository::new(db.clone())),
        posts: Arc::new(PostgresPostRepository::new(db.clone())),
        comments: Arc::new(PostgresCommentRepository::new(db)),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsPublished.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Title)
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .order_by_asc(location::Column::Name)
            .order_by_asc(location::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// A post row annotated for listings.
#[derive(Debug, FromQueryResult)]
struct PostSummaryRow {
    id: i64,
    title: String,
    text: String,
    pub_date: DateTimeWithTimeZone,
    author_id: i64,
    location_id: Option<i64>,
    category_id: Option<i64>,
    is_published: bool,
    created_at: DateTimeWithTimeZone,
    author_username: String,
    comment_count: i64,
}

impl From<PostSummaryRow> for PostSummary {
    fn from(row: PostSummaryRow) -> Self {
        Self {
            post: Post {
                id: row.id,
                title: row.title,
                text: row.text,
                pub_date: row.pub_date.into(),
                author_id: row.author_id,
                location_id: row.location_id,
                category_id: row.category_id,
                is_published: row.is_published,
                created_at: row.created_at.into(),
            },
            author_username: row.author_username,
            comment_count: row.comment_count.max(0) as u64,
        }
    }
}

/// The public-visibility predicate; needs `categories` joined.
fn publicly_visible(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(post::Column::IsPublished.eq(true))
        .add(category::Column::IsPublished.eq(true))
        .add(post::Column::PubDate.lte(now))
}

/// Posts covered by a listing, without annotations.
fn scoped(query: PostQuery) -> Select<PostEntity> {
    match query {
        PostQuery::Published { now } => PostEntity::find()
            .join(JoinType::InnerJoin, post::Relation::Category.def())
            .filter(publicly_visible(now)),
        PostQuery::PublishedInCategory { category_id, now } => PostEntity::find()
            .join(JoinType::InnerJoin, post::Relation::Category.def())
            .filter(post::Column::CategoryId.eq(category_id))
            .filter(publicly_visible(now)),
        PostQuery::ByAuthor { author_id } => {
            PostEntity::find().filter(post::Column::AuthorId.eq(author_id))
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count(&self, query: PostQuery) -> Result<u64, RepoError> {
        scoped(query).count(&self.db).await.map_err(map_db_err)
    }

    async fn list(
        &self,
        query: PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostSummary>, RepoError> {
        let rows = scoped(query)
            .select_only()
            .columns(post::Column::iter())
            .column_as(user::Column::Username, "author_username")
            .column_as(
                Expr::col((CommentEntity, comment::Column::Id)).count(),
                "comment_count",
            )
            .join(JoinType::InnerJoin, post::Relation::Author.def())
            .join(JoinType::LeftJoin, post::Relation::Comments.def())
            .group_by(post::Column::Id)
            .group_by(user::Column::Username)
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .into_model::<PostSummaryRow>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_visible(
        &self,
        id: i64,
        viewer: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let visibility = match viewer {
            Some(author_id) => Condition::any()
                .add(publicly_visible(now))
                .add(post::Column::AuthorId.eq(author_id)),
            None => publicly_visible(now),
        };

        let result = PostEntity::find_by_id(id)
            .join(JoinType::LeftJoin, post::Relation::Category.def())
            .filter(visibility)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_owned(&self, id: i64, author_id: i64) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .filter(post::Column::AuthorId.eq(author_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .find_also_related(UserEntity)
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentView {
                comment: Comment::from(comment),
                author_username: author.map(|a| a.username).unwrap_or_default(),
            })
            .collect())
    }

    async fn find_owned(&self, id: i64, author_id: i64) -> Result<Option<Comment>, RepoError> {
        let result = CommentEntity::find_by_id(id)
            .filter(comment::Column::AuthorId.eq(author_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}
