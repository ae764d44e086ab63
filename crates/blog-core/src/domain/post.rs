use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Category;

/// Post entity - a blog entry, possibly scheduled for the future.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Publication moment. A value in the future schedules the post.
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub location_id: Option<i64>,
    pub category_id: Option<i64>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new, not yet persisted post.
    pub fn new(author_id: i64, title: String, text: String, pub_date: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            title,
            text,
            pub_date,
            author_id,
            location_id: None,
            category_id: None,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    pub fn is_scheduled(&self, now: DateTime<Utc>) -> bool {
        self.pub_date > now
    }

    /// Whether anyone may see this post.
    ///
    /// `category` must be the post's own category (or `None` when it has none);
    /// a post without a category is never public.
    pub fn is_publicly_visible(&self, category: Option<&Category>, now: DateTime<Utc>) -> bool {
        let category_published = match (self.category_id, category) {
            (Some(id), Some(category)) => category.id == id && category.is_published,
            _ => false,
        };
        self.is_published && category_published && !self.is_scheduled(now)
    }

    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}

/// A post as it appears in listings: annotated with its author and comment count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    #[serde(flatten)]
    pub post: Post,
    pub author_username: String,
    pub comment_count: u64,
}
