//! Rendering contexts returned by the use cases.

use serde::Serialize;

use crate::domain::{Category, Comment, CommentView, Location, Post, PostSummary, User};
use crate::forms::{CommentForm, PostForm, ProfileForm};
use crate::pagination::Page;

/// Public index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexContext {
    pub page_obj: Page<PostSummary>,
}

/// Posts of one published category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryContext {
    pub category: Category,
    pub page_obj: Page<PostSummary>,
}

/// A single post with its comments and an empty comment form.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailContext {
    pub post: Post,
    pub author_username: String,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comments: Vec<CommentView>,
    pub form: CommentForm,
}

/// Post create/edit form with the choices for its select fields.
#[derive(Debug, Clone, Serialize)]
pub struct PostFormContext {
    /// `None` while creating.
    pub post_id: Option<i64>,
    pub form: PostForm,
    pub categories: Vec<Category>,
    pub locations: Vec<Location>,
}

/// Delete confirmation for a post.
#[derive(Debug, Clone, Serialize)]
pub struct PostDeleteContext {
    pub post: Post,
    pub form: PostForm,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentFormContext {
    pub comment: Comment,
    pub form: CommentForm,
}

/// Delete confirmation for a comment; carries no form.
#[derive(Debug, Clone, Serialize)]
pub struct CommentDeleteContext {
    pub comment: Comment,
}

/// A user's public page with every post they wrote.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileContext {
    pub profile: User,
    pub page_obj: Page<PostSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileFormContext {
    pub form: ProfileForm,
}
