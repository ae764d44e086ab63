//! Comment writes. Edits and deletes resolve a comment only through its
//! author, so someone else's comment is reported as missing.

use super::{BlogService, CommentDeleteContext, CommentFormContext, Redirect, Requester};
use crate::domain::Comment;
use crate::error::DomainError;
use crate::forms::CommentForm;
use crate::urls;

impl BlogService {
    /// Comment on any existing post.
    pub async fn add_comment(
        &self,
        requester: &Requester,
        post_id: i64,
        form: &CommentForm,
    ) -> Result<Redirect, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post"))?;

        let text = form.clean().map_err(DomainError::Validation)?;
        let comment = self
            .comments
            .insert(Comment::new(post.id, requester.user_id, text))
            .await?;

        tracing::info!(comment_id = comment.id, post_id = post.id, "Comment added");
        Ok(Redirect::to(urls::post_detail(post.id)))
    }

    pub async fn edit_comment_form(
        &self,
        requester: &Requester,
        comment_id: i64,
    ) -> Result<CommentFormContext, DomainError> {
        let comment = self.owned_comment(requester, comment_id).await?;
        let form = CommentForm::from_comment(&comment);
        Ok(CommentFormContext { comment, form })
    }

    pub async fn update_comment(
        &self,
        requester: &Requester,
        comment_id: i64,
        form: &CommentForm,
    ) -> Result<Redirect, DomainError> {
        let mut comment = self.owned_comment(requester, comment_id).await?;
        comment.text = form.clean().map_err(DomainError::Validation)?;
        let comment = self.comments.update(comment).await?;

        tracing::info!(comment_id = comment.id, "Comment updated");
        Ok(Redirect::to(urls::post_detail(comment.post_id)))
    }

    pub async fn delete_comment_form(
        &self,
        requester: &Requester,
        comment_id: i64,
    ) -> Result<CommentDeleteContext, DomainError> {
        let comment = self.owned_comment(requester, comment_id).await?;
        Ok(CommentDeleteContext { comment })
    }

    pub async fn delete_comment(
        &self,
        requester: &Requester,
        comment_id: i64,
    ) -> Result<Redirect, DomainError> {
        let comment = self.owned_comment(requester, comment_id).await?;
        self.comments.delete(comment.id).await?;

        tracing::info!(comment_id = comment.id, "Comment deleted");
        Ok(Redirect::to(urls::post_detail(comment.post_id)))
    }

    async fn owned_comment(
        &self,
        requester: &Requester,
        comment_id: i64,
    ) -> Result<Comment, DomainError> {
        self.comments
            .find_owned(comment_id, requester.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment"))
    }
}
