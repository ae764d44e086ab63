//! Comment writes. The post id in the path only shapes the URL; comments
//! are resolved by their own id and author.

use actix_web::{HttpResponse, web};

use blog_core::forms::CommentForm;

use super::{redirect, render};
use crate::middleware::auth::LoginRequired;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /posts/{id}/comment/
pub async fn add(
    state: web::Data<AppState>,
    user: LoginRequired,
    post_id: web::Path<i64>,
    form: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let to = state
        .blog
        .add_comment(&user.requester(), post_id.into_inner(), &form)
        .await
        .map_err(|e| AppError::from(e).with_form(&*form))?;
    Ok(redirect(to))
}

/// GET /posts/{id}/edit_comment/{comment_id}/
pub async fn edit_form(
    state: web::Data<AppState>,
    user: LoginRequired,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (_post_id, comment_id) = path.into_inner();
    let context = state
        .blog
        .edit_comment_form(&user.requester(), comment_id)
        .await?;
    Ok(render(context))
}

/// POST /posts/{id}/edit_comment/{comment_id}/
pub async fn edit(
    state: web::Data<AppState>,
    user: LoginRequired,
    path: web::Path<(i64, i64)>,
    form: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let (_post_id, comment_id) = path.into_inner();
    let to = state
        .blog
        .update_comment(&user.requester(), comment_id, &form)
        .await
        .map_err(|e| AppError::from(e).with_form(&*form))?;
    Ok(redirect(to))
}

/// GET /posts/{id}/delete_comment/{comment_id}/
pub async fn delete_form(
    state: web::Data<AppState>,
    user: LoginRequired,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (_post_id, comment_id) = path.into_inner();
    let context = state
        .blog
        .delete_comment_form(&user.requester(), comment_id)
        .await?;
    Ok(render(context))
}

/// POST /posts/{id}/delete_comment/{comment_id}/
pub async fn delete(
    state: web::Data<AppState>,
    user: LoginRequired,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (_post_id, comment_id) = path.into_inner();
    let to = state
        .blog
        .delete_comment(&user.requester(), comment_id)
        .await?;
    Ok(redirect(to))
}
