//! Post listings, detail and post writes.

use actix_web::{HttpResponse, web};

use blog_core::forms::PostForm;
use blog_shared::dto::PageQuery;

use super::{redirect, render, respond};
use crate::middleware::auth::{LoginRequired, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let context = state.blog.index(query.page.as_deref()).await?;
    Ok(render(context))
}

/// GET /category/{slug}/
pub async fn category_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let context = state
        .blog
        .category_posts(&slug, query.page.as_deref())
        .await?;
    Ok(render(context))
}

/// GET /posts/{id}/
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let requester = identity.requester();
    let context = state
        .blog
        .post_detail(post_id.into_inner(), requester.as_ref())
        .await?;
    Ok(render(context))
}

/// GET /posts/create/
pub async fn create_form(
    state: web::Data<AppState>,
    user: LoginRequired,
) -> AppResult<HttpResponse> {
    let context = state.blog.new_post_form(&user.requester()).await?;
    Ok(render(context))
}

/// POST /posts/create/
pub async fn create(
    state: web::Data<AppState>,
    user: LoginRequired,
    form: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let to = state
        .blog
        .create_post(&user.requester(), &form)
        .await
        .map_err(|e| AppError::from(e).with_form(&*form))?;
    Ok(redirect(to))
}

/// GET /posts/{id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    user: LoginRequired,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .edit_post_form(&user.requester(), post_id.into_inner())
        .await?;
    Ok(respond(outcome))
}

/// POST /posts/{id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    user: LoginRequired,
    post_id: web::Path<i64>,
    form: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let to = state
        .blog
        .update_post(&user.requester(), post_id.into_inner(), &form)
        .await
        .map_err(|e| AppError::from(e).with_form(&*form))?;
    Ok(redirect(to))
}

/// GET /posts/{id}/delete/
pub async fn delete_form(
    state: web::Data<AppState>,
    user: LoginRequired,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let context = state
        .blog
        .delete_post_form(&user.requester(), post_id.into_inner())
        .await?;
    Ok(render(context))
}

/// POST /posts/{id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    user: LoginRequired,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let to = state
        .blog
        .delete_post(&user.requester(), post_id.into_inner())
        .await?;
    Ok(redirect(to))
}
