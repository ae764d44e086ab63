//! Profiles.

use actix_web::{HttpResponse, web};

use blog_core::forms::ProfileForm;
use blog_shared::dto::PageQuery;

use super::{redirect, render};
use crate::middleware::auth::LoginRequired;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /profile/{username}/
pub async fn show(
    state: web::Data<AppState>,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let context = state
        .blog
        .profile(&username, query.page.as_deref())
        .await?;
    Ok(render(context))
}

/// GET /profile/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    user: LoginRequired,
) -> AppResult<HttpResponse> {
    let context = state.blog.edit_profile_form(&user.requester()).await?;
    Ok(render(context))
}

/// POST /profile/edit/
pub async fn edit(
    state: web::Data<AppState>,
    user: LoginRequired,
    form: web::Json<ProfileForm>,
) -> AppResult<HttpResponse> {
    let to = state
        .blog
        .update_profile(&user.requester(), &form)
        .await
        .map_err(|e| AppError::from(e).with_form(&*form))?;
    Ok(redirect(to))
}
