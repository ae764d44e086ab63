//! Staff-only reference data and moderation. Requires a bearer token with
//! the admin role; anything else is refused with 401/403 rather than a
//! login redirect.

use actix_web::{HttpResponse, web};

use blog_core::forms::{CategoryForm, LocationForm};

use super::redirect;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /admin/categories/
pub async fn list_categories(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let categories = state.blog.admin_categories(&identity.requester()).await?;
    Ok(HttpResponse::Ok().json(categories))
}

/// POST /admin/categories/
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Json<CategoryForm>,
) -> AppResult<HttpResponse> {
    let category = state
        .blog
        .admin_create_category(&identity.requester(), &form)
        .await
        .map_err(|e| AppError::from(e).with_form(&*form))?;
    Ok(HttpResponse::Created().json(category))
}

/// POST /admin/categories/{id}/
pub async fn update_category(
    state: web::Data<AppState>,
    identity: Identity,
    category_id: web::Path<i64>,
    form: web::Json<CategoryForm>,
) -> AppResult<HttpResponse> {
    let category = state
        .blog
        .admin_update_category(&identity.requester(), category_id.into_inner(), &form)
        .await
        .map_err(|e| AppError::from(e).with_form(&*form))?;
    Ok(HttpResponse::Ok().json(category))
}

/// GET /admin/locations/
pub async fn list_locations(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let locations = state.blog.admin_locations(&identity.requester()).await?;
    Ok(HttpResponse::Ok().json(locations))
}

/// POST /admin/locations/
pub async fn create_location(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Json<LocationForm>,
) -> AppResult<HttpResponse> {
    let location = state
        .blog
        .admin_create_location(&identity.requester(), &form)
        .await
        .map_err(|e| AppError::from(e).with_form(&*form))?;
    Ok(HttpResponse::Created().json(location))
}

/// POST /admin/locations/{id}/
pub async fn update_location(
    state: web::Data<AppState>,
    identity: Identity,
    location_id: web::Path<i64>,
    form: web::Json<LocationForm>,
) -> AppResult<HttpResponse> {
    let location = state
        .blog
        .admin_update_location(&identity.requester(), location_id.into_inner(), &form)
        .await
        .map_err(|e| AppError::from(e).with_form(&*form))?;
    Ok(HttpResponse::Ok().json(location))
}

/// POST /admin/posts/{id}/delete/
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let to = state
        .blog
        .admin_delete_post(&identity.requester(), post_id.into_inner())
        .await?;
    Ok(redirect(to))
}
