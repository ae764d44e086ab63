//! Account handlers.

use actix_web::{HttpResponse, web};

use blog_core::DomainError;
use blog_core::domain::User;
use blog_core::forms::RegistrationForm;
use blog_shared::dto::{AuthResponse, LoginRequest, UserResponse};

use crate::middleware::auth::{ADMIN_ROLE, Identity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn user_response(user: User) -> UserResponse {
    UserResponse {
        display_name: user.display_name(),
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        is_staff: user.is_staff,
        date_joined: user.date_joined,
    }
}

/// Bearer token for a user; staff get the admin role.
fn issue_token(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let mut roles = vec!["user".to_string()];
    if user.is_staff {
        roles.push(ADMIN_ROLE.to_string());
    }

    let token = state
        .token_service
        .generate_token(user.id, &user.username, roles)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse::bearer(
        token,
        state.token_service.expiration_seconds().max(0) as u64,
    ))
}

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegistrationForm>,
) -> AppResult<HttpResponse> {
    let user = state
        .blog
        .register(&body, &*state.password_service)
        .await
        .map_err(|e| AppError::from(e).with_form(&*body))?;

    Ok(HttpResponse::Created().json(issue_token(&state, &user)?))
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let user = state
        .blog
        .authenticate(&body.username, &body.password, &*state.password_service)
        .await
        .map_err(|e| match e {
            DomainError::Unauthorized => {
                tracing::debug!(username = %body.username, "Login rejected");
                AppError::Unauthorized
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(HttpResponse::Ok().json(issue_token(&state, &user)?))
}

/// GET /auth/me/
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state.blog.current_user(&identity.requester()).await?;
    Ok(HttpResponse::Ok().json(user_response(user)))
}
