//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{
    HttpResponse, ResponseError,
    http::{StatusCode, header},
};
use serde_json::Value;
use thiserror::Error;

use blog_core::error::{DomainError, RepoError};
use blog_core::forms::FormErrors;
use blog_shared::{ErrorResponse, RedirectResponse};

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// No usable token on a login-required route; answered with a redirect
    /// to the login page.
    #[error("Authentication required")]
    AuthenticationRequired { login_url: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Rejected form; `form` echoes what was submitted.
    #[error("Validation failed: {errors}")]
    Validation {
        errors: FormErrors,
        form: Option<Value>,
    },
}

impl AppError {
    /// Attach the submitted form to a validation failure.
    pub fn with_form<F: serde::Serialize>(self, submitted: &F) -> Self {
        match self {
            AppError::Validation { errors, .. } => AppError::Validation {
                errors,
                form: serde_json::to_value(submitted).ok(),
            },
            other => other,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthenticationRequired { .. } => StatusCode::FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::AuthenticationRequired { login_url } => {
                return HttpResponse::Found()
                    .insert_header((header::LOCATION, login_url.as_str()))
                    .json(RedirectResponse::new(login_url.as_str()));
            }
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Forbidden => ErrorResponse::forbidden(),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
            AppError::Validation { errors, form } => {
                let body = ErrorResponse::unprocessable(
                    serde_json::to_value(errors).unwrap_or(Value::Null),
                );
                match form {
                    Some(form) => body.with_form(form.clone()),
                    None => body,
                }
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type } => {
                AppError::NotFound(format!("{} not found", entity_type))
            }
            DomainError::Validation(errors) => AppError::Validation { errors, form: None },
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        DomainError::from(err).into()
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
