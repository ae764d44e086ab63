//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod comments;
mod health;
mod posts;
mod profile;

#[cfg(test)]
mod tests;

use actix_web::{HttpMessage, HttpRequest, HttpResponse, error::JsonPayloadError, http::header, web};
use serde::Serialize;

use blog_core::Redirect;
use blog_core::service::Outcome;
use blog_shared::{ErrorResponse, RedirectResponse};

use crate::observability::RequestId;

/// Configure all application routes.
///
/// Literal segments are registered before the patterns that would
/// otherwise capture them (`/posts/create/` before `/posts/{id}/`).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/", web::get().to(posts::index))
        .route("/health/", web::get().to(health::health_check))
        .route("/category/{slug}/", web::get().to(posts::category_posts))
        .service(
            web::scope("/posts")
                .service(
                    web::resource("/create/")
                        .route(web::get().to(posts::create_form))
                        .route(web::post().to(posts::create)),
                )
                .route("/{id}/", web::get().to(posts::detail))
                .service(
                    web::resource("/{id}/edit/")
                        .route(web::get().to(posts::edit_form))
                        .route(web::post().to(posts::edit)),
                )
                .service(
                    web::resource("/{id}/delete/")
                        .route(web::get().to(posts::delete_form))
                        .route(web::post().to(posts::delete)),
                )
                .route("/{id}/comment/", web::post().to(comments::add))
                .service(
                    web::resource("/{id}/edit_comment/{comment_id}/")
                        .route(web::get().to(comments::edit_form))
                        .route(web::post().to(comments::edit)),
                )
                .service(
                    web::resource("/{id}/delete_comment/{comment_id}/")
                        .route(web::get().to(comments::delete_form))
                        .route(web::post().to(comments::delete)),
                ),
        )
        .service(
            web::scope("/profile")
                .service(
                    web::resource("/edit/")
                        .route(web::get().to(profile::edit_form))
                        .route(web::post().to(profile::edit)),
                )
                .route("/{username}/", web::get().to(profile::show)),
        )
        .service(
            web::scope("/auth")
                .route("/registration/", web::post().to(auth::register))
                .route("/login/", web::post().to(auth::login))
                .route("/me/", web::get().to(auth::me)),
        )
        .service(
            web::scope("/admin")
                .service(
                    web::resource("/categories/")
                        .route(web::get().to(admin::list_categories))
                        .route(web::post().to(admin::create_category)),
                )
                .route("/categories/{id}/", web::post().to(admin::update_category))
                .service(
                    web::resource("/locations/")
                        .route(web::get().to(admin::list_locations))
                        .route(web::post().to(admin::create_location)),
                )
                .route("/locations/{id}/", web::post().to(admin::update_location))
                .route("/posts/{id}/delete/", web::post().to(admin::delete_post)),
        );
}

/// `302 Found` to the redirect target, with the target in the body too.
pub(crate) fn redirect(to: Redirect) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, to.location.as_str()))
        .json(RedirectResponse::new(to.location))
}

pub(crate) fn render<C: Serialize>(context: C) -> HttpResponse {
    HttpResponse::Ok().json(context)
}

pub(crate) fn respond<C: Serialize>(outcome: Outcome<C>) -> HttpResponse {
    match outcome {
        Outcome::Render(context) => render(context),
        Outcome::Redirect(to) => redirect(to),
    }
}

/// Malformed JSON bodies become RFC 7807 `400`s.
fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let mut problem = ErrorResponse::bad_request(err.to_string()).with_instance(req.path());
    if let Some(id) = req.extensions().get::<RequestId>() {
        problem = problem.with_request_id(id.as_str());
    }
    actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(problem))
        .into()
}
