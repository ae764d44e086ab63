//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::observability::RequestId;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
    pub request_id: String,
}

/// GET /health/
pub async fn health_check(state: web::Data<AppState>, request_id: RequestId) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: storage_kind(&state),
        timestamp: chrono::Utc::now().to_rfc3339(),
        request_id: request_id.as_str().to_owned(),
    };

    HttpResponse::Ok().json(response)
}

#[cfg(feature = "postgres")]
fn storage_kind(state: &AppState) -> &'static str {
    if state.db.is_some() { "postgres" } else { "memory" }
}

#[cfg(not(feature = "postgres"))]
fn storage_kind(_state: &AppState) -> &'static str {
    "memory"
}
