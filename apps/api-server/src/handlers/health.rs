//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use yatube_core::ports::BaseRepository;

use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub users: u64,
}

/// Health check endpoint - returns server status once the store answers.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let users = state.store.users().count().await?;

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        users,
    }))
}
