use actix_web::{get, web, HttpResponse};
use std::sync::Arc;

use crate::state::AppState;
use crate::types::HealthResponse;

/// Liveness probe
#[get("/health")]
pub async fn health(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        app: state.config.app_name.clone(),
        version: state.config.version.clone(),
    })
}
