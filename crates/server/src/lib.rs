//! Summarist HTTP Server
//!
//! Actix-web 기반 요약 REST API (JSON, 문서 업로드, 음성, SSE 스트리밍)

pub mod error;
pub mod multipart;
pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use summarist_common::{AppConfig, Result, SummaristError};
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use error::ApiError;
pub use state::AppState;

/// Register every route plus the extractor error handlers
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::from(SummaristError::validation(err.to_string())).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::from(SummaristError::validation(err.to_string())).into()
    }))
    .service(routes::health::health)
    .service(routes::summarize::summarize_stream)
    .service(routes::summarize::summarize)
    .service(routes::upload::upload)
    .service(routes::transcribe::transcribe);
}

/// Build the application state from configuration and serve until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_address = config.server_bind_address();
    let state = web::Data::new(Arc::new(AppState::from_config(config)?));

    info!("Starting HTTP server on http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}
