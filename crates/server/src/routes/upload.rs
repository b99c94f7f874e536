use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use std::sync::Arc;
use summarist_common::SummaristError;
use summarist_parser::MAX_DOCUMENT_BYTES;
use tracing::info;

use crate::error::ApiResult;
use crate::multipart::read_upload;
use crate::state::AppState;
use crate::types::{DocumentQuery, SummaryResponse};

/// Summarize an uploaded PDF, DOCX or TXT document
#[post("/upload")]
pub async fn upload(
    payload: Multipart,
    query: web::Query<DocumentQuery>,
    state: web::Data<Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let upload = read_upload(payload, MAX_DOCUMENT_BYTES).await?;
    info!("Document upload: {} ({} bytes)", upload.filename, upload.content.len());

    // Extraction is CPU bound
    let parser = state.parser;
    let text = web::block(move || parser.parse(&upload.content, &upload.filename))
        .await
        .map_err(|e| SummaristError::internal(format!("Document parsing was cancelled: {}", e)))??;

    let request = state.extracted_request(text, query.max_length, query.style.as_deref())?;
    let result = state.summarizer.summarize(&request).await?;

    Ok(HttpResponse::Ok().json(SummaryResponse::from(result)))
}
