use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use std::sync::Arc;
use summarist_audio::{validate_audio_upload, MAX_AUDIO_BYTES};
use tracing::info;

use super::summarize::with_speech;
use crate::error::ApiResult;
use crate::multipart::read_upload;
use crate::state::AppState;
use crate::types::{SummaryResponse, TranscribeQuery};

/// Transcribe an audio upload and summarize the transcript
#[post("/transcribe")]
pub async fn transcribe(
    payload: Multipart,
    query: web::Query<TranscribeQuery>,
    state: web::Data<Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let upload = read_upload(payload, MAX_AUDIO_BYTES).await?;
    validate_audio_upload(&upload.content, &upload.filename)?;
    info!("Audio upload: {} ({} bytes)", upload.filename, upload.content.len());

    let transcript = state
        .audio
        .transcribe(&upload.content, &upload.filename)
        .await?;

    let request =
        state.extracted_request(transcript, query.max_length, query.style.as_deref())?;
    let result = state.summarizer.summarize(&request).await?;
    let result = with_speech(&state, result, query.tts).await?;

    Ok(HttpResponse::Ok().json(SummaryResponse::from(result)))
}
