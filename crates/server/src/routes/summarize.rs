use actix_web::{post, web, HttpResponse};
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Arc;
use summarist_llm::{StreamEvent, SummaryResult};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{SummarizeBody, SummaryResponse, TtsQuery};

/// Attach narrated audio when the client asked for it
pub(crate) async fn with_speech(
    state: &AppState,
    result: SummaryResult,
    tts: bool,
) -> ApiResult<SummaryResult> {
    if !tts {
        return Ok(result);
    }
    let audio = state.audio.synthesize(&result.summary).await?;
    Ok(result.with_audio(audio))
}

/// Summarize JSON text
#[post("/summarize")]
pub async fn summarize(
    body: web::Json<SummarizeBody>,
    query: web::Query<TtsQuery>,
    state: web::Data<Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let request = state.direct_request(body.text, body.max_length, body.style.as_deref())?;

    let result = state.summarizer.summarize(&request).await?;
    let result = with_speech(&state, result, query.tts).await?;

    Ok(HttpResponse::Ok().json(SummaryResponse::from(result)))
}

fn sse_frame(event: &StreamEvent) -> Bytes {
    let json = serde_json::to_string(event)
        .unwrap_or_else(|_| r#"{"type":"error","message":"serialization failed"}"#.to_string());
    Bytes::from(format!("data: {}\n\n", json))
}

/// Summarize JSON text as server-sent events
#[post("/summarize/stream")]
pub async fn summarize_stream(
    body: web::Json<SummarizeBody>,
    state: web::Data<Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let request = state.direct_request(body.text, body.max_length, body.style.as_deref())?;

    let events = state.summarizer.summarize_stream(&request).await?;
    let frames = events.map(|event| Ok::<_, actix_web::Error>(sse_frame(&event)));

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(frames))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{app_for, test_app, test_state_with, MockLlm, SPEECH};
    use crate::types::ErrorResponse;
    use actix_web::test;
    use std::sync::atomic::Ordering;

    const ARTICLE: &str = "Liverpool won the match 2-1 after a late goal in stoppage time, \
        securing their place at the top of the league table for another week.";

    #[actix_web::test]
    async fn test_summarize_success() {
        let app = test::init_service(test_app(MockLlm::new("This is a test summary."))).await;
        let req = test::TestRequest::post()
            .uri("/summarize")
            .set_json(serde_json::json!({ "text": ARTICLE, "style": "bullet" }))
            .to_request();

        let body: SummaryResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.summary, "This is a test summary.");
        assert_eq!(body.style, summarist_llm::Style::Bullet);
        assert_eq!(body.model, "mock-model");
        assert_eq!(body.summary_length, 5);
        assert_eq!(body.prompt_length, ARTICLE.split_whitespace().count());
        assert!(body.audio_base64.is_none());
    }

    #[actix_web::test]
    async fn test_summarize_with_tts() {
        let app = test::init_service(test_app(MockLlm::new("Narrated summary."))).await;
        let req = test::TestRequest::post()
            .uri("/summarize?tts=true")
            .set_json(serde_json::json!({ "text": ARTICLE }))
            .to_request();

        let body: SummaryResponse = test::call_and_read_body_json(&app, req).await;
        use base64::Engine;
        let audio = base64::engine::general_purpose::STANDARD
            .decode(body.audio_base64.unwrap())
            .unwrap();
        assert_eq!(audio, SPEECH);
    }

    #[actix_web::test]
    async fn test_second_request_is_served_from_cache() {
        let llm = Arc::new(MockLlm::new("Cached."));
        let app = test::init_service(app_for(test_state_with(llm.clone()))).await;

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/summarize")
                .set_json(serde_json::json!({ "text": ARTICLE, "max_length": 100 }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success());
        }
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn test_validation_failures_are_422() {
        let app = test::init_service(test_app(MockLlm::new("unused"))).await;

        let bodies = [
            serde_json::json!({ "text": "too short" }),
            serde_json::json!({ "text": ARTICLE, "style": "haiku" }),
            serde_json::json!({ "text": ARTICLE, "max_length": 10 }),
            serde_json::json!({ "text": ARTICLE, "max_length": -5 }),
            serde_json::json!({ "style": "bullet" }),
        ];

        for body in bodies {
            let req = test::TestRequest::post()
                .uri("/summarize")
                .set_json(&body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status().as_u16(), 422, "{}", body);

            let error: ErrorResponse = test::read_body_json(resp).await;
            assert!(!error.detail.is_empty());
        }
    }

    #[actix_web::test]
    async fn test_provider_failure_is_502() {
        let app = test::init_service(test_app(MockLlm::failing("model overloaded"))).await;
        let req = test::TestRequest::post()
            .uri("/summarize")
            .set_json(serde_json::json!({ "text": ARTICLE }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 502);
        let error: ErrorResponse = test::read_body_json(resp).await;
        assert!(error.detail.contains("model overloaded"));
    }

    #[actix_web::test]
    async fn test_sse_frame_carries_one_json_event() {
        let events = [
            StreamEvent::summary_delta("line one\nline \"two\""),
            StreamEvent::Done,
            StreamEvent::error("upstream said \"no\"\n"),
        ];

        for event in events {
            let frame = sse_frame(&event);
            let frame = std::str::from_utf8(&frame).unwrap();
            let payload = frame
                .strip_prefix("data: ")
                .and_then(|rest| rest.strip_suffix("\n\n"))
                .unwrap();
            assert!(!payload.contains('\n'), "{:?}", frame);
            let parsed: StreamEvent = serde_json::from_str(payload).unwrap();
            assert_eq!(parsed, event);
        }
    }

    #[actix_web::test]
    async fn test_stream_frames() {
        let app = test::init_service(test_app(MockLlm::streaming(vec![
            Ok("Hello"),
            Ok(" world"),
        ])))
        .await;
        let req = test::TestRequest::post()
            .uri("/summarize/stream")
            .set_json(serde_json::json!({ "text": ARTICLE }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/event-stream"
        );

        let body = test::read_body(resp).await;
        let frames: Vec<StreamEvent> = std::str::from_utf8(&body)
            .unwrap()
            .split("\n\n")
            .filter(|frame| !frame.is_empty())
            .map(|frame| serde_json::from_str(frame.strip_prefix("data: ").unwrap()).unwrap())
            .collect();

        assert_eq!(
            frames,
            vec![
                StreamEvent::summary_delta("Hello"),
                StreamEvent::summary_delta(" world"),
                StreamEvent::Done,
            ]
        );
    }

    #[actix_web::test]
    async fn test_stream_midway_failure_ends_with_error_frame() {
        let app = test::init_service(test_app(MockLlm::streaming(vec![
            Ok("Partial"),
            Err("upstream reset"),
        ])))
        .await;
        let req = test::TestRequest::post()
            .uri("/summarize/stream")
            .set_json(serde_json::json!({ "text": ARTICLE }))
            .to_request();

        let body = test::call_and_read_body(&app, req).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.starts_with(r#"data: {"type":"delta","path":"summary","value":"Partial"}"#));
        assert!(text.trim_end().ends_with(r#""}"#));
        assert!(text.contains(r#""type":"error""#));
        assert!(!text.contains(r#""type":"done""#));
    }
}
