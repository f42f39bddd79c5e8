use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;

use counsel_core::SeedContext;

use crate::state::AppState;

/// Written as the last fragment when a turn fails after streaming has begun.
pub const TURN_FAILURE_FRAGMENT: &str =
    "\n\nSorry, something went wrong while generating a response. Please try again.";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub user_input: String,
    #[serde(default, alias = "userLocation")]
    pub locale: Option<String>,
    #[serde(default, alias = "contractText")]
    pub document_text: Option<String>,
    #[serde(default, alias = "finalReport")]
    pub prior_report: Option<Value>,
}

impl ChatRequest {
    fn seed(&self) -> SeedContext {
        SeedContext {
            locale: self.locale.clone(),
            document_text: self.document_text.clone(),
            prior_report: self.prior_report.clone(),
        }
    }

    fn missing_field(&self) -> Option<&'static str> {
        if self.session_id.trim().is_empty() {
            Some("Missing sessionId")
        } else if self.user_input.trim().is_empty() {
            Some("Missing userInput")
        } else {
            None
        }
    }
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "success": false,
        "error": message
    }))
}

/// Run one turn and stream its answer back as plain text, one body chunk per
/// fragment.
pub async fn handler(state: web::Data<AppState>, req: web::Json<ChatRequest>) -> impl Responder {
    let req = req.into_inner();

    if let Some(message) = req.missing_field() {
        log::warn!("Rejected chat request: {}", message);
        return bad_request(message);
    }

    let session_id = req.session_id.trim().to_string();
    log::info!("[{}] Chat turn requested", session_id);

    let seed = req.seed();
    let orchestrator = state.orchestrator.clone();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let result = orchestrator
            .stream_turn(&session_id, &req.user_input, &seed, |fragment: &str| {
                // The client may already be gone; the turn still completes.
                let _ = tx.send(fragment.to_string());
            })
            .await;

        match result {
            Ok(answer) => {
                log::info!("[{}] Turn complete ({} chars)", session_id, answer.len());
            }
            Err(error) => {
                log::error!("[{}] Turn failed: {}", session_id, error);
                let _ = tx.send(TURN_FAILURE_FRAGMENT.to_string());
            }
        }
    });

    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .append_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(async_stream::stream! {
            while let Some(fragment) = rx.recv().await {
                yield Ok::<_, actix_web::Error>(web::Bytes::from(fragment));
            }
        })
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    use counsel_core::{Message, Role};
    use counsel_llm::{LLMChunk, LLMError};

    use super::*;
    use crate::server::app_config;
    use crate::test_support::{test_state, ScriptedProvider};

    #[actix_web::test]
    async fn streams_fragments_and_commits_answer() {
        let provider = ScriptedProvider::new(vec![vec![
            Ok(LLMChunk::Token("Hello".to_string())),
            Ok(LLMChunk::Token(", world".to_string())),
            Ok(LLMChunk::Done),
        ]]);
        let state = test_state(provider);
        let app = test::init_service(App::new().app_data(state.clone()).configure(app_config)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/chat")
            .set_json(json!({"sessionId": "s1", "userInput": "Hi", "userLocation": "Denver, CO"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );

        let body = test::read_body(resp).await;
        assert_eq!(body, web::Bytes::from_static(b"Hello, world"));

        let shared = state.store().get("s1").await.unwrap();
        let session = shared.lock().await;
        let last: &Message = session.messages.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.text(), "Hello, world");
        assert!(session.messages[0].text().contains("Denver, CO"));
    }

    #[actix_web::test]
    async fn missing_fields_are_rejected_before_streaming() {
        let provider = ScriptedProvider::silent();
        let state = test_state(provider.clone());
        let app = test::init_service(App::new().app_data(state.clone()).configure(app_config)).await;

        for (payload, error) in [
            (json!({"userInput": "Hi"}), "Missing sessionId"),
            (json!({"sessionId": "s1", "userInput": "   "}), "Missing userInput"),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/chat")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], error);
        }

        assert_eq!(provider.request_count(), 0);
        assert!(state.store().is_empty());
    }

    #[actix_web::test]
    async fn provider_failure_ends_with_apology_fragment() {
        let provider = ScriptedProvider::new(vec![vec![
            Ok(LLMChunk::Token("Partial".to_string())),
            Err(LLMError::Stream("connection reset".to_string())),
        ]]);
        let state = test_state(provider);
        let app = test::init_service(App::new().app_data(state.clone()).configure(app_config)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/chat")
            .set_json(json!({"sessionId": "s1", "userInput": "Hi"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text, format!("Partial{TURN_FAILURE_FRAGMENT}"));

        let shared = state.store().get("s1").await.unwrap();
        let session = shared.lock().await;
        assert_eq!(session.messages.last().unwrap().role, Role::User);
    }

    #[actix_web::test]
    async fn cut_off_stream_ends_with_apology_and_commits_nothing() {
        let provider = ScriptedProvider::new(vec![vec![Ok(LLMChunk::Token("Half an".to_string()))]]);
        let state = test_state(provider);
        let app = test::init_service(App::new().app_data(state.clone()).configure(app_config)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/chat")
            .set_json(json!({"sessionId": "s1", "userInput": "Hi"}))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text, format!("Half an{TURN_FAILURE_FRAGMENT}"));

        let shared = state.store().get("s1").await.unwrap();
        let session = shared.lock().await;
        assert!(session.messages.iter().all(|m| m.role != Role::Assistant));
    }

    #[::core::prelude::v1::test]
    fn null_prior_report_is_ignored() {
        let req: ChatRequest = serde_json::from_value(json!({
            "sessionId": "s1",
            "userInput": "Hi",
            "contractText": "Lease",
            "finalReport": null
        }))
        .unwrap();

        let seed = req.seed();
        assert_eq!(seed.document_text.as_deref(), Some("Lease"));
        assert!(seed.prior_report.is_none());
    }
}
