use actix_web::{web, HttpResponse, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use counsel_core::Role;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub session_id: String,
    pub messages: Vec<HistoryMessage>,
}

/// Messages the end user is allowed to see, oldest first. Answers 409 rather
/// than waiting while a turn holds the session.
pub async fn handler(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let session_id = path.into_inner();

    let Some(shared) = state.store().get(&session_id).await else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "Session not found",
            "sessionId": session_id
        })));
    };

    // A held lock means a turn is in flight; its log is not settled yet.
    let Ok(session) = shared.try_lock() else {
        log::debug!("[{}] History requested during an active turn", session_id);
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "error": "A turn is in progress for this session",
            "sessionId": session_id
        })));
    };
    let messages = session
        .visible_messages()
        .map(|message| HistoryMessage {
            role: message.role,
            content: message.text(),
            created_at: message.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(HistoryResponse {
        session_id,
        messages,
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    use counsel_core::{Message, SeedContext};

    use crate::server::app_config;
    use crate::test_support::{test_state, ScriptedProvider};

    #[actix_web::test]
    async fn returns_only_visible_messages() {
        let state = test_state(ScriptedProvider::silent());
        let store = state.store().clone();
        store.get_or_create("s1", &SeedContext::default()).await;
        store.append("s1", Message::user("Hi")).await;
        store
            .append("s1", Message::function_result("webSearch", serde_json::json!({"results": []})))
            .await;
        store.append("s1", Message::hidden_user("restated tool result")).await;
        store.append("s1", Message::assistant("Hello!")).await;

        let app = test::init_service(App::new().app_data(state).configure(app_config)).await;
        let req = test::TestRequest::get().uri("/api/v1/history/s1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(body["sessionId"], "s1");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Hi");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], "Hello!");
        assert!(messages[1]["createdAt"].is_string());
    }

    #[actix_web::test]
    async fn busy_session_is_conflict_without_waiting() {
        let state = test_state(ScriptedProvider::silent());
        let store = state.store().clone();
        let shared = store.get_or_create("s1", &SeedContext::default()).await;
        let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

        let guard = shared.lock().await;
        let req = test::TestRequest::get().uri("/api/v1/history/s1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        drop(guard);

        let req = test::TestRequest::get().uri("/api/v1/history/s1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn unknown_session_is_not_found() {
        let state = test_state(ScriptedProvider::silent());
        let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

        let req = test::TestRequest::get().uri("/api/v1/history/missing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
