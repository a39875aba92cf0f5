pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::schema::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Render hook
        .route("/head", get(handlers::handle_head))
        // Schema settings page
        .route(
            "/api/v1/schema",
            get(handlers::handle_get_schema)
                .put(handlers::handle_save_schema)
                .delete(handlers::handle_clear_schema),
        )
        .route("/api/v1/schema/regenerate", post(handlers::handle_regenerate))
        .route("/api/v1/schema/prompt", get(handlers::handle_prompt_preview))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::credential::ApiCredential;
    use crate::llm_client::LlmClient;
    use crate::menus::store::StaticMenuSource;
    use crate::menus::{NavMenu, NavMenuItem};
    use crate::schema::generator::SchemaGenerator;
    use crate::schema::prior::HomepageFetcher;
    use crate::schema::publisher::Publisher;
    use crate::settings::{disable_competing_renderer, MemorySettingsStore, SettingsStore};

    /// Full stack against a mock completion endpoint; the homepage is unreachable.
    async fn app(
        completion: &MockServer,
        persist_generated: bool,
    ) -> (Router, Arc<MemorySettingsStore>) {
        let settings = Arc::new(MemorySettingsStore::new());
        let menus = Arc::new(StaticMenuSource::new(vec![NavMenu {
            name: "Main".to_string(),
            items: vec![
                NavMenuItem::new(1, 0, "Home"),
                NavMenuItem::new(2, 1, "Services"),
            ],
        }]));
        let prior = Arc::new(HomepageFetcher::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/",
        ));
        let llm = Arc::new(
            LlmClient::with_endpoint(
                ApiCredential::new("sk-test"),
                format!("{}/v1/completions", completion.uri()),
            )
            .unwrap(),
        );
        let generator = Arc::new(SchemaGenerator::new(menus, prior, llm));
        let publisher = Arc::new(Publisher::new(
            settings.clone(),
            generator,
            persist_generated,
        ));
        let state = AppState {
            settings: settings.clone(),
            publisher,
            competing_renderer: "rank_math".to_string(),
        };
        (build_router(state), settings)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn get(router: &Router, uri: &str) -> axum::response::Response {
        router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_head_end_to_end() {
        let completion = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"text": "{\"@type\":\"LocalBusiness\"}"}]
            })))
            .expect(1)
            .mount(&completion)
            .await;
        let (router, _) = app(&completion, false).await;

        let response = get(&router, "/head").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            r#"<script type="application/ld+json">{"@type":"LocalBusiness"}</script>"#
        );

        let requests = completion.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let prompt = sent["prompt"].as_str().unwrap();
        assert!(prompt.contains("```JSON\n{}\n```"));
        assert!(prompt.contains("Main:\n- Home\n- Services\n"));
    }

    #[tokio::test]
    async fn test_head_with_completion_outage_emits_placeholder() {
        let completion = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&completion)
            .await;
        let (router, settings) = app(&completion, true).await;

        let response = get(&router, "/head").await;
        assert_eq!(
            body_string(response).await,
            r#"<script type="application/ld+json">{}</script>"#
        );
        assert_eq!(settings.get(crate::settings::SCHEMA_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_head_serves_saved_schema_without_completion_calls() {
        let completion = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&completion)
            .await;
        let (router, _) = app(&completion, true).await;

        let save = router
            .clone()
            .oneshot(
                Request::put("/api/v1/schema")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"document":"{\"@type\":\"Plumber\"}"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(save.status(), StatusCode::OK);
        let saved: Value = serde_json::from_str(&body_string(save).await).unwrap();
        assert_eq!(saved["state"], "set");

        for _ in 0..2 {
            let response = get(&router, "/head").await;
            assert_eq!(
                body_string(response).await,
                r#"<script type="application/ld+json">{"@type":"Plumber"}</script>"#
            );
        }
    }

    #[tokio::test]
    async fn test_save_rejects_blank_document() {
        let completion = MockServer::start().await;
        let (router, _) = app(&completion, true).await;

        let response = router
            .oneshot(
                Request::put("/api/v1/schema")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"document":"   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_settings_view_reports_state_and_competitor() {
        let completion = MockServer::start().await;
        let (router, settings) = app(&completion, true).await;
        disable_competing_renderer(settings.as_ref(), "rank_math")
            .await
            .unwrap();

        let response = get(&router, "/api/v1/schema").await;
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["state"], "unset");
        assert_eq!(body["key"], "local_business_schema");
        assert_eq!(body["group"], "localbusiness_schema_options");
        assert_eq!(body["competing_renderer_disabled"], true);
    }

    #[tokio::test]
    async fn test_regenerate_stores_and_clear_unsets() {
        let completion = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"text": "{\"name\":\"Acme\"}"}]
            })))
            .mount(&completion)
            .await;
        let (router, _) = app(&completion, false).await;

        let response = router
            .clone()
            .oneshot(
                Request::post("/api/v1/schema/regenerate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["stored"], true);
        assert_eq!(body["document"]["raw_text"], r#"{"name":"Acme"}"#);

        let cleared = router
            .clone()
            .oneshot(Request::delete("/api/v1/schema").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_string(cleared).await).unwrap();
        assert_eq!(body["state"], "unset");
    }

    #[tokio::test]
    async fn test_prompt_preview_makes_no_completion_call() {
        let completion = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&completion)
            .await;
        let (router, _) = app(&completion, true).await;

        let response = get(&router, "/api/v1/schema/prompt").await;
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body["prompt"]
            .as_str()
            .unwrap()
            .contains("### Navigational Menu(s) - To Identify Services\nMain:\n- Home"));
    }
}
