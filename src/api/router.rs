use axum::{Router, http::HeaderValue, middleware, routing::get};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::v1;
use crate::infrastructure::observability::{PrometheusMetrics, create_metrics_router};

/// Optional surfaces of the HTTP router
#[derive(Clone, Default)]
pub struct RouterOptions {
    /// Prometheus handle and the path it is served on
    pub metrics: Option<(PrometheusMetrics, String)>,
    /// Browser origins allowed by CORS; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Create the full router with application state
pub fn create_router(state: AppState, options: RouterOptions) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api", v1::create_v1_router())
        .nest("/v1", v1::create_v1_router())
        .with_state(state);

    if let Some((metrics, path)) = options.metrics {
        router = router.merge(create_metrics_router(metrics, &path));
    }

    let router = router
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    match cors_layer(&options.cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;

    fn app() -> Router {
        let state = crate::create_app_state(&AppConfig::default()).unwrap();
        create_router(state, RouterOptions::default())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let app = app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let (status, _) = send(&app, "GET", "/live", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_without_sources() {
        let app = app();

        let (status, body) = send(&app, "GET", "/api/status", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "no_index");
        assert_eq!(body["total_documents"], 0);
        assert_eq!(body["index_loaded"], false);

        let (status, body) = send(&app, "GET", "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn test_register_and_duplicate_name() {
        let app = app();
        let source = json!({"id": "docs", "name": "Docs", "type": "document"});

        let (status, body) = send(&app, "POST", "/api/sources", Some(source.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "configured");
        assert_eq!(body["version"], 0);

        let duplicate = json!({"id": "docs-2", "name": "Docs", "type": "document"});
        let (status, body) = send(&app, "POST", "/v1/sources", Some(duplicate)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");

        let (_, body) = send(&app, "GET", "/api/sources", None).await;
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_unknown_source_is_not_found() {
        let app = app();

        let (status, body) = send(&app, "GET", "/api/sources/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found_error");

        let (status, _) = send(&app, "POST", "/api/sources/missing/build", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_requests() {
        let app = app();

        let (status, body) = send(&app, "POST", "/api/search", Some(json!({"query": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");

        let (status, body) =
            send(&app, "POST", "/api/search", Some(json!({"query": "x", "top_k": "five"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "json_parse_error");

        let (status, _) = send(&app, "GET", "/api/builds/not-a-job", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_build_then_search() {
        let app = app();

        send(
            &app,
            "POST",
            "/api/sources",
            Some(json!({"id": "docs", "name": "Docs", "type": "document"})),
        )
        .await;
        send(
            &app,
            "POST",
            "/api/sources",
            Some(json!({"id": "mail", "name": "Mail", "type": "email"})),
        )
        .await;

        let documents = json!({"documents": [
            {"id": "plan", "content": "The release deadline is Friday", "title": "Plan"},
            {"id": "notes", "content": "Lunch menu for the offsite"}
        ]});
        let (status, body) = send(&app, "POST", "/api/sources/docs/documents", Some(documents)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["document_count"], 2);

        let (status, body) = send(&app, "POST", "/api/sources/docs/build", None).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let job_id = body["job_id"].as_str().unwrap().to_string();

        let uri = format!("/api/sources/docs/build/{}", job_id);
        let mut last = 0.0;
        let mut stage = Value::Null;
        for _ in 0..500 {
            let (status, body) = send(&app, "GET", &uri, None).await;
            assert_eq!(status, StatusCode::OK);

            let progress = body["progress_percent"].as_f64().unwrap();
            assert!(progress >= last);
            last = progress;

            stage = body["stage"].clone();
            if body["status"] != "processing" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(stage, "COMPLETED");

        let (_, body) = send(&app, "GET", &format!("/api/indices/create/{}/progress", job_id), None).await;
        assert_eq!(body["status"], "completed");
        assert_eq!(body["progress"], 100);

        let query = json!({"query": "deadline", "top_k": 5, "sources": ["email", "document"]});
        let (status, body) = send(&app, "POST", "/v1/search", Some(query)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sources_queried"], 1);

        let results = body["results"].as_array().unwrap();
        assert!(!results.is_empty() && results.len() <= 5);
        for hit in results {
            assert_eq!(hit["source"], "document");
            let score = hit["score"].as_f64().unwrap();
            assert!((0.0..=1.0).contains(&score));
        }

        let (_, body) = send(&app, "GET", "/api/indices", None).await;
        assert_eq!(body["indices"][0]["name"], "docs");
        assert_eq!(body["sources"].as_array().unwrap().len(), 2);

        let (_, body) = send(&app, "GET", "/api/status", None).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["ready_sources"], 1);
    }

    #[test]
    fn test_cors_layer_selection() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["*".to_string()]).is_some());
        assert!(cors_layer(&["http://localhost:3000".to_string()]).is_some());
    }
}
