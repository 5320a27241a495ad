use axum::{
    Router,
    http::{
        HeaderValue,
        header::{
            CACHE_CONTROL, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
            X_XSS_PROTECTION,
        },
    },
    routing::get,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use super::{handlers, state::AppState};
use crate::prompts::PromptSource;

/// Directory data changes at most daily, so clients and CDNs may keep it for an hour
static API_CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=3600";

/// Build the complete Axum router with all routes and middleware.
pub fn build_router<S: PromptSource + 'static>(state: AppState<S>) -> Router {
    let api = Router::new()
        .route("/trending", get(handlers::trending::<S>))
        .route("/prompts", get(handlers::list_prompts::<S>))
        .route("/prompts/{id}", get(handlers::get_prompt::<S>))
        .route("/categories", get(handlers::list_categories::<S>))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(API_CACHE_CONTROL),
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            REFERRER_POLICY,
            HeaderValue::from_static("origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::{future::Future, sync::Arc};

    use axum::{
        body::Body,
        http::{Request, Response, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::prompts::{PromptItem, tests::prompt};
    use crate::trending::{Clock, clock::tests::FixedClock, server_trending};

    struct StaticSource(Arc<Vec<PromptItem>>);

    impl PromptSource for StaticSource {
        fn prompts(&self) -> impl Future<Output = Arc<Vec<PromptItem>>> + Send {
            let prompts = Arc::clone(&self.0);
            async move { prompts }
        }
    }

    fn collection() -> Vec<PromptItem> {
        let mut items: Vec<PromptItem> = (1..=20)
            .map(|id| {
                let category = if id % 2 == 0 { "Code Review" } else { "Writing" };
                prompt(id, &format!("Prompt {id}"), category)
            })
            .collect();
        items[4].skills = vec!["Rust".to_string()];
        items
    }

    fn app() -> Router {
        let clock = Arc::new(FixedClock::at(2024, 1, 15, 10));
        build_router(AppState::new(StaticSource(Arc::new(collection())), clock))
    }

    async fn get(uri: &str) -> Response<Body> {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ids(body: &Value) -> Vec<u64> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_u64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn security_headers_everywhere() {
        for uri in ["/health", "/api/trending", "/missing"] {
            let response = get(uri).await;
            let headers = response.headers();
            assert_eq!(headers["x-content-type-options"], "nosniff", "{uri}");
            assert_eq!(headers["x-frame-options"], "DENY", "{uri}");
            assert_eq!(headers["x-xss-protection"], "1; mode=block", "{uri}");
            assert_eq!(headers["referrer-policy"], "origin-when-cross-origin", "{uri}");
        }
    }

    #[tokio::test]
    async fn cache_control_only_on_api() {
        let response = get("/api/categories").await;
        assert_eq!(response.headers()["cache-control"], API_CACHE_CONTROL);

        let response = get("/health").await;
        assert!(response.headers().get("cache-control").is_none());
    }

    #[tokio::test]
    async fn trending_matches_the_daily_selection() {
        let response = get("/api/trending").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        let now = FixedClock::at(2024, 1, 15, 10).now();
        let expected: Vec<u64> = server_trending(&collection(), now)
            .iter()
            .map(|item| item.id as u64)
            .collect();
        assert_eq!(ids(&body), expected);
        assert_eq!(ids(&body), vec![6, 3, 4, 15, 17, 19, 1, 12, 2]);
    }

    #[tokio::test]
    async fn prompts_filter_by_category_and_query() {
        let body = json(get("/api/prompts").await).await;
        assert_eq!(ids(&body).len(), 20);

        let body = json(get("/api/prompts?category=code-review").await).await;
        assert_eq!(ids(&body).len(), 10);
        assert!(ids(&body).iter().all(|id| id % 2 == 0));

        let body = json(get("/api/prompts?q=rust").await).await;
        assert_eq!(ids(&body), vec![5]);

        let body = json(get("/api/prompts?category=code-review&q=rust").await).await;
        assert!(ids(&body).is_empty());

        let body = json(get("/api/prompts?category=all&q=prompt%201").await).await;
        assert_eq!(ids(&body), vec![1, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19]);
    }

    #[tokio::test]
    async fn prompt_by_id() {
        let response = get("/api/prompts/7").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["title"], "Prompt 7");

        let response = get("/api/prompts/99").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["error"], "Prompt not found: 99");
    }

    #[tokio::test]
    async fn malformed_id_is_rejected() {
        let response = get("/api/prompts/abc").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = json(response).await;
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(body["error"].as_str().unwrap().starts_with("Bad request: "));

        let response = get("/api/prompts/-1").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn categories_start_with_all() {
        let body = json(get("/api/categories").await).await;
        let categories = body.as_array().unwrap();
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[0]["id"], "all");
        assert_eq!(categories[0]["count"], 20);
        assert_eq!(categories[1]["id"], "writing");
        assert_eq!(categories[2]["id"], "code-review");
        assert_eq!(categories[2]["count"], 10);
    }

    #[tokio::test]
    async fn unknown_routes_are_json_404s() {
        let response = get("/api/nothing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["code"], "ROUTE_NOT_FOUND");
    }
}
