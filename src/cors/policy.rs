//! Translation of a [`CorsRule`] into a tower-http [`CorsLayer`].

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::CorsRule;

/// Preflight cache duration used when a rule does not set one.
pub const DEFAULT_MAX_AGE_SECS: u64 = 1800;

/// Build the layer enforcing `rule`.
///
/// Origins are matched exactly. A disallowed origin gets no
/// `Access-Control-Allow-Origin` header; the browser does the rest.
pub fn build_layer(rule: &CorsRule) -> CorsLayer {
    let allow_origin = if rule.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = rule
            .allowed_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        AllowOrigin::list(origins)
    };

    let methods: Vec<Method> = rule
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(methods)
        .allow_headers(Any)
        .max_age(Duration::from_secs(rule.max_age_secs.unwrap_or(DEFAULT_MAX_AGE_SECS)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    fn app(rule: &CorsRule) -> Router {
        Router::new().route("/greeting", get(|| async { "hi" }).layer(build_layer(rule)))
    }

    async fn allow_origin_for(rule: &CorsRule, origin: &str) -> Option<String> {
        let response = app(rule)
            .oneshot(
                Request::builder()
                    .uri("/greeting")
                    .header("origin", origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_allowed_origin_is_reflected() {
        let rule = CorsRule::new("/greeting", &["http://localhost:9000"]);
        assert_eq!(
            allow_origin_for(&rule, "http://localhost:9000").await.as_deref(),
            Some("http://localhost:9000")
        );
    }

    #[tokio::test]
    async fn test_other_origin_gets_no_header() {
        let rule = CorsRule::new("/greeting", &["http://localhost:9000"]);
        assert_eq!(allow_origin_for(&rule, "http://evil.example").await, None);
    }

    #[tokio::test]
    async fn test_wildcard() {
        let rule = CorsRule::new("/greeting", &["*"]);
        assert_eq!(allow_origin_for(&rule, "http://evil.example").await.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn test_preflight() {
        let rule = CorsRule::new("/greeting", &["http://localhost:9000"]);
        let response = app(&rule)
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/greeting")
                    .header("origin", "http://localhost:9000")
                    .header("access-control-request-method", "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_success());
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "http://localhost:9000");
        assert_eq!(headers["access-control-max-age"], "1800");
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("GET"));
    }
}
