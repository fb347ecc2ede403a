//! REST API Routes Module
//!
//! Route handlers organized by entity type, plus the top-level router that
//! wires them together with CORS, request tracing, and the single-page app.
//!
//! Layout:
//! - `/api/racks`, `/api/devices`, `/api/network/connections`
//! - `/health/*` (service health)
//! - `/openapi.json`
//! - `/static/*` from the frontend build, and `index.html` for every other path

pub mod connection;
pub mod device;
pub mod health;
pub mod rack;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{OriginalUri, Request},
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    Router,
};
use rackview_storage::InventoryStore;
use tower::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::HealthProbe;

// Re-export route creation functions for convenience
pub use connection::create_router as connection_router;
pub use device::create_router as device_router;
pub use health::create_router as health_router;
pub use rack::create_router as rack_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
#[cfg(feature = "openapi")]
async fn openapi_json() -> impl IntoResponse {
    use utoipa::OpenApi;
    axum::Json(crate::openapi::ApiDoc::openapi())
}

// ============================================================================
// FALLBACK
// ============================================================================

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

fn no_route(method: &Method, path: &str) -> Response {
    ApiError::not_found(format!("no route for {} {}", method, path)).into_response()
}

/// Fallback of the `/api` tree.
async fn api_not_found(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    no_route(&method, uri.path())
}

/// Unknown API paths get a JSON 404; everything else is client-side routing
/// and gets the SPA entry point.
async fn spa_fallback(index_path: PathBuf, req: Request) -> Response {
    if is_api_path(req.uri().path()) {
        return no_route(req.method(), req.uri().path());
    }
    match ServeFile::new(index_path).oneshot(req).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

// ============================================================================
// CORS
// ============================================================================

/// Build the CORS layer. An empty origin list allows any origin.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricted origins");
        cors.allow_origin(parse_cors_origins(&config.cors_origins))
    }
}

/// Configured origins that are valid header values. The rest are logged and
/// skipped.
fn parse_cors_origins(origins: &[String]) -> Vec<HeaderValue> {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = ?origin, error = %e, "CORS: ignoring invalid origin");
                None
            }
        })
        .collect();

    if parsed.is_empty() && !origins.is_empty() {
        tracing::warn!(
            configured = origins.len(),
            "CORS: none of the configured origins is valid, cross-origin requests will be refused"
        );
    }
    parsed
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the complete application router.
pub fn create_api_router(
    store: Arc<dyn InventoryStore>,
    config: &ApiConfig,
) -> ApiResult<Router> {
    let probe = HealthProbe::from_config(config)?;

    let api_routes = Router::new()
        .nest("/racks", rack::create_router(store.clone()))
        .nest("/devices", device::create_router(store.clone(), probe))
        .nest("/network/connections", connection::create_router(store.clone()))
        .fallback(api_not_found);

    let index_path = config.index_path.clone();

    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::create_router(store))
        .nest_service("/static", ServeDir::new(config.static_assets_dir()));

    #[cfg(feature = "openapi")]
    {
        router = router.route("/openapi.json", axum::routing::get(openapi_json));
    }

    let router = router
        .fallback(move |req: Request| spa_fallback(index_path.clone(), req))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config));

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use rackview_storage::MockStorage;

    fn frontend_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "rackview-spa-{}-{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(dir.join("static")).unwrap();
        std::fs::write(dir.join("index.html"), "<html>rackview</html>").unwrap();
        std::fs::write(dir.join("static").join("app.js"), "console.log(1)").unwrap();
        dir
    }

    fn app(tag: &str) -> Router {
        app_with_origins(tag, ApiConfig::default().cors_origins)
    }

    fn app_with_origins(tag: &str, cors_origins: Vec<String>) -> Router {
        let dir = frontend_dir(tag);
        let config = ApiConfig {
            index_path: dir.join("index.html"),
            static_path: dir,
            cors_origins,
            ..ApiConfig::default()
        };
        create_api_router(Arc::new(MockStorage::new()), &config).unwrap()
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/racks")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_is_api_path() {
        assert!(is_api_path("/api"));
        assert!(is_api_path("/api/nope"));
        assert!(!is_api_path("/apiary"));
        assert!(!is_api_path("/racks/3"));
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_json_404() {
        let response = app("api404")
            .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["code"], "ENTITY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_client_routes_serve_index() {
        let response = app("index")
            .oneshot(Request::builder().uri("/racks/3").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<html>rackview</html>");
    }

    #[tokio::test]
    async fn test_static_assets_are_served() {
        let response = app("static")
            .oneshot(
                Request::builder()
                    .uri("/static/app.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "console.log(1)");
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_dev_server() {
        let response = app("cors")
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/racks")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:5173"
        );
    }

    #[test]
    fn test_invalid_cors_origins_are_skipped() {
        let origins = vec![
            "https://racks.example".to_string(),
            "https://bad.example\n".to_string(),
        ];
        let parsed = parse_cors_origins(&origins);
        assert_eq!(parsed, vec![HeaderValue::from_static("https://racks.example")]);

        let all_bad = vec!["\u{7f}".to_string()];
        assert!(parse_cors_origins(&all_bad).is_empty());
    }

    #[tokio::test]
    async fn test_valid_origin_survives_invalid_neighbour() {
        let origins = vec![
            "bad\norigin".to_string(),
            "https://racks.example".to_string(),
        ];

        let response = app_with_origins("cors-mixed", origins.clone())
            .oneshot(preflight("https://racks.example"))
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://racks.example"
        );

        let response = app_with_origins("cors-other", origins)
            .oneshot(preflight("https://elsewhere.example"))
            .await
            .unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
