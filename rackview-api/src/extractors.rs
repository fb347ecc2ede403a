//! Custom extractors that reject with `ApiError`.
//!
//! `PathId<T>` parses an integer path parameter into a typed entity id.
//! `ApiJson<T>` and `ApiQuery<T>` wrap `axum::Json` and `axum::extract::Query`
//! so malformed bodies and query strings come back as the standard JSON
//! error envelope with status 400.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path},
    http::request::Parts,
};
use rackview_core::EntityIdType;

use crate::error::ApiError;

/// Extractor for type-safe entity IDs from a single path parameter.
///
/// ```rust,ignore
/// async fn get_rack(PathId(rack_id): PathId<RackId>) -> ApiResult<Json<Rack>> {
///     // rack_id is RackId, not i32
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathId<T: EntityIdType>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathId<T>
where
    S: Send + Sync,
    T: EntityIdType,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state).await?;

        raw.parse::<i32>()
            .map(|id| PathId(T::new(id)))
            .map_err(|_| {
                ApiError::invalid_format("id", "an integer").with_details(serde_json::json!({
                    "entity_type": T::ENTITY_NAME,
                    "path_param": raw,
                }))
            })
    }
}

/// JSON body extractor whose rejection is an `ApiError`.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejection is an `ApiError`.
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
    use rackview_core::RackId;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route(
            "/racks/:id",
            get(|PathId(id): PathId<RackId>| async move { id.to_string() }),
        )
    }

    async fn call(uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_path_id_parses_integer() {
        let (status, body) = call("/racks/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "42");
    }

    #[tokio::test]
    async fn test_path_id_rejects_non_integer() {
        let (status, body) = call("/racks/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let error: ApiError = serde_json::from_str(&body).unwrap();
        assert_eq!(error.code, crate::error::ErrorCode::InvalidFormat);
        assert_eq!(
            error.details.as_ref().and_then(|d| d.get("entity_type")),
            Some(&serde_json::json!("Rack"))
        );
    }
}
