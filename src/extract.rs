use axum::{
    body::to_bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Strict JSON body extractor enforcing the request-body contract: a
/// present content-type must contain `application/json` (an absent header
/// is accepted), an empty body is rejected, and parse failures are
/// rejected, all as 400 envelopes.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(CONTENT_TYPE) {
            let value = content_type.to_str().unwrap_or("");
            if !value.contains("application/json") {
                return Err(ApiError::Validation(
                    "content-type header is not application/json".to_string(),
                ));
            }
        }

        let bytes = to_bytes(req.into_body(), BODY_LIMIT)
            .await
            .map_err(|e| ApiError::Validation(format!("failed to read request body: {}", e)))?;

        if bytes.is_empty() {
            return Err(ApiError::Validation("request body is empty".to_string()));
        }

        let value = serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::Validation(format!("request body contains invalid JSON: {}", e))
        })?;

        Ok(ApiJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request as HttpRequest, http::StatusCode, routing::post};
    use serde_json::Value as JsonValue;
    use tower::ServiceExt;

    use crate::error::ErrorEnvelope;

    async fn echo_handler(ApiJson(value): ApiJson<JsonValue>) -> axum::Json<JsonValue> {
        axum::Json(value)
    }

    fn test_app() -> Router {
        Router::new().route("/echo", post(echo_handler))
    }

    async fn error_message(response: axum::response::Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert!(!envelope.success);
        envelope.message
    }

    #[tokio::test]
    async fn test_valid_json_body_accepted() {
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"a":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_content_type_rejected_regardless_of_body() {
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "text/plain")
                    .body(Body::from(r#"{"a":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let message = error_message(response).await;
        assert!(message.contains("content-type"));
    }

    #[tokio::test]
    async fn test_json_content_type_with_charset_accepted() {
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json; charset=utf-8")
                    .body(Body::from(r#"{"a":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_absent_content_type_accepted() {
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::from(r#"{"a":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_body_rejected() {
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let message = error_message(response).await;
        assert!(message.contains("empty"));
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json")
                    .body(Body::from("{invalid json}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let message = error_message(response).await;
        assert!(message.contains("invalid JSON"));
    }
}
