use crate::error::{ApiError, ErrorEnvelope};
use crate::helm::HISTORY_MAX;
use crate::models::{ApiResponse, NamespaceQuery, ReleaseHistoryEntry};
use crate::routes;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// GET /api/v1/releases/{name}/history handler - Release revision history
///
/// Capped at the most recent 256 revisions regardless of how many the
/// engine reports.
#[utoipa::path(
    get,
    path = routes::RELEASE_HISTORY,
    params(
        ("name" = String, Path, description = "Release name"),
        NamespaceQuery
    ),
    responses(
        (status = 200, description = "History retrieved", body = ApiResponse<Vec<ReleaseHistoryEntry>>),
        (status = 404, description = "Release not found", body = ErrorEnvelope),
        (status = 500, description = "Engine failure", body = ErrorEnvelope)
    ),
    tag = "releases"
)]
pub async fn history_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<NamespaceQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ReleaseHistoryEntry>>>), ApiError> {
    let namespace = query.namespace.as_deref().unwrap_or("default");

    let mut history = state.engine.get_history(&name, namespace).await?;
    history.truncate(HISTORY_MAX);

    tracing::debug!("Retrieved {} history entries for {}", history.len(), name);
    Ok((StatusCode::OK, Json(ApiResponse::ok(history))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::helm::{EngineError, MockHelmEngine};
    use axum::{Router, body::Body, http::Request, routing::get};
    use chrono::{DateTime, Utc};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app(engine: MockHelmEngine) -> Router {
        let config = Config {
            in_cluster: false,
            kubeconfig: "/tmp/test-kubeconfig".to_string(),
            helm_driver: None,
            registry_url: None,
            helm_bin: "helm".to_string(),
            service_port: 3000,
            service_host: "0.0.0.0".to_string(),
        };

        let state = AppState {
            engine: Arc::new(engine),
            config: Arc::new(config),
        };

        Router::new()
            .route(crate::routes::RELEASE_HISTORY, get(history_handler))
            .with_state(state)
    }

    fn entry(revision: i64) -> ReleaseHistoryEntry {
        ReleaseHistoryEntry {
            revision,
            status: "superseded".to_string(),
            chart: "nginx".to_string(),
            chart_version: "1.2.3".to_string(),
            app_version: "1.16.0".to_string(),
            description: "Upgrade complete".to_string(),
            deployed_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn test_history_success() {
        let mut engine = MockHelmEngine::new();
        engine
            .expect_get_history()
            .withf(|name, namespace| name == "web" && namespace == "default")
            .times(1)
            .returning(|_, _| Ok(vec![entry(1), entry(2)]));

        let response = test_app(engine)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/releases/web/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let envelope: ApiResponse<Vec<ReleaseHistoryEntry>> =
            serde_json::from_slice(&body).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_history_caps_at_256_entries() {
        let mut engine = MockHelmEngine::new();
        engine
            .expect_get_history()
            .times(1)
            .returning(|_, _| Ok((1..=300).map(entry).collect()));

        let response = test_app(engine)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/releases/web/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let envelope: ApiResponse<Vec<ReleaseHistoryEntry>> =
            serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.data.unwrap().len(), 256);
    }

    #[tokio::test]
    async fn test_history_missing_release_maps_to_404() {
        let mut engine = MockHelmEngine::new();
        engine.expect_get_history().times(1).returning(|_, _| {
            Err(EngineError::ReleaseNotFound(
                "release: not found".to_string(),
            ))
        });

        let response = test_app(engine)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/releases/missing/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
