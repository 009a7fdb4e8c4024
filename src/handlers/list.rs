use crate::error::{ApiError, ErrorEnvelope};
use crate::models::{ApiResponse, ListQuery, ReleaseSummary};
use crate::routes;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

/// GET /api/v1/releases handler - List releases
///
/// Ordering is whatever the engine reports; callers must treat the sequence
/// as unordered. An empty namespace yields an empty list, not an error.
#[utoipa::path(
    get,
    path = routes::RELEASES,
    params(ListQuery),
    responses(
        (status = 200, description = "Releases listed", body = ApiResponse<Vec<ReleaseSummary>>),
        (status = 500, description = "Engine failure", body = ErrorEnvelope)
    ),
    tag = "releases"
)]
pub async fn list_releases_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ReleaseSummary>>>), ApiError> {
    let namespace = query.namespace.as_deref().unwrap_or("default");
    let all_namespaces = query.all_namespaces.unwrap_or(false);

    let releases = state
        .engine
        .list_releases(namespace, all_namespaces)
        .await?;

    tracing::debug!("Listed {} releases", releases.len());
    Ok((StatusCode::OK, Json(ApiResponse::ok(releases))))
}
