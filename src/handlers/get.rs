use crate::error::{ApiError, ErrorEnvelope};
use crate::models::{ApiResponse, NamespaceQuery, ReleaseDetail};
use crate::routes;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// GET /api/v1/releases/{name} handler - Retrieve a release
#[utoipa::path(
    get,
    path = routes::RELEASE,
    params(
        ("name" = String, Path, description = "Release name"),
        NamespaceQuery
    ),
    responses(
        (status = 200, description = "Release found", body = ApiResponse<ReleaseDetail>),
        (status = 404, description = "Release not found", body = ErrorEnvelope),
        (status = 500, description = "Engine failure", body = ErrorEnvelope)
    ),
    tag = "releases"
)]
pub async fn get_release_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<NamespaceQuery>,
) -> Result<(StatusCode, Json<ApiResponse<ReleaseDetail>>), ApiError> {
    let namespace = query.namespace.as_deref().unwrap_or("default");

    let release = state.engine.get_release(&name, namespace).await?;

    tracing::debug!("Retrieved release {} in namespace {}", name, namespace);
    Ok((StatusCode::OK, Json(ApiResponse::ok(release))))
}
