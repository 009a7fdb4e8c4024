use crate::error::{ApiError, ErrorEnvelope};
use crate::models::{ApiResponse, NamespaceQuery, ReleaseDetail};
use crate::routes;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// GET /api/v1/releases/{name}/status handler - Live status of a release
///
/// Reflects the currently-deployed revision as the engine reports it.
#[utoipa::path(
    get,
    path = routes::RELEASE_STATUS,
    params(
        ("name" = String, Path, description = "Release name"),
        NamespaceQuery
    ),
    responses(
        (status = 200, description = "Status retrieved", body = ApiResponse<ReleaseDetail>),
        (status = 404, description = "Release not found", body = ErrorEnvelope),
        (status = 500, description = "Engine failure", body = ErrorEnvelope)
    ),
    tag = "releases"
)]
pub async fn status_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<NamespaceQuery>,
) -> Result<(StatusCode, Json<ApiResponse<ReleaseDetail>>), ApiError> {
    let namespace = query.namespace.as_deref().unwrap_or("default");

    let release = state.engine.get_status(&name, namespace).await?;

    tracing::debug!("Retrieved status of release {}", name);
    Ok((StatusCode::OK, Json(ApiResponse::ok(release))))
}
