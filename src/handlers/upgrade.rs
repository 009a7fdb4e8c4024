use crate::error::{ApiError, ErrorEnvelope};
use crate::extract::ApiJson;
use crate::models::{ApiResponse, ReleaseDetail, UpgradeRequest};
use crate::routes;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};

/// PUT /api/v1/charts/upgrade handler - Upgrade an existing release
#[utoipa::path(
    put,
    path = routes::CHART_UPGRADE,
    request_body = UpgradeRequest,
    responses(
        (status = 200, description = "Release upgraded", body = ApiResponse<ReleaseDetail>),
        (status = 400, description = "Invalid request or unresolvable chart", body = ErrorEnvelope),
        (status = 404, description = "Release not found", body = ErrorEnvelope),
        (status = 500, description = "Engine failure", body = ErrorEnvelope)
    ),
    tag = "charts"
)]
pub async fn upgrade_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UpgradeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReleaseDetail>>), ApiError> {
    req.validate()?;

    let release = state.engine.upgrade(req).await?;

    tracing::info!(
        "Upgraded release {} to revision {}",
        release.name,
        release.version
    );
    Ok((StatusCode::OK, Json(ApiResponse::ok(release))))
}
