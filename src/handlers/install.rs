use crate::error::{ApiError, ErrorEnvelope};
use crate::extract::ApiJson;
use crate::models::{ApiResponse, InstallRequest, ReleaseDetail};
use crate::routes;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};

/// POST /api/v1/charts/install handler - Install a chart as a new release
#[utoipa::path(
    post,
    path = routes::CHART_INSTALL,
    request_body = InstallRequest,
    responses(
        (status = 200, description = "Chart installed", body = ApiResponse<ReleaseDetail>),
        (status = 400, description = "Invalid request or unresolvable chart", body = ErrorEnvelope),
        (status = 500, description = "Engine failure", body = ErrorEnvelope)
    ),
    tag = "charts"
)]
pub async fn install_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<InstallRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReleaseDetail>>), ApiError> {
    req.validate()?;

    let release = state.engine.install(req).await?;

    tracing::info!(
        "Installed release {} in namespace {}",
        release.name,
        release.namespace
    );
    Ok((StatusCode::OK, Json(ApiResponse::ok(release))))
}
