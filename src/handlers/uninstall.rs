use crate::error::{ApiError, ErrorEnvelope};
use crate::extract::ApiJson;
use crate::models::{ApiResponse, UninstallRequest, UninstallResult};
use crate::routes;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};

/// DELETE /api/v1/charts/uninstall handler - Uninstall a release
#[utoipa::path(
    delete,
    path = routes::CHART_UNINSTALL,
    request_body = UninstallRequest,
    responses(
        (status = 200, description = "Release uninstalled", body = ApiResponse<UninstallResult>),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 404, description = "Release not found", body = ErrorEnvelope),
        (status = 500, description = "Engine failure", body = ErrorEnvelope)
    ),
    tag = "charts"
)]
pub async fn uninstall_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UninstallRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UninstallResult>>), ApiError> {
    req.validate()?;

    let result = state.engine.uninstall(req).await?;

    tracing::info!("Uninstalled release {}", result.release_name);
    Ok((StatusCode::OK, Json(ApiResponse::ok(result))))
}
