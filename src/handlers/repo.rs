use crate::error::{ApiError, ErrorEnvelope};
use crate::extract::ApiJson;
use crate::models::{AddRepositoryRequest, ApiResponse};
use crate::routes;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value as JsonValue;

/// POST /api/v1/repositories handler - Register a chart repository
///
/// Registration eagerly downloads the repository index so resolution
/// failures surface here rather than on the first install.
#[utoipa::path(
    post,
    path = routes::REPOSITORIES,
    request_body = AddRepositoryRequest,
    responses(
        (status = 200, description = "Repository registered", body = ApiResponse<JsonValue>),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 500, description = "Repository failure", body = ErrorEnvelope)
    ),
    tag = "repositories"
)]
pub async fn add_repository_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AddRepositoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<JsonValue>>), ApiError> {
    req.validate()?;

    state.engine.add_repository(&req.name, &req.url).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok_with_message(format!(
            "repository {} added",
            req.name
        ))),
    ))
}
