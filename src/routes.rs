// Route path constants - single source of truth for all API paths

use axum::{
    Router,
    extract::ConnectInfo,
    routing::{delete, get, post, put},
};
use std::net::SocketAddr;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

pub const HEALTH: &str = "/api/v1/health";
pub const CHART_INSTALL: &str = "/api/v1/charts/install";
pub const CHART_UPGRADE: &str = "/api/v1/charts/upgrade";
pub const CHART_UNINSTALL: &str = "/api/v1/charts/uninstall";
pub const RELEASES: &str = "/api/v1/releases";
pub const RELEASE: &str = "/api/v1/releases/{name}";
pub const RELEASE_HISTORY: &str = "/api/v1/releases/{name}/history";
pub const RELEASE_STATUS: &str = "/api/v1/releases/{name}/status";
pub const REPOSITORIES: &str = "/api/v1/repositories";

/// Assemble the application router: all routes, the Swagger UI, and a
/// request-logging layer recording method, path and caller address.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH, get(handlers::health_handler))
        .route(CHART_INSTALL, post(handlers::install_handler))
        .route(CHART_UPGRADE, put(handlers::upgrade_handler))
        .route(CHART_UNINSTALL, delete(handlers::uninstall_handler))
        .route(RELEASES, get(handlers::list_releases_handler))
        .route(RELEASE, get(handlers::get_release_handler))
        .route(RELEASE_HISTORY, get(handlers::history_handler))
        .route(RELEASE_STATUS, get(handlers::status_handler))
        .route(REPOSITORIES, post(handlers::add_repository_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let client = request
                        .extensions()
                        .get::<ConnectInfo<SocketAddr>>()
                        .map(|ConnectInfo(addr)| addr.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        client = %client
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
