use utoipa::OpenApi;

use crate::error::ErrorEnvelope;
use crate::handlers;
use crate::models::{
    AddRepositoryRequest, HealthResponse, InstallRequest, ReleaseDetail, ReleaseHistoryEntry,
    ReleaseSummary, UninstallRequest, UninstallResult, UpgradeRequest,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "helm-gateway API",
        version = "1.0.0",
        description = "REST API gateway for managing Helm releases on Kubernetes"
    ),
    paths(
        handlers::health::health_handler,
        handlers::install::install_handler,
        handlers::upgrade::upgrade_handler,
        handlers::uninstall::uninstall_handler,
        handlers::list::list_releases_handler,
        handlers::get::get_release_handler,
        handlers::history::history_handler,
        handlers::status::status_handler,
        handlers::repo::add_repository_handler
    ),
    components(
        schemas(
            InstallRequest,
            UpgradeRequest,
            UninstallRequest,
            AddRepositoryRequest,
            ReleaseSummary,
            ReleaseDetail,
            ReleaseHistoryEntry,
            UninstallResult,
            HealthResponse,
            ErrorEnvelope
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "charts", description = "Chart install, upgrade and uninstall"),
        (name = "releases", description = "Release inspection"),
        (name = "repositories", description = "Chart repository registration")
    )
)]
pub struct ApiDoc;
