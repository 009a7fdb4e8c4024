use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ApiError;

fn default_namespace() -> String {
    "default".to_string()
}

/// Parameters for installing a chart as a new release
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallRequest {
    pub release_name: String,
    pub chart_name: String,
    #[serde(rename = "repoURL", skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    #[schema(value_type = Object)]
    pub values: serde_json::Map<String, JsonValue>,
    #[serde(default)]
    pub wait: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub create_namespace: bool,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub client_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InstallRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.release_name.trim().is_empty() {
            return Err(ApiError::Validation(
                "releaseName is required and must be non-empty".to_string(),
            ));
        }
        if self.chart_name.trim().is_empty() {
            return Err(ApiError::Validation(
                "chartName is required and must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters for upgrading an existing release
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRequest {
    #[serde(flatten)]
    pub install: InstallRequest,
    #[serde(default)]
    pub reuse_values: bool,
    #[serde(default)]
    pub reset_values: bool,
    #[serde(default)]
    pub force: bool,
}

impl UpgradeRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        self.install.validate()
    }
}

/// Parameters for uninstalling a release
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UninstallRequest {
    pub release_name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub keep_history: bool,
    #[serde(default)]
    pub wait: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UninstallRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.release_name.trim().is_empty() {
            return Err(ApiError::Validation(
                "releaseName is required and must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters for registering a chart repository
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AddRepositoryRequest {
    pub name: String,
    pub url: String,
}

impl AddRepositoryRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation(
                "name is required and must be non-empty".to_string(),
            ));
        }
        if self.url.trim().is_empty() {
            return Err(ApiError::Validation(
                "url is required and must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Summarized release information, one row of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSummary {
    pub name: String,
    pub namespace: String,
    pub version: i64,
    pub status: String,
    pub last_deployed: String,
    pub chart: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_version: String,
}

/// Detailed release information including values, manifest and notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDetail {
    pub name: String,
    pub namespace: String,
    pub version: i64,
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub first_deployed: String,
    pub last_deployed: String,
    pub chart: String,
    pub chart_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_version: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    #[schema(value_type = Object)]
    pub values: serde_json::Map<String, JsonValue>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub manifest: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

/// One revision in a release's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseHistoryEntry {
    pub revision: i64,
    pub status: String,
    pub chart: String,
    pub chart_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub deployed_at: DateTime<Utc>,
}

/// Outcome of an uninstall, with the engine's confirmation message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UninstallResult {
    pub release_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info: String,
}

/// Uniform response envelope wrapping every endpoint payload
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok_with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Response type for the health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Query parameters for the release listing endpoint
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub namespace: Option<String>,
    pub all_namespaces: Option<bool>,
}

/// Query parameters for single-release endpoints
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct NamespaceQuery {
    pub namespace: Option<String>,
}
