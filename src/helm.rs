use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::config::Config;
use crate::models::{
    InstallRequest, ReleaseDetail, ReleaseHistoryEntry, ReleaseSummary, UninstallRequest,
    UninstallResult, UpgradeRequest,
};

/// Upper bound on history entries returned for a release.
pub const HISTORY_MAX: usize = 256;

/// Slack added on top of a caller-supplied timeout before the subprocess is
/// abandoned; the engine enforces the exact timeout itself via `--timeout`.
const TIMEOUT_GRACE: Duration = Duration::from_secs(30);

/// Engine failure taxonomy
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("release not found: {0}")]
    ReleaseNotFound(String),
    #[error("failed to resolve chart: {0}")]
    ChartResolution(String),
    #[error("cluster configuration error: {0}")]
    Configuration(String),
    #[error("repository error: {0}")]
    Repository(String),
    #[error("helm operation failed: {0}")]
    Engine(String),
}

/// The package-manager engine behind the API
///
/// One method per supported operation; the production implementation drives
/// the `helm` binary, tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HelmEngine: Send + Sync {
    async fn install(&self, req: InstallRequest) -> Result<ReleaseDetail, EngineError>;

    async fn upgrade(&self, req: UpgradeRequest) -> Result<ReleaseDetail, EngineError>;

    async fn uninstall(&self, req: UninstallRequest) -> Result<UninstallResult, EngineError>;

    async fn list_releases(
        &self,
        namespace: &str,
        all_namespaces: bool,
    ) -> Result<Vec<ReleaseSummary>, EngineError>;

    async fn get_release(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<ReleaseDetail, EngineError>;

    async fn get_history(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Vec<ReleaseHistoryEntry>, EngineError>;

    async fn get_status(&self, name: &str, namespace: &str) -> Result<ReleaseDetail, EngineError>;

    async fn add_repository(&self, name: &str, url: &str) -> Result<(), EngineError>;
}

/// Engine implementation backed by the `helm` CLI
///
/// Every request invokes a fresh subprocess scoped to its target namespace;
/// nothing is shared across requests beyond the immutable bootstrap config.
/// The child is spawned with `kill_on_drop`, so an aborted HTTP request
/// cancels the in-flight engine operation.
pub struct HelmCli {
    config: Arc<Config>,
}

impl HelmCli {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Namespace and cluster-connection flags shared by all operations.
    /// In-cluster mode relies on the pod service account; otherwise the
    /// engine is pointed at the configured kubeconfig.
    fn connection_args(&self, namespace: Option<&str>) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(namespace) = namespace {
            args.push("--namespace".to_string());
            args.push(namespace.to_string());
        }
        if !self.config.in_cluster && !self.config.kubeconfig.is_empty() {
            args.push("--kubeconfig".to_string());
            args.push(self.config.kubeconfig.clone());
        }
        args
    }

    fn install_args(&self, req: &InstallRequest, values_file: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "install".to_string(),
            req.release_name.clone(),
            req.chart_name.clone(),
            "--output".to_string(),
            "json".to_string(),
        ];
        args.extend(self.connection_args(Some(&req.namespace)));
        if req.wait {
            args.push("--wait".to_string());
        }
        if req.create_namespace {
            args.push("--create-namespace".to_string());
        }
        if req.client_only {
            args.push("--dry-run=client".to_string());
        } else if req.dry_run {
            args.push("--dry-run".to_string());
        }
        if let Some(timeout) = req.timeout.filter(|t| *t > 0) {
            args.push("--timeout".to_string());
            args.push(format!("{}s", timeout));
        }
        if let Some(description) = &req.description {
            args.push("--description".to_string());
            args.push(description.clone());
        }
        if let Some(repo_url) = &req.repo_url {
            args.push("--repo".to_string());
            args.push(repo_url.clone());
            if let Some(version) = &req.version {
                args.push("--version".to_string());
                args.push(version.clone());
            }
        }
        if let Some(path) = values_file {
            args.push("--values".to_string());
            args.push(path.to_string_lossy().into_owned());
        }
        args
    }

    // Upgrade forwards the install fields minus createNamespace/clientOnly,
    // which only apply to first installs.
    fn upgrade_args(&self, req: &UpgradeRequest, values_file: Option<&Path>) -> Vec<String> {
        let install = &req.install;
        let mut args = vec![
            "upgrade".to_string(),
            install.release_name.clone(),
            install.chart_name.clone(),
            "--output".to_string(),
            "json".to_string(),
        ];
        args.extend(self.connection_args(Some(&install.namespace)));
        if install.wait {
            args.push("--wait".to_string());
        }
        if install.dry_run {
            args.push("--dry-run".to_string());
        }
        if req.reuse_values {
            args.push("--reuse-values".to_string());
        }
        if req.reset_values {
            args.push("--reset-values".to_string());
        }
        if req.force {
            args.push("--force".to_string());
        }
        if let Some(timeout) = install.timeout.filter(|t| *t > 0) {
            args.push("--timeout".to_string());
            args.push(format!("{}s", timeout));
        }
        if let Some(description) = &install.description {
            args.push("--description".to_string());
            args.push(description.clone());
        }
        if let Some(repo_url) = &install.repo_url {
            args.push("--repo".to_string());
            args.push(repo_url.clone());
            if let Some(version) = &install.version {
                args.push("--version".to_string());
                args.push(version.clone());
            }
        }
        if let Some(path) = values_file {
            args.push("--values".to_string());
            args.push(path.to_string_lossy().into_owned());
        }
        args
    }

    fn uninstall_args(&self, req: &UninstallRequest) -> Vec<String> {
        let mut args = vec!["uninstall".to_string(), req.release_name.clone()];
        args.extend(self.connection_args(Some(&req.namespace)));
        if req.keep_history {
            args.push("--keep-history".to_string());
        }
        if req.wait {
            args.push("--wait".to_string());
        }
        if req.dry_run {
            args.push("--dry-run".to_string());
        }
        if let Some(timeout) = req.timeout.filter(|t| *t > 0) {
            args.push("--timeout".to_string());
            args.push(format!("{}s", timeout));
        }
        if let Some(description) = &req.description {
            args.push("--description".to_string());
            args.push(description.clone());
        }
        args
    }

    fn list_args(&self, namespace: &str, all_namespaces: bool) -> Vec<String> {
        let mut args = vec![
            "list".to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        if all_namespaces {
            args.push("--all-namespaces".to_string());
            args.extend(self.connection_args(None));
        } else {
            args.extend(self.connection_args(Some(namespace)));
        }
        args
    }

    fn status_args(&self, name: &str, namespace: &str) -> Vec<String> {
        let mut args = vec![
            "status".to_string(),
            name.to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        args.extend(self.connection_args(Some(namespace)));
        args
    }

    fn history_args(&self, name: &str, namespace: &str) -> Vec<String> {
        let mut args = vec![
            "history".to_string(),
            name.to_string(),
            "--output".to_string(),
            "json".to_string(),
            "--max".to_string(),
            HISTORY_MAX.to_string(),
        ];
        args.extend(self.connection_args(Some(namespace)));
        args
    }

    // Repository registration is local engine state; no cluster flags.
    fn repo_add_args(name: &str, url: &str) -> Vec<String> {
        vec![
            "repo".to_string(),
            "add".to_string(),
            name.to_string(),
            url.to_string(),
            "--force-update".to_string(),
        ]
    }

    async fn run(&self, args: Vec<String>) -> Result<String, EngineError> {
        tracing::debug!("Invoking {} {}", self.config.helm_bin, args.join(" "));

        let mut command = Command::new(&self.config.helm_bin);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(driver) = &self.config.helm_driver {
            command.env("HELM_DRIVER", driver);
        }

        let output = command.output().await.map_err(|e| {
            EngineError::Configuration(format!(
                "failed to launch {}: {}",
                self.config.helm_bin, e
            ))
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(classify_failure(&String::from_utf8_lossy(&output.stderr)))
        }
    }

    /// Bound a mutating operation by the caller's timeout plus grace. The
    /// engine enforces the exact deadline itself via `--timeout`; this outer
    /// bound only reaps a subprocess that ignores it.
    async fn run_with_deadline(
        &self,
        args: Vec<String>,
        timeout: Option<u64>,
    ) -> Result<String, EngineError> {
        match timeout.filter(|t| *t > 0) {
            Some(secs) => {
                let deadline = Duration::from_secs(secs) + TIMEOUT_GRACE;
                tokio::time::timeout(deadline, self.run(args))
                    .await
                    .map_err(|_| {
                        EngineError::Engine(format!("operation exceeded {}s timeout", secs))
                    })?
            }
            None => self.run(args).await,
        }
    }
}

#[async_trait]
impl HelmEngine for HelmCli {
    async fn install(&self, req: InstallRequest) -> Result<ReleaseDetail, EngineError> {
        let values_file = stage_values(&req.values)?;
        let args = self.install_args(&req, values_file.as_ref().map(|f| f.path()));
        let stdout = self.run_with_deadline(args, req.timeout).await?;
        parse_release_dump(&stdout)
    }

    async fn upgrade(&self, req: UpgradeRequest) -> Result<ReleaseDetail, EngineError> {
        let values_file = stage_values(&req.install.values)?;
        let args = self.upgrade_args(&req, values_file.as_ref().map(|f| f.path()));
        let stdout = self.run_with_deadline(args, req.install.timeout).await?;
        parse_release_dump(&stdout)
    }

    async fn uninstall(&self, req: UninstallRequest) -> Result<UninstallResult, EngineError> {
        let args = self.uninstall_args(&req);
        let stdout = self.run_with_deadline(args, req.timeout).await?;
        Ok(UninstallResult {
            release_name: req.release_name,
            info: stdout.trim().to_string(),
        })
    }

    async fn list_releases(
        &self,
        namespace: &str,
        all_namespaces: bool,
    ) -> Result<Vec<ReleaseSummary>, EngineError> {
        let stdout = self.run(self.list_args(namespace, all_namespaces)).await?;
        if stdout.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items: Vec<ListItemDump> = serde_json::from_str(stdout.trim())
            .map_err(|e| EngineError::Engine(format!("unparseable engine output: {}", e)))?;
        Ok(items.into_iter().map(summary_from_list_item).collect())
    }

    async fn get_release(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<ReleaseDetail, EngineError> {
        let stdout = self.run(self.status_args(name, namespace)).await?;
        parse_release_dump(&stdout)
    }

    async fn get_history(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Vec<ReleaseHistoryEntry>, EngineError> {
        let stdout = self.run(self.history_args(name, namespace)).await?;
        if stdout.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items: Vec<HistoryItemDump> = serde_json::from_str(stdout.trim())
            .map_err(|e| EngineError::Engine(format!("unparseable engine output: {}", e)))?;
        Ok(items.into_iter().map(entry_from_history_item).collect())
    }

    async fn get_status(&self, name: &str, namespace: &str) -> Result<ReleaseDetail, EngineError> {
        let stdout = self.run(self.status_args(name, namespace)).await?;
        parse_release_dump(&stdout)
    }

    async fn add_repository(&self, name: &str, url: &str) -> Result<(), EngineError> {
        let args = Self::repo_add_args(name, url);
        match self.run(args).await {
            Ok(_) => {
                tracing::info!("Added chart repository {} ({})", name, url);
                Ok(())
            }
            Err(EngineError::Configuration(msg)) => Err(EngineError::Configuration(msg)),
            Err(err) => Err(EngineError::Repository(err.to_string())),
        }
    }
}

/// Materialize request values for `--values`; JSON is valid YAML, so the
/// engine consumes the staged file directly.
fn stage_values(
    values: &serde_json::Map<String, JsonValue>,
) -> Result<Option<NamedTempFile>, EngineError> {
    if values.is_empty() {
        return Ok(None);
    }
    let file = NamedTempFile::new()
        .map_err(|e| EngineError::Engine(format!("failed to stage values file: {}", e)))?;
    serde_json::to_writer(file.as_file(), values)
        .map_err(|e| EngineError::Engine(format!("failed to stage values file: {}", e)))?;
    Ok(Some(file))
}

/// Sort engine stderr into the failure taxonomy. Matching is substring-based
/// over the messages the engine actually prints.
fn classify_failure(stderr: &str) -> EngineError {
    let message = stderr.trim().to_string();
    let lower = message.to_lowercase();

    if lower.contains("release: not found")
        || lower.contains("release not found")
        || lower.contains("has no deployed releases")
    {
        return EngineError::ReleaseNotFound(message);
    }

    if lower.contains("no repo named")
        || lower.contains("no cached repo")
        || lower.contains("chart.yaml file is missing")
        || lower.contains("no chart version found")
        || lower.contains("failed to download")
        || lower.contains("is not a valid chart")
        || (lower.contains("chart") && lower.contains("not found"))
        || (lower.contains("path") && lower.contains("not found"))
    {
        return EngineError::ChartResolution(message);
    }

    if lower.contains("kubernetes cluster unreachable")
        || lower.contains("unable to load")
        || lower.contains("invalid configuration")
        || lower.contains("could not get server version")
    {
        return EngineError::Configuration(message);
    }

    EngineError::Engine(message)
}

// Wire forms of the engine's --output json dumps. Unknown fields are
// ignored; absent fields map to empty values rather than failing a request.

#[derive(Debug, Deserialize)]
struct ReleaseDump {
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    version: i64,
    #[serde(default)]
    info: ReleaseInfoDump,
    #[serde(default)]
    config: serde_json::Map<String, JsonValue>,
    #[serde(default)]
    manifest: String,
    chart: Option<ChartDump>,
}

#[derive(Debug, Default, Deserialize)]
struct ReleaseInfoDump {
    #[serde(default)]
    status: String,
    #[serde(default)]
    first_deployed: String,
    #[serde(default)]
    last_deployed: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Deserialize)]
struct ChartDump {
    metadata: Option<ChartMetadataDump>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMetadataDump {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default, rename = "appVersion")]
    app_version: String,
}

#[derive(Debug, Deserialize)]
struct ListItemDump {
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    revision: String,
    #[serde(default)]
    updated: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    chart: String,
    #[serde(default)]
    app_version: String,
}

#[derive(Debug, Deserialize)]
struct HistoryItemDump {
    #[serde(default)]
    revision: i64,
    #[serde(default)]
    updated: Option<DateTime<Utc>>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    chart: String,
    #[serde(default)]
    app_version: String,
    #[serde(default)]
    description: String,
}

fn parse_release_dump(stdout: &str) -> Result<ReleaseDetail, EngineError> {
    let dump: ReleaseDump = serde_json::from_str(stdout.trim())
        .map_err(|e| EngineError::Engine(format!("unparseable engine output: {}", e)))?;
    Ok(detail_from_dump(dump))
}

fn detail_from_dump(dump: ReleaseDump) -> ReleaseDetail {
    let metadata = dump
        .chart
        .and_then(|chart| chart.metadata)
        .unwrap_or_default();
    ReleaseDetail {
        name: dump.name,
        namespace: dump.namespace,
        version: dump.version,
        status: dump.info.status,
        description: dump.info.description,
        first_deployed: dump.info.first_deployed,
        last_deployed: dump.info.last_deployed,
        chart: metadata.name,
        chart_version: metadata.version,
        app_version: metadata.app_version,
        values: dump.config,
        manifest: dump.manifest,
        notes: dump.info.notes,
    }
}

fn summary_from_list_item(item: ListItemDump) -> ReleaseSummary {
    let (chart, _) = split_chart_ref(&item.chart);
    ReleaseSummary {
        name: item.name,
        namespace: item.namespace,
        version: item.revision.parse().unwrap_or(0),
        status: item.status,
        last_deployed: item.updated,
        chart,
        app_version: item.app_version,
    }
}

fn entry_from_history_item(item: HistoryItemDump) -> ReleaseHistoryEntry {
    let (chart, chart_version) = split_chart_ref(&item.chart);
    ReleaseHistoryEntry {
        revision: item.revision,
        status: item.status,
        chart,
        chart_version,
        app_version: item.app_version,
        description: item.description,
        deployed_at: item.updated.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    }
}

/// Split the engine's combined `name-x.y.z` chart reference. The version
/// starts at the last dash followed by a digit, which keeps dashed chart
/// names and prerelease versions intact.
fn split_chart_ref(chart: &str) -> (String, String) {
    let bytes = chart.as_bytes();
    let mut split = None;
    for (i, b) in bytes.iter().enumerate().rev() {
        if *b == b'-' && bytes.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
            split = Some(i);
            break;
        }
    }
    match split {
        Some(i) => (chart[..i].to_string(), chart[i + 1..].to_string()),
        None => (chart.to_string(), String::new()),
    }
}
