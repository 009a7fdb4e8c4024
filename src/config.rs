use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub in_cluster: bool,
    pub kubeconfig: String,
    pub helm_driver: Option<String>,
    pub registry_url: Option<String>,
    pub helm_bin: String,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let in_cluster = env::var("IN_CLUSTER").map(|v| v == "true").unwrap_or(false);

        // KUBECONFIG override wins; otherwise the per-user default location.
        let kubeconfig = match env::var("KUBECONFIG") {
            Ok(path) => path,
            Err(_) => default_kubeconfig_path(),
        };

        let helm_driver = env::var("HELM_DRIVER").ok();
        let registry_url = env::var("HELM_REGISTRY_URL").ok();

        let helm_bin = env::var("HELM_BIN").unwrap_or_else(|_| "helm".to_string());

        let service_port = env::var("SERVICE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = env::var("SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(Config {
            in_cluster,
            kubeconfig,
            helm_driver,
            registry_url,
            helm_bin,
            service_port,
            service_host,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        if self.in_cluster {
            tracing::info!("  Cluster connection: in-cluster service account");
        } else {
            tracing::info!(
                "  Cluster connection: kubeconfig {}",
                if self.kubeconfig.is_empty() {
                    "(unresolved, deferred to first engine call)"
                } else {
                    &self.kubeconfig
                }
            );
        }
        tracing::info!(
            "  Helm storage driver: {}",
            self.helm_driver.as_deref().unwrap_or("engine default")
        );
        tracing::info!(
            "  Chart registry: {}",
            self.registry_url.as_deref().unwrap_or("none configured")
        );
        tracing::info!("  Helm binary: {}", self.helm_bin);
        tracing::info!(
            "  Service listening on: {}:{}",
            self.service_host,
            self.service_port
        );
    }
}

/// Default per-user kubeconfig location. Failure to resolve the home
/// directory is non-fatal; the empty path surfaces on the first engine call.
fn default_kubeconfig_path() -> String {
    match directories::UserDirs::new() {
        Some(dirs) => dirs
            .home_dir()
            .join(".kube")
            .join("config")
            .to_string_lossy()
            .into_owned(),
        None => {
            tracing::warn!("Failed to resolve user home directory, kubeconfig path left empty");
            String::new()
        }
    }
}
