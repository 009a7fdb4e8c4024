use crate::config::Config;
use crate::helm::HelmEngine;
use std::sync::Arc;

/// Shared application state
///
/// The engine is held behind the trait so handlers stay decoupled from the
/// subprocess implementation; the config is the immutable snapshot taken at
/// bootstrap.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn HelmEngine>,
    pub config: Arc<Config>,
}
