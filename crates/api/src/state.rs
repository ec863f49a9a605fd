//! Shared application state for the Axum server.

use std::sync::Arc;

use tokio::sync::Mutex;

use beacon_common::config::AppConfig;
use beacon_common::types::NetworkRegistry;
use beacon_engine::config_writer::ConfigWriter;
use beacon_engine::env_writer::EnvWriter;
use beacon_engine::launcher::MonitorLauncher;

use crate::templates::TemplateStore;

/// Application state shared across all route handlers via Axum `State`.
///
/// Everything here is built once at startup. The network registry is
/// read-only; the writers and launcher carry their own synchronization,
/// and `submission_lock` keeps a submission's two writes together.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub networks: Arc<NetworkRegistry>,
    pub config_writer: Arc<ConfigWriter>,
    pub env_writer: Arc<EnvWriter>,
    pub launcher: Arc<MonitorLauncher>,
    pub templates: Arc<TemplateStore>,
    /// Serializes the config write and env append of one submission
    pub submission_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: AppConfig, networks: NetworkRegistry) -> Self {
        let config_writer = ConfigWriter::new(&config.config_path, config.write_policy);
        let env_writer = EnvWriter::new(&config.env_path);
        let launcher = MonitorLauncher::new(config.monitor.clone());
        let templates = TemplateStore::new(&config.template_dir);

        Self {
            config: Arc::new(config),
            networks: Arc::new(networks),
            config_writer: Arc::new(config_writer),
            env_writer: Arc::new(env_writer),
            launcher: Arc::new(launcher),
            templates: Arc::new(templates),
            submission_lock: Arc::new(Mutex::new(())),
        }
    }
}
