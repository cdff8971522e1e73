/// `load_config` module: loads the static YAML config and resolves the store target from the environment.
///
/// The YAML file carries no secrets. Producer tokens are named by environment
/// variable in the file and read at fetch time; the deployment mode comes from
/// `ENVIRONMENT` and an optional `DEV_SHEET_NAME` overrides the development
/// spreadsheet.
///
/// # Errors
/// All errors use `anyhow::Error` and surface at the CLI boundary.
use anyhow::Result;
use fido_sync_core::config::{DeploymentMode, StoreTarget};
use fido_sync_core::producers::ProducerConfig;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug)]
pub struct CliConfig {
    pub store: StoreTarget,
    pub producers: Vec<ProducerConfig>,
    pub mode: DeploymentMode,
    /// Spreadsheet name after applying the mode and any override.
    pub spreadsheet: String,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    store: StoreTarget,
    #[serde(default)]
    producers: Vec<ProducerConfig>,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let mode: DeploymentMode = env::var("ENVIRONMENT")
        .unwrap_or_default()
        .parse()
        .map_err(anyhow::Error::msg)?;
    let dev_override = env::var("DEV_SHEET_NAME").ok();
    let spreadsheet = raw.store.spreadsheet_name(mode, dev_override.as_deref());

    if raw.producers.is_empty() {
        tracing::warn!(config_path = ?path_ref, "No producers configured");
    }

    Ok(CliConfig {
        store: raw.store,
        producers: raw.producers,
        mode,
        spreadsheet,
    })
}
