use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

/// Which backing spreadsheet a run writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    Production,
    #[default]
    Development,
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(DeploymentMode::Production),
            "development" | "dev" | "" => Ok(DeploymentMode::Development),
            other => Err(format!(
                "unknown deployment mode '{other}', expected production or development"
            )),
        }
    }
}

/// Names of the store spreadsheet and its worksheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreTarget {
    pub production_sheet: String,
    pub development_sheet: String,
    pub current_tab: String,
    pub archive_tab: String,
    pub logs_tab: String,
}

impl Default for StoreTarget {
    fn default() -> Self {
        Self {
            production_sheet: "Fido Foster Dogs Database".to_string(),
            development_sheet: "Fido Foster Dogs Database (Dev)".to_string(),
            current_tab: "Current".to_string(),
            archive_tab: "Archive".to_string(),
            logs_tab: "Logs".to_string(),
        }
    }
}

impl StoreTarget {
    /// Spreadsheet name for `mode`. A non-empty `dev_override` replaces the development name.
    pub fn spreadsheet_name(&self, mode: DeploymentMode, dev_override: Option<&str>) -> String {
        let name = match mode {
            DeploymentMode::Production => self.production_sheet.clone(),
            DeploymentMode::Development => match dev_override.map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => self.development_sheet.clone(),
            },
        };
        info!(?mode, spreadsheet = %name, "Resolved store spreadsheet");
        debug!(target = ?self, "Store target (full debug)");
        name
    }
}
