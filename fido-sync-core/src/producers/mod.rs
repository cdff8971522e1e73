//! Concrete rescue-source producers and their configuration.
//!
//! Each producer wraps a fallible `fetch` and converts any failure into a
//! logged error plus an empty result, so one broken source never stops a run.

pub mod road_to_freedom;
pub mod shared_sheet;
pub mod shelterluv;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::contract::{Producer, SheetRows, StoreError};

pub use road_to_freedom::RoadToFreedomProducer;
pub use shared_sheet::{SharedSheetProducer, SheetLayout};
pub use shelterluv::ShelterluvProducer;

/// Per-request timeout for producer HTTP calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Declares one producer to register, in the order listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProducerConfig {
    Shelterluv {
        rescue_name: String,
        /// Environment variable holding the API bearer token.
        token_env: String,
        #[serde(default = "shelterluv::default_url")]
        url: String,
    },
    RoadToFreedom {
        #[serde(default = "road_to_freedom::default_rescue_name")]
        rescue_name: String,
        #[serde(default = "road_to_freedom::default_url")]
        url: String,
    },
    SharedSheet {
        rescue_name: String,
        spreadsheet: String,
        layout: SheetLayout,
    },
}

/// Failure inside a producer; never escapes [`Producer::produce`].
#[derive(Debug)]
pub enum ProducerError {
    MissingToken(String),
    Http(reqwest::Error),
    Payload(String),
    Sheet(StoreError),
}

impl fmt::Display for ProducerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProducerError::MissingToken(var) => write!(f, "environment variable {var} not set"),
            ProducerError::Http(e) => write!(f, "request failed: {e}"),
            ProducerError::Payload(msg) => write!(f, "unexpected payload: {msg}"),
            ProducerError::Sheet(e) => write!(f, "spreadsheet access failed: {e}"),
        }
    }
}

impl std::error::Error for ProducerError {}

impl From<reqwest::Error> for ProducerError {
    fn from(e: reqwest::Error) -> Self {
        ProducerError::Http(e)
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Build the registered producer list from configuration, preserving order.
pub fn build_producers(
    configs: &[ProducerConfig],
    sheets: Arc<dyn SheetRows>,
) -> Vec<Box<dyn Producer>> {
    let http = http_client();
    configs
        .iter()
        .map(|config| -> Box<dyn Producer> {
            match config {
                ProducerConfig::Shelterluv {
                    rescue_name,
                    token_env,
                    url,
                } => Box::new(ShelterluvProducer::new(
                    http.clone(),
                    rescue_name.clone(),
                    token_env.clone(),
                    url.clone(),
                )),
                ProducerConfig::RoadToFreedom { rescue_name, url } => Box::new(
                    RoadToFreedomProducer::new(http.clone(), rescue_name.clone(), url.clone()),
                ),
                ProducerConfig::SharedSheet {
                    rescue_name,
                    spreadsheet,
                    layout,
                } => Box::new(SharedSheetProducer::new(
                    sheets.clone(),
                    rescue_name.clone(),
                    spreadsheet.clone(),
                    *layout,
                )),
            }
        })
        .collect()
}
