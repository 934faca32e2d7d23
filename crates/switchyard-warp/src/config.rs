//! Configuration from environment variables and an optional YAML file.
//!
//! **Environment variables:**
//! - `WARP_BASE_URL`: upstream origin (default: https://app.warp.dev)
//! - `WARP_REQUEST_TIMEOUT_SECS`: upstream request timeout (default: 120)
//! - `WARP_SCHEMA_DIR`: schema bundle directory (default: the bundled `proto/`)
//!
//! A YAML file overrides any of these and the client identity headers:
//!
//! ```yaml
//! base_url: "https://app.warp.dev"
//! request_timeout_secs: 300
//! client:
//!   client_version: "v0.2026.01.14.08.15.stable_02"
//! ```

use crate::registry::bundled_schema_dir;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://app.warp.dev";
pub const ENDPOINT_PATH: &str = "/ai/multi-agent";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub mod headers {
    pub const CLIENT_ID: &str = "x-warp-client-id";
    pub const CLIENT_VERSION: &str = "x-warp-client-version";
    pub const OS_CATEGORY: &str = "x-warp-os-category";
    pub const OS_NAME: &str = "x-warp-os-name";
    pub const OS_VERSION: &str = "x-warp-os-version";

    pub const CONTENT_TYPE_PROTOBUF: &str = "application/x-protobuf";
    pub const ACCEPT_EVENT_STREAM: &str = "text/event-stream";
    pub const ENCODING_IDENTITY: &str = "identity";
}

/// Values sent in the `x-warp-*` identity headers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientIdentity {
    pub client_id: String,
    pub client_version: String,
    pub os_category: String,
    pub os_name: String,
    pub os_version: String,
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            client_id: "warp-app".to_string(),
            client_version: "v0.2026.01.14.08.15.stable_02".to_string(),
            os_category: "macOS".to_string(),
            os_name: "macOS".to_string(),
            os_version: "15.7.2".to_string(),
        }
    }
}

impl ClientIdentity {
    pub fn header_pairs(&self) -> [(&'static str, &str); 5] {
        [
            (headers::CLIENT_ID, self.client_id.as_str()),
            (headers::CLIENT_VERSION, self.client_version.as_str()),
            (headers::OS_CATEGORY, self.os_category.as_str()),
            (headers::OS_NAME, self.os_name.as_str()),
            (headers::OS_VERSION, self.os_version.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WarpConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub schema_dir: PathBuf,
    pub client: ClientIdentity,
}

#[derive(Debug, Default, Deserialize)]
struct WarpYamlConfig {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    schema_dir: Option<PathBuf>,
    client: Option<ClientIdentity>,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("WARP_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            request_timeout_secs: env::var("WARP_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            schema_dir: env::var("WARP_SCHEMA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| bundled_schema_dir()),
            client: ClientIdentity::default(),
        }
    }
}

impl WarpConfig {
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read warp config from {:?}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let yaml: WarpYamlConfig = if content.trim().is_empty() {
            WarpYamlConfig::default()
        } else {
            serde_yaml_ng::from_str(content).context("invalid warp config YAML")?
        };
        let defaults = Self::default();

        Ok(Self {
            base_url: yaml.base_url.unwrap_or(defaults.base_url),
            request_timeout_secs: yaml
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            schema_dir: yaml.schema_dir.unwrap_or(defaults.schema_dir),
            client: yaml.client.unwrap_or(defaults.client),
        })
    }

    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Full URL of the multi-agent endpoint.
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url_trimmed(), ENDPOINT_PATH)
    }
}
