//! Gateway configuration loading
//!
//! Values resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_PORT: &str = "HELPS_PORT";
pub const ENV_DCS_URL: &str = "HELPS_DCS_URL";

const DEFAULT_PORT: u16 = 8530;
const DEFAULT_DCS_URL: &str = "https://git.door43.org";

/// Resolved gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind host for the HTTP listener
    pub host: String,
    /// Bind port for the HTTP listener
    pub port: u16,
    /// Base URL of the upstream content host (DCS)
    pub dcs_base_url: String,
    /// TTL for catalog search responses, seconds
    pub catalog_ttl_secs: u64,
    /// TTL for archive bodies, seconds
    pub zip_ttl_secs: u64,
    /// TTL for extracted raw files, seconds
    pub file_ttl_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            dcs_base_url: DEFAULT_DCS_URL.to_string(),
            catalog_ttl_secs: 300,
            zip_ttl_secs: 3600,
            file_ttl_secs: 600,
        }
    }
}

/// Partial configuration as read from a TOML file; every key optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    dcs_base_url: Option<String>,
    catalog_ttl_secs: Option<u64>,
    zip_ttl_secs: Option<u64>,
    file_ttl_secs: Option<u64>,
}

/// Resolve the gateway configuration from CLI arguments, environment,
/// optional TOML file, and compiled defaults.
pub fn resolve(
    cli_port: Option<u16>,
    cli_dcs_url: Option<&str>,
    cli_config: Option<&Path>,
) -> Result<GatewayConfig> {
    let file = load_file_config(cli_config)?;
    let mut config = GatewayConfig::default();

    if let Some(host) = file.host {
        config.host = host;
    }
    if let Some(ttl) = file.catalog_ttl_secs {
        config.catalog_ttl_secs = ttl;
    }
    if let Some(ttl) = file.zip_ttl_secs {
        config.zip_ttl_secs = ttl;
    }
    if let Some(ttl) = file.file_ttl_secs {
        config.file_ttl_secs = ttl;
    }

    config.port = match cli_port {
        Some(port) => port,
        None => match std::env::var(ENV_PORT) {
            Ok(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_PORT} is not a valid port: {raw}")))?,
            Err(_) => file.port.unwrap_or(DEFAULT_PORT),
        },
    };

    config.dcs_base_url = match cli_dcs_url {
        Some(url) => url.to_string(),
        None => match std::env::var(ENV_DCS_URL) {
            Ok(url) => url,
            Err(_) => file.dcs_base_url.unwrap_or_else(|| DEFAULT_DCS_URL.to_string()),
        },
    };
    // Trailing slash would double up when joining upstream paths
    while config.dcs_base_url.ends_with('/') {
        config.dcs_base_url.pop();
    }

    Ok(config)
}

/// Load the TOML config file, if one exists.
///
/// An explicitly named file must parse; a missing default-location file is
/// simply skipped.
fn load_file_config(cli_config: Option<&Path>) -> Result<FileConfig> {
    let path = match cli_config {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {e}", path.display())))
}

/// Default config file location: `<os config dir>/helps-gateway/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("helps-gateway").join("config.toml"))
}
