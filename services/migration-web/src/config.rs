//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The OAuth client secret is loaded from the GOOGLE_CLIENT_SECRET env var
//! or client_secret_file, never stored in the TOML directly to avoid
//! leaking secrets.

use common::Secret;
use google_auth::AccessType;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub oauth: OauthConfig,
    pub copy: CopyConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub flow: FlowConfig,
}

/// Listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// OAuth client identity and flow parameters
#[derive(Debug, Deserialize)]
pub struct OauthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    /// `online` (default) obtains no refresh token; `offline` requests one
    #[serde(default)]
    pub access_type: AccessType,
    #[serde(skip)]
    pub client_secret: Option<Secret>,
    /// Path to a file containing the client secret (alternative to
    /// GOOGLE_CLIENT_SECRET env var)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
}

/// The gated operation: which file is copied, and where to
#[derive(Debug, Deserialize)]
pub struct CopyConfig {
    pub source_file_id: String,
    pub destination_folder_id: String,
}

/// Outbound HTTP settings
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Lifetimes for the in-memory flow stores
#[derive(Debug, Deserialize)]
pub struct FlowConfig {
    #[serde(default = "default_state_ttl")]
    pub state_ttl_secs: u64,
    #[serde(default = "default_credential_ttl")]
    pub credential_ttl_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            state_ttl_secs: default_state_ttl(),
            credential_ttl_secs: default_credential_ttl(),
        }
    }
}

fn default_max_connections() -> usize {
    1024
}

fn default_timeout() -> u64 {
    30
}

fn default_state_ttl() -> u64 {
    600
}

fn default_credential_ttl() -> u64 {
    3600
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Client secret resolution order:
    /// 1. GOOGLE_CLIENT_SECRET env var
    /// 2. client_secret_file path from config
    ///
    /// The secret is required: this is a confidential OAuth client and the
    /// token exchange cannot run without it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        // Validate required OAuth identity fields
        if config.oauth.client_id.is_empty() {
            return Err(common::Error::Config(
                "oauth.client_id must not be empty".into(),
            ));
        }
        if !config.oauth.redirect_uri.starts_with("http://")
            && !config.oauth.redirect_uri.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "redirect_uri must start with http:// or https://, got: {}",
                config.oauth.redirect_uri
            )));
        }

        // Validate the copy target identifiers
        if config.copy.source_file_id.is_empty() {
            return Err(common::Error::Config(
                "copy.source_file_id must not be empty".into(),
            ));
        }
        if config.copy.destination_folder_id.is_empty() {
            return Err(common::Error::Config(
                "copy.destination_folder_id must not be empty".into(),
            ));
        }

        // Validate timeouts and limits are non-zero
        if config.http.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        if config.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }
        if config.flow.state_ttl_secs == 0 {
            return Err(common::Error::Config(
                "state_ttl_secs must be greater than 0".into(),
            ));
        }
        if config.flow.credential_ttl_secs == 0 {
            return Err(common::Error::Config(
                "credential_ttl_secs must be greater than 0".into(),
            ));
        }

        // Resolve client secret: env var takes precedence over file
        if let Ok(secret) = std::env::var("GOOGLE_CLIENT_SECRET") {
            if !secret.is_empty() {
                config.oauth.client_secret = Some(Secret::new(secret));
            }
        }
        if config.oauth.client_secret.is_none() {
            if let Some(ref secret_file) = config.oauth.client_secret_file {
                let secret = std::fs::read_to_string(secret_file).map_err(|e| {
                    common::Error::Config(format!(
                        "failed to read client_secret_file {}: {e}",
                        secret_file.display()
                    ))
                })?;
                let secret = secret.trim().to_owned();
                if !secret.is_empty() {
                    config.oauth.client_secret = Some(Secret::new(secret));
                }
            }
        }
        if config.oauth.client_secret.is_none() {
            return Err(common::Error::Config(
                "client secret missing: set GOOGLE_CLIENT_SECRET or oauth.client_secret_file"
                    .into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("drive-migration-web.toml")
    }
}
