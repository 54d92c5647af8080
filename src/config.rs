// src/config.rs
//! Client configuration: defaults, optional per-environment YAML file, env vars

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_ENDPOINT: &str = "/api/v1/check-resume";
pub const DEFAULT_MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_LOG_FILE: &str = "/tmp/reschk.log";
pub const DEFAULT_CONFIG_FILE: &str = "reschk.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub endpoint: String,
    /// `None` means no request timeout.
    pub timeout_seconds: Option<u64>,
    pub max_file_bytes: u64,
    pub log_file: PathBuf,
}

/// One environment section of the config file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigSection {
    base_url: Option<String>,
    endpoint: Option<String>,
    timeout_seconds: Option<u64>,
    max_file_bytes: Option<u64>,
    log_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: ConfigSection,
    #[serde(default)]
    production: Option<ConfigSection>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: None,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl ClientConfig {
    /// Load configuration. An explicit `path` must exist; otherwise
    /// `reschk.yaml` in the current directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let file = match path {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                candidate.exists().then_some(candidate)
            }
        };

        if let Some(file) = file {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read config file: {}", file.display()))?;
            config = config.merge_yaml(&content, &Self::get_environment())?;
            info!("Loaded configuration from {}", file.display());
        }

        Ok(config.apply_env()?.normalized())
    }

    fn get_environment() -> String {
        std::env::var("RESCHK_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Overlay the section of a YAML document matching `environment`.
    /// Unknown environments, and a missing `production` section, fall back to `local`.
    pub fn merge_yaml(mut self, content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config file")?;

        let section = match (environment, file.production) {
            ("production", Some(production)) => production,
            _ => file.local,
        };
        debug!("Using '{}' configuration section", environment);

        if let Some(base_url) = section.base_url {
            self.base_url = base_url;
        }
        if let Some(endpoint) = section.endpoint {
            self.endpoint = endpoint;
        }
        if section.timeout_seconds.is_some() {
            self.timeout_seconds = section.timeout_seconds;
        }
        if let Some(max_file_bytes) = section.max_file_bytes {
            self.max_file_bytes = max_file_bytes;
        }
        if let Some(log_file) = section.log_file {
            self.log_file = log_file;
        }

        Ok(self)
    }

    fn apply_env(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("RESCHK_SERVICE_URL") {
            self.base_url = url;
        }
        if let Ok(timeout) = std::env::var("RESCHK_TIMEOUT_SECS") {
            let secs = timeout
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("RESCHK_TIMEOUT_SECS must be a whole number of seconds"))?;
            self.timeout_seconds = Some(secs);
        }
        Ok(self)
    }

    /// Apply command-line overrides, which take precedence over everything else.
    pub fn with_overrides(mut self, base_url: Option<String>, timeout_seconds: Option<u64>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if timeout_seconds.is_some() {
            self.timeout_seconds = timeout_seconds;
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        if !self.endpoint.starts_with('/') {
            self.endpoint = format!("/{}", self.endpoint);
        }
        // zero would make every request fail immediately
        if self.timeout_seconds == Some(0) {
            self.timeout_seconds = None;
        }
        self
    }

    /// Full URL of the analysis endpoint.
    pub fn analysis_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint)
    }
}
