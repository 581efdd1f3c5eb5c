//! `labcase` settings, read from TOML.
//!
//! Lookup order: an explicit `--config` path, then
//! `<config dir>/labcase/config.toml`, then built-in defaults. Missing keys
//! and sections fall back to their defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use case_form::attachments::{BYTES_PER_MB, DEFAULT_ACCEPT, DEFAULT_MAX_SIZE_MB};
use case_form::{AcceptPattern, UploadPolicy};
use case_wizard::{DEFAULT_HTTP_TIMEOUT, DEFAULT_SIMULATED_DELAY};
use directories::BaseDirs;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

const APP_DIR: &str = "labcase";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config {} is not valid TOML: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("submission.endpoint '{value}' is not a valid URL: {source}")]
    InvalidEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("submission.endpoint must use http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("upload.max_size_mb must be greater than zero")]
    ZeroSizeLimit,
    #[error("submission.timeout_secs must be greater than zero")]
    ZeroTimeout,
    #[error("upload.accept '{0}' names no file formats")]
    EmptyAccept(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabConfig {
    pub upload: UploadSettings,
    pub submission: SubmissionSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadSettings {
    pub accept: String,
    pub max_size_mb: u64,
    pub allow_multiple: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            accept: DEFAULT_ACCEPT.to_string(),
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            allow_multiple: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubmissionSettings {
    /// Lab endpoint; when absent, submissions are simulated.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub simulated_delay_ms: u64,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: DEFAULT_HTTP_TIMEOUT.as_secs(),
            simulated_delay_ms: DEFAULT_SIMULATED_DELAY.as_millis() as u64,
        }
    }
}

impl LabConfig {
    /// Resolves and validates the configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.max_size_mb == 0 {
            return Err(ConfigError::ZeroSizeLimit);
        }
        if AcceptPattern::parse_list(&self.upload.accept).is_empty() {
            return Err(ConfigError::EmptyAccept(self.upload.accept.clone()));
        }
        if self.submission.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.endpoint()?;
        Ok(())
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(
            &self.upload.accept,
            self.upload.max_size_mb.saturating_mul(BYTES_PER_MB),
            self.upload.allow_multiple,
        )
    }

    pub fn endpoint(&self) -> Result<Option<Url>, ConfigError> {
        let Some(raw) = self.submission.endpoint.as_deref() else {
            return Ok(None);
        };
        let url = Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint {
            value: raw.to_string(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(Some(url)),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.submission.timeout_secs)
    }

    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.submission.simulated_delay_ms)
    }
}

/// `<config dir>/labcase/config.toml`, when the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join(APP_DIR).join(CONFIG_FILE))
}
