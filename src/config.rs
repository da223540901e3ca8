//! Configuration loading via `ortho-config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::http::{HttpError, ReqwestHttpClient};
use crate::retry::{RetryPolicy, Retryer};

const APP_NAME: &str = "cpi-infra";
const SECTION: &str = "transfer";

/// Transfer settings derived from defaults, configuration files and
/// environment variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "CPI",
    discovery(
        app_name = "cpi-infra",
        env_var = "CPI_CONFIG_PATH",
        config_file_name = "cpi-infra.toml",
        dotfile_name = ".cpi-infra.toml",
        project_file_name = "cpi-infra.toml"
    )
)]
pub struct TransferConfig {
    /// Attempts per transfer, including the first.
    #[ortho_config(default = 10)]
    pub retry_max_attempts: u32,
    /// Delay after the first failed attempt, in milliseconds.
    #[ortho_config(default = 1000)]
    pub retry_initial_delay_ms: u64,
    /// Upper bound for any retry delay, in milliseconds.
    #[ortho_config(default = 8000)]
    pub retry_max_delay_ms: u64,
    /// Per-request timeout, in seconds.
    #[ortho_config(default = 60)]
    pub http_timeout_secs: u64,
    /// Accept self-signed host certificates. Only meant for lab environments.
    #[ortho_config(default = false)]
    pub skip_ssl_verify: bool,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl TransferConfig {
    fn require_positive(value: u64, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidField(format!(
                "{} must be greater than zero: set {} or add {} to [{SECTION}] in {APP_NAME}.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from(APP_NAME)])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages name the environment
    /// variable and configuration key that fix the problem.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_positive(
            u64::from(self.retry_max_attempts),
            &FieldMetadata::new(
                "retry attempt budget",
                "CPI_RETRY_MAX_ATTEMPTS",
                "retry_max_attempts",
            ),
        )?;
        Self::require_positive(
            self.http_timeout_secs,
            &FieldMetadata::new("HTTP timeout", "CPI_HTTP_TIMEOUT_SECS", "http_timeout_secs"),
        )?;
        if self.retry_max_delay_ms < self.retry_initial_delay_ms {
            return Err(ConfigError::InvalidField(format!(
                "maximum retry delay must not be below the initial delay: set \
                 CPI_RETRY_MAX_DELAY_MS or add retry_max_delay_ms to [{SECTION}] in \
                 {APP_NAME}.toml"
            )));
        }
        Ok(())
    }

    /// Retry policy described by this configuration.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            initial_delay: Duration::from_millis(self.retry_initial_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
            multiplier: 2,
        }
    }

    /// Retryer using [`TransferConfig::retry_policy`].
    #[must_use]
    pub const fn retryer(&self) -> Retryer {
        Retryer::new(self.retry_policy())
    }

    /// Builds the production HTTP client after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails or the client cannot be
    /// constructed.
    pub fn http_client(&self) -> Result<ReqwestHttpClient, ConfigError> {
        self.validate()?;
        ReqwestHttpClient::new(
            Duration::from_secs(self.http_timeout_secs),
            self.skip_ssl_verify,
        )
        .map_err(ConfigError::from)
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
    /// The HTTP client could not be built from the configuration.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
