//! Run configuration loaded from `wps-run.toml`.
//!
//! [`RunConfig`] holds every tunable of a run. Values missing from the file
//! use the defaults below; command-line flags override both.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::RunError;
use crate::poll::RetryPolicy;
use crate::wps::ClientOptions;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "wps-run.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Port of the WPS endpoint on the target host.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Process identifier the workflow is submitted to.
    #[serde(default = "default_identifier")]
    pub identifier: String,

    /// Consecutive failed status checks tolerated before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause between a failed status check and the next attempt.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Pause after each status check that finds the job still pending.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    #[serde(default)]
    pub verify_tls: bool,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_port() -> u16 {
    8091
}

fn default_identifier() -> String {
    "custom_workflow".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_settle_secs() -> u64 {
    3
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            identifier: default_identifier(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            settle_secs: default_settle_secs(),
            verify_tls: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl RunConfig {
    /// Load `wps-run.toml` from the working directory, or the defaults if it
    /// does not exist.
    pub fn load() -> Result<Self, RunError> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load an explicitly named file. A missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Self, RunError> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str::<RunConfig>(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RunError> {
        if self.max_retries == 0 {
            return Err(RunError::Config("max_retries must be at least 1".into()));
        }
        if self.identifier.trim().is_empty() {
            return Err(RunError::Config("identifier must not be empty".into()));
        }
        Ok(())
    }

    /// WPS endpoint URL for a target host.
    pub fn endpoint(&self, target: &str) -> String {
        format!("http://{target}:{}/wps", self.port)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            verify_tls: self.verify_tls,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}
