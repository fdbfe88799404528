//! Client configuration.
//!
//! # Design
//! Every setting has a default, so an empty config reaches the public CRM
//! host on `v3`. `from_env` overlays environment variables and validates
//! the result.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_USER_AGENT: &str = concat!("crm-core/", env!("CARGO_PKG_VERSION"));

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `CRM_BASE_URL`, `CRM_API_VERSION` and
    /// `CRM_TIMEOUT_SECS` when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("CRM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(version) = lookup("CRM_API_VERSION") {
            config.api_version = version;
        }
        if let Some(timeout) = lookup("CRM_TIMEOUT_SECS") {
            config.timeout_secs = timeout
                .parse()
                .map_err(|_| Error::Config(format!("CRM_TIMEOUT_SECS is not a number: {timeout}")))?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config("base_url must not be empty".into()));
        }
        if self.api_version.is_empty() {
            return Err(Error::Config("api_version must not be empty".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://api.hubapi.com".to_string()
}

fn default_api_version() -> String {
    "v3".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
