use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "https://wrapapi.com";

/// Connection settings shared by every call a [`crate::Client`] makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the service, without a trailing slash.
    pub host: String,
    /// Per-request timeout. `None` waits as long as the transport does.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            timeout: None,
            user_agent: concat!("wa-sdk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `WRAPAPI_HOST` and `WRAPAPI_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(host) = lookup("WRAPAPI_HOST").filter(|h| !h.trim().is_empty()) {
            config = config.with_host(host);
        }
        if let Some(secs) = lookup("WRAPAPI_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::InvalidArgument(format!(
                    "WRAPAPI_TIMEOUT_SECS should be a whole number of seconds, but is {secs}"
                ))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Full URL for a host-relative path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host, path.trim_start_matches('/'))
    }
}
