//! # Builder for AcquireConfig
//!
//! Fluent construction of [`AcquireConfig`] instances.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use vod_engine::{AcquireConfig, ProbeMode};
//!
//! let config = AcquireConfig::builder()
//!     .with_probe_timeout(Duration::from_secs(2))
//!     .with_probe_mode(ProbeMode::Concurrent)
//!     .with_download_timeout(Duration::from_secs(120))
//!     .with_header("X-Requested-With", "XMLHttpRequest")
//!     .build();
//!
//! assert_eq!(config.probe_mode, ProbeMode::Concurrent);
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::{AcquireConfig, ProbeMode};

/// Builder for creating AcquireConfig instances with a fluent API
#[derive(Debug, Clone)]
pub struct AcquireConfigBuilder {
    config: AcquireConfig,
}

impl AcquireConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: AcquireConfig::default(),
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    pub fn with_probe_mode(mut self, mode: ProbeMode) -> Self {
        self.config.probe_mode = mode;
        self
    }

    /// Set the size an artifact must exceed to count as valid
    pub fn with_min_valid_bytes(mut self, bytes: u64) -> Self {
        self.config.min_valid_bytes = bytes;
        self
    }

    pub fn with_max_redirects(mut self, hops: usize) -> Self {
        self.config.max_redirects = hops;
        self
    }

    /// Bound every variant download. Downloads are unbounded by default.
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.config.download_timeout = Some(timeout);
        self
    }

    pub fn with_concurrent_downloads(mut self, concurrent: bool) -> Self {
        self.config.concurrent_downloads = concurrent;
        self
    }

    /// Set the connection timeout (time to establish initial connection)
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.config.referer = referer.into();
        self
    }

    /// Add a custom HTTP header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.as_ref().parse::<reqwest::header::HeaderName>(),
            HeaderValue::from_str(value.as_ref()),
        ) {
            self.config.headers.insert(name, value);
        }
        self
    }

    /// Replace all headers, defaults included
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.config.headers = headers;
        self
    }

    pub fn with_default_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.default_extension = extension.into();
        self
    }

    pub fn build(self) -> AcquireConfig {
        self.config
    }
}

impl Default for AcquireConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
