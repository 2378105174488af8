//! Lightweight reachability checks for candidate URLs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::Session;

/// Only the first two bytes are requested.
pub const PROBE_RANGE: &str = "bytes=0-1";

/// A reachability check that never fails: every error means "not accessible".
#[async_trait]
pub trait AccessibilityProbe: Send + Sync {
    async fn probe(&self, url: &str) -> bool;
}

/// Probes with a range-limited GET through the shared session.
///
/// Any 2xx or 3xx status counts as accessible. Redirects are not followed here;
/// the downloader follows them when it fetches the artifact.
#[derive(Debug, Clone)]
pub struct HttpProber {
    session: Arc<Session>,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(session: Arc<Session>, timeout: Duration) -> Self {
        Self { session, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl AccessibilityProbe for HttpProber {
    async fn probe(&self, url: &str) -> bool {
        let request = self
            .session
            .get(url)
            .header(reqwest::header::RANGE, PROBE_RANGE)
            .timeout(self.timeout);

        match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => {
                let status = response.status();
                let accessible = status.is_success() || status.is_redirection();
                debug!(url = %url, status = %status, accessible, "Probe finished");
                accessible
            }
            Ok(Err(e)) => {
                debug!(url = %url, error = %e, "Probe request failed");
                false
            }
            Err(_) => {
                debug!(url = %url, timeout = ?self.timeout, "Probe timed out");
                false
            }
        }
    }
}
