use std::sync::Arc;

use reqwest::Client;
use rustls::{ClientConfig, crypto::ring};
use rustls_platform_verifier::BuilderVerifierExt;
use tracing::debug;

use crate::{AcquireConfig, AcquireError};

/// Create the HTTP client used for probing and downloading.
///
/// Redirects are never followed by the client: probes report 3xx as reachable
/// and the downloader follows `Location` itself with a hop limit.
pub fn create_client(config: &AcquireConfig) -> Result<Client, AcquireError> {
    let provider = Arc::new(ring::default_provider());

    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_platform_verifier()?
        .with_no_client_auth();

    let mut client_builder = Client::builder()
        .pool_max_idle_per_host(5)
        .use_preconfigured_tls(tls_config)
        .redirect(reqwest::redirect::Policy::none());

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    debug!(
        connect_timeout = ?config.connect_timeout,
        "Building HTTP client with redirects disabled"
    );

    client_builder.build().map_err(AcquireError::from)
}
