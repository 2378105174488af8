use std::sync::Arc;

use reqwest::Client;

use crate::{AcquireConfig, Session};

/// Plain client without the platform verifier; tests only talk plain HTTP.
pub(crate) fn test_client() -> Client {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("test client")
}

pub(crate) fn test_session(config: &AcquireConfig) -> Arc<Session> {
    Arc::new(Session::new(test_client(), config, "ttwid=test"))
}

/// A URL nothing is listening on.
pub(crate) fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/video")
}

/// Route crate logs to the test writer at DEBUG level.
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
