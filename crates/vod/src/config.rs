use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
pub(crate) const DEFAULT_REFERER: &str = "https://www.douyin.com/";

/// Artifacts at or below this size are treated as placeholder responses.
pub const MIN_VALID_BYTES: u64 = 1024;

/// How candidate probes are scheduled.
///
/// Results are always consumed in priority order, whichever mode is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeMode {
    /// Probe one candidate at a time and stop at the first reachable one.
    #[default]
    Sequential,
    /// Probe every candidate at once, then walk the verdicts in order.
    Concurrent,
}

/// Configurable options for resolving and acquiring an item
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Hard bound for a single accessibility probe
    pub probe_timeout: Duration,

    /// Scheduling of accessibility probes
    pub probe_mode: ProbeMode,

    /// Artifacts must be strictly larger than this many bytes
    pub min_valid_bytes: u64,

    /// Maximum number of redirects followed per download
    pub max_redirects: usize,

    /// Optional bound for a whole variant download
    pub download_timeout: Option<Duration>,

    /// Whether download variants run concurrently
    pub concurrent_downloads: bool,

    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Referer sent with every probe and download
    pub referer: String,

    /// Custom HTTP headers for requests
    pub headers: HeaderMap,

    /// Extension used when the base filename has none
    pub default_extension: String,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_millis(3000),
            probe_mode: ProbeMode::default(),
            min_valid_bytes: MIN_VALID_BYTES,
            max_redirects: 5,
            download_timeout: None,
            concurrent_downloads: true,
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_UA.to_owned(),
            referer: DEFAULT_REFERER.to_owned(),
            headers: AcquireConfig::get_default_headers(),
            default_extension: "mp4".to_owned(),
        }
    }
}

impl AcquireConfig {
    pub fn builder() -> crate::builder::AcquireConfigBuilder {
        crate::builder::AcquireConfigBuilder::new()
    }

    /// Rebuild a config so that its headers sit on top of the defaults.
    /// Custom headers take precedence over defaults for the same fields.
    pub fn with_config(config: AcquireConfig) -> Self {
        let mut headers = AcquireConfig::get_default_headers();
        for (name, value) in config.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        Self { headers, ..config }
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();

        default_headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("*/*"));

        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.8,en-US;q=0.5,en;q=0.3"),
        );

        default_headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );

        default_headers
    }
}
