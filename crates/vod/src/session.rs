use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::AcquireConfig;

/// Request context shared by every probe and download of one acquisition.
///
/// The cookie jar is captured once, typically from the page fetch, and is
/// read-only afterwards. A `Session` is cheap to share behind an `Arc`
/// across concurrent variant downloads.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    headers: HeaderMap,
    cookies: FxHashMap<String, String>,
    cookie_header: Option<HeaderValue>,
}

impl Session {
    /// Create a session from a `name1=value1; name2=value2` cookie string.
    pub fn new(client: Client, config: &AcquireConfig, cookie_jar: &str) -> Self {
        Self::builder(client, config)
            .with_cookie_string(cookie_jar)
            .build()
    }

    pub fn builder(client: Client, config: &AcquireConfig) -> SessionBuilder {
        SessionBuilder::new(client, config)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn cookies(&self) -> &FxHashMap<String, String> {
        &self.cookies
    }

    pub fn get_cookie(&self, name: &str) -> Option<&String> {
        self.cookies.get(name)
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Create a request carrying the session headers and cookie snapshot.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .headers(self.headers.clone());

        match &self.cookie_header {
            Some(cookies) => builder.header(reqwest::header::COOKIE, cookies.clone()),
            None => builder,
        }
    }
}

/// Collects cookies before the session snapshot is frozen.
#[derive(Debug)]
pub struct SessionBuilder {
    client: Client,
    headers: HeaderMap,
    cookies: FxHashMap<String, String>,
}

impl SessionBuilder {
    pub fn new(client: Client, config: &AcquireConfig) -> Self {
        let mut headers = config.headers.clone();

        match HeaderValue::from_str(&config.user_agent) {
            Ok(value) => {
                headers.insert(reqwest::header::USER_AGENT, value);
            }
            Err(e) => debug!("Ignoring invalid user agent: {}", e),
        }

        if !config.referer.is_empty() {
            match HeaderValue::from_str(&config.referer) {
                Ok(value) => {
                    headers.insert(reqwest::header::REFERER, value);
                }
                Err(e) => debug!("Ignoring invalid referer: {}", e),
            }
        }

        Self {
            client,
            headers,
            cookies: FxHashMap::default(),
        }
    }

    pub fn with_cookie<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Add cookies from a cookie string (format: "name1=value1; name2=value2").
    pub fn with_cookie_string(mut self, cookie_string: &str) -> Self {
        for cookie in cookie_string.split(';') {
            let cookie = cookie.trim();
            if let Some((name, value)) = cookie.split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    self.cookies
                        .insert(name.to_string(), value.trim().to_string());
                }
            }
        }
        self
    }

    /// Store the cookies set by a response, e.g. the initial page fetch.
    pub fn with_set_cookie_headers(mut self, headers: &HeaderMap) -> Self {
        for value in headers.get_all(reqwest::header::SET_COOKIE).iter() {
            let Ok(cookie_str) = value.to_str() else {
                continue;
            };
            // Parse "name=value; other_attributes" format
            if let Some((name, value)) = cookie_str
                .split(';')
                .next()
                .and_then(|pair| pair.split_once('='))
            {
                let name = name.trim().to_string();
                let value = value.trim().to_string();
                debug!("Capturing cookie: {}", name);
                self.cookies.insert(name, value);
            }
        }
        self
    }

    pub fn build(self) -> Session {
        let cookie_header = if self.cookies.is_empty() {
            None
        } else {
            let joined = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            HeaderValue::from_str(&joined)
                .inspect_err(|e| debug!("Dropping unrepresentable cookie header: {}", e))
                .ok()
        };

        Session {
            client: self.client,
            headers: self.headers,
            cookies: self.cookies,
            cookie_header,
        }
    }
}
