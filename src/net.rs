//! HTTP fetching behind a small capability trait.
//!
//! The worker thread only ever performs blocking GET requests, so the
//! interface is a single method. Tests substitute an in-memory
//! implementation; the real one wraps a blocking `reqwest` client.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::core::settings::{HTTP_CONNECT_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS};

/// A successful HTTP response body plus the declared content type.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedBody {
    pub fn new(content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type,
            bytes,
        }
    }

    /// Body interpreted as UTF-8 text, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Blocking GET capability. Non-2xx responses are reported as errors so
/// callers can treat "server said no" and "network said no" uniformly.
pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> Result<FetchedBody>;
}

/// Production fetcher backed by `reqwest::blocking`.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("fontgrab/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<FetchedBody> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned an error status"))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_owned());

        let bytes = response
            .bytes()
            .with_context(|| format!("failed to read body of {url}"))?
            .to_vec();

        Ok(FetchedBody::new(content_type, bytes))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};

    use super::{Fetch, FetchedBody};

    /// In-memory fetcher for tests. URLs not present in the map fail the
    /// way an unreachable host would, and every request is recorded so
    /// tests can assert on fetch order.
    #[derive(Default)]
    pub struct FakeFetcher {
        responses: HashMap<String, FetchedBody>,
        pub requests: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(mut self, url: &str, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
            self.responses.insert(
                url.to_owned(),
                FetchedBody::new(content_type.map(str::to_owned), bytes),
            );
            self
        }

        pub fn request_log(&self) -> Vec<String> {
            self.requests.lock().expect("request log poisoned").clone()
        }
    }

    impl Fetch for FakeFetcher {
        fn get(&self, url: &str) -> Result<FetchedBody> {
            self.requests
                .lock()
                .expect("request log poisoned")
                .push(url.to_owned());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("GET {url} failed: connection refused"))
        }
    }
}
