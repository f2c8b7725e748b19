//! Blocking HTTP fetcher.

use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use tracing::debug;

/// The default fetch method name.
pub const NET_HTTP: &str = "NetHTTP";

/// Fetcher for `http://` and `https://` endpoints.
///
/// Uses reqwest's blocking client. Non-success status codes are treated as
/// transport failures; the core performs no retries.
pub struct NetHttpFetcher {
    client: reqwest::blocking::Client,
}

impl NetHttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for NetHttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for NetHttpFetcher {
    fn fetch(&self, request_url: &str) -> Result<String> {
        debug!(url = request_url, "fetching oembed content");

        let response = self
            .client
            .get(request_url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Fetch {
                url: request_url.to_string(),
                source: Box::new(e),
            })?;

        response.text().map_err(|e| Error::Fetch {
            url: request_url.to_string(),
            source: Box::new(e),
        })
    }

    fn name(&self) -> &str {
        NET_HTTP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_fetch_returns_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/oembed.json");
            then.status(200).body(r#"{"html": "foo"}"#);
        });

        let fetcher = NetHttpFetcher::new();
        let body = fetcher.fetch(&server.url("/oembed.json")).unwrap();

        mock.assert();
        assert_eq!(body, r#"{"html": "foo"}"#);
    }

    #[test]
    fn test_fetch_error_status_propagates() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let fetcher = NetHttpFetcher::new();
        let err = fetcher.fetch(&server.url("/missing")).unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[test]
    fn test_name() {
        assert_eq!(NetHttpFetcher::new().name(), "NetHTTP");
    }
}
