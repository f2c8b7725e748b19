//! Content fetching abstraction.
//!
//! The `Fetcher` trait is the transport seam of the pipeline: given a fully
//! built request URL, a fetcher returns the raw response body. Fetchers are
//! registered in the registry under the name they declare and selected by
//! the active fetch method at call time, not per provider.
//!
//! Built-in fetchers:
//! - `NetHttpFetcher` — blocking HTTP(S) via reqwest, registered as "NetHTTP"
//!
//! Timeouts, retries, and cancellation are entirely the fetcher's concern;
//! the core treats `fetch` as one opaque blocking call.

pub mod http;

use crate::error::Result;

pub use http::NetHttpFetcher;

/// A transport capability that retrieves raw content for a request URL.
///
/// # Implementing a Fetcher
///
/// ```
/// use unfurl::fetcher::Fetcher;
/// use unfurl::Result;
///
/// struct CannedFetcher;
///
/// impl Fetcher for CannedFetcher {
///     fn fetch(&self, _request_url: &str) -> Result<String> {
///         Ok(r#"{"html": "canned"}"#.to_string())
///     }
///
///     fn name(&self) -> &str {
///         "canned"
///     }
/// }
/// ```
pub trait Fetcher: Send + Sync + 'static {
    /// Retrieve the raw response body for the request URL.
    ///
    /// Transport failures surface as `Error::Fetch` with the underlying
    /// error carried verbatim.
    fn fetch(&self, request_url: &str) -> Result<String>;

    /// The method name this fetcher registers under (e.g., "NetHTTP").
    fn name(&self) -> &str;
}
