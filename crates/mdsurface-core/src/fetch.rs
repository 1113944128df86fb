//! Remote markdown retrieval.
//!
//! The surface never blocks on the network: requests run on background
//! threads and their outcomes are delivered over a channel that the owner
//! drains from its own thread. Overlapping requests are not sequenced; the
//! outcome applied last wins.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use ureq::Agent;

/// Media type requested from remote sources.
const ACCEPT_MEDIA_TYPE: &str = "text/markdown";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error fetching remote markdown.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered outside the success window.
    #[error("unexpected status {status} loading {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested address.
        url: String,
    },
    /// Transport-level failure (DNS, TLS, connect, read).
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Requested address.
        url: String,
        /// Underlying failure description.
        message: String,
    },
}

/// Raw response from a [`RemoteClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body read as text.
    pub body: String,
}

/// Transport seam for remote markdown retrieval.
///
/// The status policy does not live here: implementations return whatever
/// status the server produced and the surface decides what counts as
/// success.
pub trait RemoteClient: Send + Sync {
    /// Issue a GET for `url` with an Accept header requesting markdown.
    fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Success window: status 0 (non-network protocol access) or 2xx.
pub(crate) fn is_success(status: u16) -> bool {
    status == 0 || (200..300).contains(&status)
}

/// HTTP [`RemoteClient`] on a shared ureq agent.
pub struct HttpClient {
    agent: Agent,
}

impl HttpClient {
    /// Client with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Client with a custom global timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteClient for HttpClient {
    fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .agent
            .get(url)
            .header("Accept", ACCEPT_MEDIA_TYPE)
            .call()
            .map_err(|e| FetchError::Transport {
                url: url.to_owned(),
                message: e.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::Transport {
                url: url.to_owned(),
                message: e.to_string(),
            })?;
        Ok(FetchResponse { status, body })
    }
}

/// Outcome of one background request.
#[derive(Debug)]
pub(crate) struct FetchOutcome {
    /// Address the request was issued for.
    pub(crate) url: String,
    /// What the client produced.
    pub(crate) result: Result<FetchResponse, FetchError>,
}

/// Run a GET on a background thread; the outcome lands on `tx`.
pub(crate) fn spawn_request(
    client: Arc<dyn RemoteClient>,
    url: String,
    tx: Sender<FetchOutcome>,
) {
    std::thread::spawn(move || {
        let result = client.get(&url);
        // Receiver may be gone if the surface was dropped mid-flight.
        let _ = tx.send(FetchOutcome { url, result });
    });
}
