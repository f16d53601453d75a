use backon::{ExponentialBuilder, Retryable};
use reqwest::header::CONTENT_TYPE;

/// Possible errors from [`RemoteClient`].
#[derive(thiserror::Error, Debug)]
pub enum RemoteClientError {
    /// Construction requires a non-empty collector token.
    #[error("collector token must not be empty")]
    EmptyToken,

    /// Building the underlying HTTP client failed.
    #[error("cannot build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The POST request failed after exhausting retries, or returned a non-retriable error
    /// status (`error_for_status`).
    #[error("request to collector failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Async HTTP client the [`EventsSender`](crate::EventsSender) ships envelopes through.\
/// Authenticates with HTTP Basic auth using the collector token as username and an empty
/// password, and retries transport/client errors with exponential backoff.
pub struct RemoteClient {
    client: reqwest::Client,
    token: String,
    max_attempts: usize,
}

impl RemoteClient {
    /// Builds a new [`RemoteClient`] for the given collector token.\
    /// Fails with [`RemoteClientError::EmptyToken`] if `token` is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, RemoteClientError> {
        let token = token.into();
        if token.is_empty() {
            return Err(RemoteClientError::EmptyToken);
        }

        let client = reqwest::Client::builder().build().map_err(RemoteClientError::Build)?;

        Ok(Self {
            client,
            token,
            max_attempts: 3,
        })
    }

    /// Overrides the default retry attempt count (3).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// POSTs `body` to `url` with `Content-Type: application/json` and HTTP Basic auth,
    /// retrying transport/client errors with exponential backoff. Suspends until the request
    /// terminates: success, exhausted retries, or a non-retriable status.
    pub async fn post(&self, url: &str, body: String) -> Result<(), RemoteClientError> {
        let attempt = || async {
            self.client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .basic_auth(&self.token, Some(""))
                .body(body.clone())
                .send()
                .await?
                .error_for_status()?;
            Ok::<(), reqwest::Error>(())
        };

        attempt
            .retry(ExponentialBuilder::default().with_max_times(self.max_attempts))
            .when(is_retriable)
            .await
            .map_err(RemoteClientError::Request)
    }

    /// Releases the underlying connection pool. `reqwest::Client` is reference-counted
    /// internally and tears itself down once the last clone drops; this exists so callers have
    /// an explicit lifecycle hook matching `spec.md` §4.4's `close()`.
    pub fn close(&self) {}
}

/// Transport/connect/timeout failures are retried; a non-2xx status surfaced via
/// `error_for_status` that isn't itself a connect/timeout error is treated as terminal.
fn is_retriable(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request()
}
