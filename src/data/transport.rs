//! HTTP transport with exponential backoff on non-success responses
//!
//! The [`HttpExchange`] and [`HttpReply`] traits separate the retry loop from
//! reqwest so the loop can be driven by scripted replies in tests.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::backoff::BackoffConfig;

/// Default timeout for a single request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A response received from the remote API
#[async_trait]
pub trait HttpReply: Send + Sized {
    /// HTTP status of the response
    fn status(&self) -> StatusCode;

    /// Consumes the response and reads its body as text
    async fn text(self) -> Result<String, reqwest::Error>;

    /// Discards the response without reading the body
    fn close(self);
}

/// Issues GET requests against the remote API
#[async_trait]
pub trait HttpExchange: Send + Sync {
    type Reply: HttpReply;

    async fn get(&self, url: &Url) -> Result<Self::Reply, reqwest::Error>;
}

#[async_trait]
impl HttpReply for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }

    async fn text(self) -> Result<String, reqwest::Error> {
        reqwest::Response::text(self).await
    }

    fn close(self) {
        drop(self);
    }
}

/// [`HttpExchange`] backed by a reqwest [`Client`] asking for JSON
#[derive(Debug, Clone)]
pub struct ReqwestExchange {
    client: Client,
}

impl ReqwestExchange {
    /// Creates an exchange whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpExchange for ReqwestExchange {
    type Reply = reqwest::Response;

    async fn get(&self, url: &Url) -> Result<Self::Reply, reqwest::Error> {
        self.client
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
    }
}

/// Sends a GET request, retrying with exponential backoff until it succeeds
///
/// # Behavior
/// - A `200 OK` reply is returned immediately
/// - Any other status waits for the next backoff interval, then closes the
///   reply and sends the request again
/// - Once the backoff sequence stops, the last reply is returned as is
/// - If `cancel` fires during a wait, the last reply is returned as is
/// - Network errors are returned without retrying
pub async fn get_with_backoff<E: HttpExchange>(
    exchange: &E,
    url: &Url,
    backoff: &BackoffConfig,
    cancel: &CancellationToken,
) -> Result<E::Reply, reqwest::Error> {
    debug!(%url, "Invoking API");
    let mut execution = backoff.start();

    loop {
        let reply = exchange.get(url).await?;
        let status = reply.status();

        if status == StatusCode::OK {
            debug!(%url, "Got a successful response");
            return Ok(reply);
        }

        let Some(wait) = execution.next_backoff() else {
            info!(%url, %status, "Backoff exhausted, giving up");
            return Ok(reply);
        };

        info!(
            %url,
            %status,
            "Request failed. Backing off for {}ms",
            wait.as_millis()
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                info!(%url, "Backoff wait cancelled");
                return Ok(reply);
            }
            _ = tokio::time::sleep(wait) => {}
        }

        reply.close();
    }
}
