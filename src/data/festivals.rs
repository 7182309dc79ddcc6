//! Festivals API client
//!
//! Fetches the flat festival list from the festivals REST API and decodes it
//! into [`RawFestival`] records.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::backoff::BackoffConfig;
use super::transport::{
    get_with_backoff, HttpExchange, HttpReply, ReqwestExchange, DEFAULT_REQUEST_TIMEOUT,
};
use super::RawFestival;

/// Default base URI of the festivals API
pub const DEFAULT_REST_URI: &str = "http://eacodingtest.digital.energyaustralia.com.au/api/v1/";

/// Path of the festivals resource below the base URI
const FESTIVALS_PATH: &str = "festivals";

/// Errors that can occur when fetching festival data
#[derive(Debug, Error)]
pub enum FestivalsError {
    /// The response body is not a JSON array of festivals
    ///
    /// `status` is the status of the final response, so a throttled or failed
    /// request that ran out of retries can be told apart from a malformed
    /// successful response.
    #[error("Failed to parse festivals response (HTTP {status}): {source}")]
    Parse {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },

    /// The request could not be sent or the body could not be read
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The configured base URI is not a valid URL
    #[error("Invalid festivals API URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },
}

impl FestivalsError {
    /// Whether this error came from decoding the response body
    pub fn is_parse_error(&self) -> bool {
        matches!(self, FestivalsError::Parse { .. })
    }
}

/// Decodes a festivals API response body
///
/// A `null` body decodes to no festivals. An empty body is handed to the
/// decoder like any other and fails as malformed JSON.
pub fn parse_festivals(body: &str) -> Result<Vec<RawFestival>, serde_json::Error> {
    let festivals: Option<Vec<RawFestival>> = serde_json::from_str(body)?;
    Ok(festivals.unwrap_or_default())
}

/// Builds `{base}/festivals`, treating the base as a directory
pub fn festivals_url(base: &str) -> Result<Url, FestivalsError> {
    let invalid = |reason: String| FestivalsError::InvalidUri {
        uri: base.to_string(),
        reason,
    };

    let mut base_url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    if base_url.cannot_be_a_base() {
        return Err(invalid("URI cannot be used as a base".to_string()));
    }
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }

    base_url
        .join(FESTIVALS_PATH)
        .map_err(|e| invalid(e.to_string()))
}

/// Source of the raw festival list
///
/// The cache only depends on this trait, so tests can count and script fetches.
#[async_trait]
pub trait FestivalSource: Send + Sync {
    async fn fetch_festivals(&self) -> Result<Vec<RawFestival>, FestivalsError>;
}

/// Client for fetching festivals from the festivals REST API
#[derive(Debug)]
pub struct FestivalsClient<E = ReqwestExchange> {
    exchange: E,
    url: Url,
    backoff: BackoffConfig,
    cancel: CancellationToken,
}

impl FestivalsClient<ReqwestExchange> {
    /// Creates a client for the API at `base_uri` with default timeout
    pub fn new(base_uri: &str, backoff: BackoffConfig) -> Result<Self, FestivalsError> {
        let exchange = ReqwestExchange::new(DEFAULT_REQUEST_TIMEOUT)?;
        Self::with_exchange(exchange, base_uri, backoff)
    }
}

impl<E: HttpExchange> FestivalsClient<E> {
    /// Creates a client that sends requests through a custom exchange
    pub fn with_exchange(
        exchange: E,
        base_uri: &str,
        backoff: BackoffConfig,
    ) -> Result<Self, FestivalsError> {
        Ok(Self {
            exchange,
            url: festivals_url(base_uri)?,
            backoff,
            cancel: CancellationToken::new(),
        })
    }

    /// Uses `cancel` to cut backoff waits short
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The festivals resource URL this client requests
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetches and decodes the festival list
    ///
    /// # Returns
    /// * `Ok(Vec<RawFestival>)` - Festivals in API order
    /// * `Err(FestivalsError::Parse)` - If the final response body is not valid festival JSON
    /// * `Err(FestivalsError::Request)` - If the request could not be completed
    pub async fn get_festivals(&self) -> Result<Vec<RawFestival>, FestivalsError> {
        let reply = get_with_backoff(&self.exchange, &self.url, &self.backoff, &self.cancel).await?;
        let status = reply.status();
        let body = reply.text().await?;

        if body.is_empty() {
            info!(%status, "Empty response string received from the API");
        } else {
            debug!(%status, body = %body, "Response from the API");
        }

        let festivals =
            parse_festivals(&body).map_err(|source| FestivalsError::Parse { status, source })?;
        debug!(count = festivals.len(), "Decoded festivals");
        Ok(festivals)
    }
}

#[async_trait]
impl<T: FestivalSource + ?Sized> FestivalSource for std::sync::Arc<T> {
    async fn fetch_festivals(&self) -> Result<Vec<RawFestival>, FestivalsError> {
        (**self).fetch_festivals().await
    }
}

#[async_trait]
impl<E: HttpExchange> FestivalSource for FestivalsClient<E> {
    async fn fetch_festivals(&self) -> Result<Vec<RawFestival>, FestivalsError> {
        self.get_festivals().await
    }
}
