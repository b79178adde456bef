//! HTTP client for the price fetcher API.
//!
//! Mirrors the five server endpoints as typed async calls and decodes the
//! JSON bodies into the same domain structs the server produces.

use crate::domain::{
    BatchPriceRequest, BatchPriceResponse, CoinInfo, MarketStats, PriceResponse,
    SupportedTickersResponse,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("price-fetcher-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ClientError {
    /// Any status other than 200. The body is not inspected.
    #[error("service responded with non-OK status: {0}")]
    Status(u16),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Status code observed on the response, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Typed client for a running price fetcher server.
///
/// ```no_run
/// use price_fetcher::infrastructure::PriceClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PriceClient::new("http://localhost:3000")?;
/// let quote = client.fetch_price("BTC").await?;
/// println!("{}: {} {}", quote.ticker, quote.price, quote.currency);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PriceClient {
    client: Client,
    endpoint: String,
}

impl PriceClient {
    /// Create a client for the server at `endpoint` (e.g. `http://localhost:3000`).
    pub fn new(endpoint: &str) -> ClientResult<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(endpoint, client))
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(endpoint: &str, client: Client) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.header("Accept", "application/json").send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!("Price service responded with {}", status);
            return Err(ClientError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_with_ticker<T: DeserializeOwned>(
        &self,
        path: &str,
        ticker: &str,
    ) -> ClientResult<T> {
        let request = self.client.get(self.url(path)).query(&[("ticker", ticker)]);
        self.send(request).await
    }

    /// GET /price?ticker=TICKER
    pub async fn fetch_price(&self, ticker: &str) -> ClientResult<PriceResponse> {
        self.get_with_ticker("/price", ticker).await
    }

    /// GET /market?ticker=TICKER
    pub async fn fetch_market_stats(&self, ticker: &str) -> ClientResult<MarketStats> {
        self.get_with_ticker("/market", ticker).await
    }

    /// GET /info?ticker=TICKER
    pub async fn fetch_coin_info(&self, ticker: &str) -> ClientResult<CoinInfo> {
        self.get_with_ticker("/info", ticker).await
    }

    /// GET /tickers
    pub async fn fetch_supported_tickers(&self) -> ClientResult<SupportedTickersResponse> {
        self.send(self.client.get(self.url("/tickers"))).await
    }

    /// POST /batch with body `{"tickers": [...]}`
    pub async fn batch_fetch_price(&self, tickers: &[String]) -> ClientResult<BatchPriceResponse> {
        let body = BatchPriceRequest {
            tickers: tickers.to_vec(),
        };
        self.send(self.client.post(self.url("/batch")).json(&body))
            .await
    }
}
