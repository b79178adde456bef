//! Domain layer - Core entities and the fetcher capability trait.
//!
//! This module defines the domain model for the price fetcher API,
//! following clean architecture principles. It contains:
//! - The [`PriceFetcher`] trait every service layer implements
//! - Response entities returned by the API and decoded by the client
//! - The request-scoped [`RequestContext`] threaded through each call
//! - The immutable lookup tables in [`market_data`]

pub mod market_data;
pub use market_data::{CoinProfile, MarketData};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Currency code attached to every quoted price.
pub const QUOTE_CURRENCY: &str = "USD";

/// Errors returned by any [`PriceFetcher`] layer.
///
/// The HTTP layer does not distinguish the variants: both surface as
/// `400 Bad Request` with the `Display` text as the message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The ticker is absent from the lookup table.
    #[error("ticker ({0}) is not supported")]
    NotFound(String),
    /// The request itself was malformed (wrong method, unparsable body).
    #[error("{0}")]
    BadRequest(String),
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Request-scoped values carried explicitly through the service chain.
///
/// Built by the HTTP layer before the handler runs. The correlation id is
/// used for observability only and never sent back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// Context with a freshly generated correlation id.
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Single price quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceResponse {
    #[schema(example = "BTC")]
    pub ticker: String,
    #[schema(example = 20000.0)]
    pub price: f64,
    /// Always "USD"
    #[schema(example = "USD")]
    pub currency: String,
    pub timestamp: DateTime<Utc>,
}

impl PriceResponse {
    pub fn usd(ticker: impl Into<String>, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            currency: QUOTE_CURRENCY.to_string(),
            timestamp,
        }
    }
}

/// Market statistics derived from the unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MarketStats {
    pub ticker: String,
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    /// Percentage, e.g. -1.5
    #[serde(rename = "change_24h_pct")]
    pub change_24h: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    #[serde(rename = "circulating_supply")]
    pub circ_supply: f64,
    pub timestamp: DateTime<Utc>,
}

/// Descriptive record for a coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoinInfo {
    pub ticker: String,
    pub name: String,
    /// e.g. "Layer 1", "DeFi", "Stablecoin"
    pub category: String,
    pub description: String,
    pub tags: Vec<String>,
    pub website: String,
}

/// Every ticker with a known price, ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupportedTickersResponse {
    pub tickers: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchPriceRequest {
    pub tickers: Vec<String>,
}

/// Quotes for a batch of tickers, all stamped with the same timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchPriceResponse {
    pub prices: Vec<PriceResponse>,
    pub timestamp: DateTime<Utc>,
}

/// Error envelope returned on every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = 400)]
    pub code: u16,
    #[schema(example = "ticker (ZZZ) is not supported")]
    pub message: String,
}

/// The five read operations exposed by the API.
///
/// Implemented by the base [`crate::application::PriceService`] and by every
/// decorator wrapping it. Implementations must be thread-safe (`Send + Sync`)
/// since one instance serves all requests concurrently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Unit price in USD for `ticker`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] if the ticker has no price.
    async fn fetch_price(&self, ctx: &RequestContext, ticker: &str) -> FetchResult<f64>;

    /// Market statistics derived from the ticker's price.
    async fn fetch_market_stats(
        &self,
        ctx: &RequestContext,
        ticker: &str,
    ) -> FetchResult<MarketStats>;

    /// Descriptive record for `ticker`.
    async fn fetch_coin_info(&self, ctx: &RequestContext, ticker: &str) -> FetchResult<CoinInfo>;

    /// All priced tickers in ascending order.
    async fn fetch_supported_tickers(
        &self,
        ctx: &RequestContext,
    ) -> FetchResult<SupportedTickersResponse>;

    /// Quotes for every ticker in input order.
    ///
    /// # Errors
    ///
    /// Fails as a whole with [`FetchError::NotFound`] on the first unsupported
    /// ticker; no partial result is returned.
    async fn batch_fetch_price(
        &self,
        ctx: &RequestContext,
        tickers: &[String],
    ) -> FetchResult<BatchPriceResponse>;
}
