//! Base fetch service answering from the in-memory tables.
//!
//! Every lookup sleeps for a configurable delay standing in for an upstream
//! call before touching the tables.

use crate::domain::{
    BatchPriceResponse, CoinInfo, FetchError, FetchResult, MarketData, MarketStats, PriceFetcher,
    PriceResponse, RequestContext, SupportedTickersResponse,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const MARKET_CAP_MULTIPLIER: f64 = 1_000_000.0;
const VOLUME_24H_MULTIPLIER: f64 = 50_000.0;
const CHANGE_24H_PCT: f64 = -1.5;
const HIGH_24H_FACTOR: f64 = 1.03;
const LOW_24H_FACTOR: f64 = 0.97;
const CIRCULATING_SUPPLY: f64 = 1_000_000.0;

/// Simulated upstream latency per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LatencyConfig {
    /// Delay for price, market stats and batch lookups (default: 100)
    #[serde(default = "default_price_ms")]
    pub price_ms: u64,
    /// Delay for coin info lookups (default: 50)
    #[serde(default = "default_coin_info_ms")]
    pub coin_info_ms: u64,
}

fn default_price_ms() -> u64 {
    100
}
fn default_coin_info_ms() -> u64 {
    50
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            price_ms: default_price_ms(),
            coin_info_ms: default_coin_info_ms(),
        }
    }
}

impl LatencyConfig {
    /// No simulated delay at all.
    pub fn none() -> Self {
        Self {
            price_ms: 0,
            coin_info_ms: 0,
        }
    }
}

/// Fetcher backed by [`MarketData`].
#[derive(Clone)]
pub struct PriceService {
    data: Arc<MarketData>,
    latency: LatencyConfig,
}

impl PriceService {
    pub fn new(data: Arc<MarketData>, latency: LatencyConfig) -> Self {
        info!(
            "Initialized PriceService with {} tickers ({}ms price latency, {}ms info latency)",
            data.ticker_count(),
            latency.price_ms,
            latency.coin_info_ms
        );
        Self { data, latency }
    }

    async fn simulate_latency(millis: u64) {
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    fn lookup_price(&self, ticker: &str) -> FetchResult<f64> {
        self.data
            .price(ticker)
            .ok_or_else(|| FetchError::NotFound(ticker.to_string()))
    }
}

#[async_trait]
impl PriceFetcher for PriceService {
    async fn fetch_price(&self, _ctx: &RequestContext, ticker: &str) -> FetchResult<f64> {
        Self::simulate_latency(self.latency.price_ms).await;
        self.lookup_price(ticker)
    }

    async fn fetch_market_stats(
        &self,
        _ctx: &RequestContext,
        ticker: &str,
    ) -> FetchResult<MarketStats> {
        Self::simulate_latency(self.latency.price_ms).await;
        let price = self.lookup_price(ticker)?;
        Ok(MarketStats {
            ticker: ticker.to_string(),
            price,
            market_cap: price * MARKET_CAP_MULTIPLIER,
            volume_24h: price * VOLUME_24H_MULTIPLIER,
            change_24h: CHANGE_24H_PCT,
            high_24h: price * HIGH_24H_FACTOR,
            low_24h: price * LOW_24H_FACTOR,
            circ_supply: CIRCULATING_SUPPLY,
            timestamp: Utc::now(),
        })
    }

    async fn fetch_coin_info(&self, _ctx: &RequestContext, ticker: &str) -> FetchResult<CoinInfo> {
        Self::simulate_latency(self.latency.coin_info_ms).await;
        let profile = self
            .data
            .profile(ticker)
            .ok_or_else(|| FetchError::NotFound(ticker.to_string()))?;
        Ok(CoinInfo {
            ticker: ticker.to_string(),
            name: profile.name.clone(),
            category: profile.category.clone(),
            description: profile.description.clone(),
            tags: profile.tags.clone(),
            website: profile.website.clone(),
        })
    }

    async fn fetch_supported_tickers(
        &self,
        _ctx: &RequestContext,
    ) -> FetchResult<SupportedTickersResponse> {
        let tickers = self.data.sorted_tickers();
        Ok(SupportedTickersResponse {
            count: tickers.len(),
            tickers,
        })
    }

    async fn batch_fetch_price(
        &self,
        _ctx: &RequestContext,
        tickers: &[String],
    ) -> FetchResult<BatchPriceResponse> {
        Self::simulate_latency(self.latency.price_ms).await;
        let now = Utc::now();
        let prices = tickers
            .iter()
            .map(|ticker| {
                self.lookup_price(ticker)
                    .map(|price| PriceResponse::usd(ticker.as_str(), price, now))
            })
            .collect::<FetchResult<Vec<_>>>()?;
        Ok(BatchPriceResponse {
            prices,
            timestamp: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QUOTE_CURRENCY;

    fn service() -> PriceService {
        PriceService::new(Arc::new(MarketData::builtin()), LatencyConfig::none())
    }

    fn ctx() -> RequestContext {
        RequestContext::new("test")
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[tokio::test]
    async fn test_fetch_price_every_ticker() {
        let data = MarketData::builtin();
        let svc = service();
        for ticker in data.sorted_tickers() {
            let price = svc.fetch_price(&ctx(), &ticker).await.unwrap();
            assert_eq!(Some(price), data.price(&ticker));
        }
    }

    #[tokio::test]
    async fn test_fetch_price_unknown_ticker() {
        let err = service().fetch_price(&ctx(), "ZZZ").await.unwrap_err();
        assert_eq!(err, FetchError::NotFound("ZZZ".to_string()));
        assert!(err.to_string().contains("not supported"));
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        assert!(service().fetch_price(&ctx(), "btc").await.is_err());
    }

    #[tokio::test]
    async fn test_market_stats_for_btc() {
        let stats = service().fetch_market_stats(&ctx(), "BTC").await.unwrap();
        assert_eq!(stats.ticker, "BTC");
        assert_eq!(stats.price, 20_000.0);
        assert_close(stats.market_cap, 20_000_000_000.0);
        assert_close(stats.volume_24h, 1_000_000_000.0);
        assert_close(stats.high_24h, 20_600.0);
        assert_close(stats.low_24h, 19_400.0);
        assert_eq!(stats.change_24h, -1.5);
        assert_eq!(stats.circ_supply, 1_000_000.0);
    }

    #[tokio::test]
    async fn test_market_stats_unknown_ticker() {
        let result = service().fetch_market_stats(&ctx(), "NOPE").await;
        assert!(matches!(result, Err(FetchError::NotFound(t)) if t == "NOPE"));
    }

    #[tokio::test]
    async fn test_coin_info() {
        let info = service().fetch_coin_info(&ctx(), "ETH").await.unwrap();
        assert_eq!(info.ticker, "ETH");
        assert_eq!(info.name, "Ethereum");
        assert_eq!(info.category, "Layer 1");
        assert_eq!(info.tags, vec!["smart-contracts", "pos"]);
        assert_eq!(info.website, "https://ethereum.org");
    }

    #[tokio::test]
    async fn test_coin_info_priced_but_unprofiled() {
        let svc = service();
        assert!(svc.fetch_price(&ctx(), "XMR").await.is_ok());
        tokio_test::assert_err!(svc.fetch_coin_info(&ctx(), "XMR").await);
    }

    #[tokio::test]
    async fn test_supported_tickers_sorted() {
        let resp = service().fetch_supported_tickers(&ctx()).await.unwrap();
        assert_eq!(resp.count, MarketData::builtin().ticker_count());
        assert_eq!(resp.count, resp.tickers.len());
        assert!(resp.tickers.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_shares_timestamp() {
        let tickers = vec!["ETH".to_string(), "BTC".to_string(), "ETH".to_string()];
        let resp = service().batch_fetch_price(&ctx(), &tickers).await.unwrap();
        let got: Vec<&str> = resp.prices.iter().map(|p| p.ticker.as_str()).collect();
        assert_eq!(got, vec!["ETH", "BTC", "ETH"]);
        assert_eq!(resp.prices[1].price, 20_000.0);
        for price in &resp.prices {
            assert_eq!(price.timestamp, resp.timestamp);
            assert_eq!(price.currency, QUOTE_CURRENCY);
        }
    }

    #[tokio::test]
    async fn test_batch_fails_atomically() {
        let tickers = vec!["BTC".to_string(), "NOPE".to_string(), "ZZZ".to_string()];
        let err = service().batch_fetch_price(&ctx(), &tickers).await.unwrap_err();
        assert_eq!(err, FetchError::NotFound("NOPE".to_string()));
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let resp = service().batch_fetch_price(&ctx(), &[]).await.unwrap();
        assert!(resp.prices.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_latency() {
        let svc = PriceService::new(Arc::new(MarketData::builtin()), LatencyConfig::default());

        let start = tokio::time::Instant::now();
        svc.fetch_price(&ctx(), "BTC").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(100));

        let start = tokio::time::Instant::now();
        svc.fetch_coin_info(&ctx(), "BTC").await.unwrap();
        let took = start.elapsed();
        assert!(took >= Duration::from_millis(50) && took < Duration::from_millis(100));

        let start = tokio::time::Instant::now();
        svc.fetch_supported_tickers(&ctx()).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(1));
    }
}
