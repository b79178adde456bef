//! Metrics decorator around any [`PriceFetcher`].
//!
//! Records a call counter (labelled by outcome) and a duration histogram for
//! every delegated call through the `metrics` facade.

use crate::domain::{
    BatchPriceResponse, CoinInfo, FetchResult, MarketStats, PriceFetcher, RequestContext,
    SupportedTickersResponse,
};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub const CALLS_METRIC: &str = "price_fetcher_requests_total";
pub const DURATION_METRIC: &str = "price_fetcher_request_duration_seconds";

/// Outcome label attached to [`CALLS_METRIC`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Ok,
    Error,
    /// The caller dropped the future before it completed.
    Cancelled,
}

impl CallOutcome {
    pub fn of<T>(result: &FetchResult<T>) -> Self {
        if result.is_ok() {
            Self::Ok
        } else {
            Self::Error
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Records one call. Falls back to [`CallOutcome::Cancelled`] when dropped
/// without [`CallTimer::finish`].
struct CallTimer {
    method: &'static str,
    start: Instant,
    recorded: bool,
}

impl CallTimer {
    fn start(method: &'static str) -> Self {
        Self {
            method,
            start: Instant::now(),
            recorded: false,
        }
    }

    fn finish(mut self, outcome: CallOutcome) {
        self.record(outcome);
    }

    fn record(&mut self, outcome: CallOutcome) {
        self.recorded = true;
        metrics::counter!(CALLS_METRIC, "method" => self.method, "outcome" => outcome.as_str())
            .increment(1);
        metrics::histogram!(DURATION_METRIC, "method" => self.method)
            .record(self.start.elapsed().as_secs_f64());
    }
}

impl Drop for CallTimer {
    fn drop(&mut self) {
        if !self.recorded {
            debug!(method = self.method, "metrics: call cancelled");
            self.record(CallOutcome::Cancelled);
        }
    }
}

async fn timed<T, F>(method: &'static str, call: F) -> FetchResult<T>
where
    F: Future<Output = FetchResult<T>>,
{
    let timer = CallTimer::start(method);
    let result = call.await;
    timer.finish(CallOutcome::of(&result));
    result
}

/// Decorator recording per-call metrics, delegating unchanged.
pub struct MetricsService {
    next: Arc<dyn PriceFetcher>,
}

impl MetricsService {
    pub fn new(next: Arc<dyn PriceFetcher>) -> Self {
        Self { next }
    }
}

#[async_trait]
impl PriceFetcher for MetricsService {
    async fn fetch_price(&self, ctx: &RequestContext, ticker: &str) -> FetchResult<f64> {
        let result = timed("FetchPrice", self.next.fetch_price(ctx, ticker)).await;
        debug!(
            method = "FetchPrice",
            ticker,
            price = ?result.as_ref().ok(),
            err = ?result.as_ref().err(),
            "metrics"
        );
        result
    }

    async fn fetch_market_stats(
        &self,
        ctx: &RequestContext,
        ticker: &str,
    ) -> FetchResult<MarketStats> {
        let result = timed("FetchMarketStats", self.next.fetch_market_stats(ctx, ticker)).await;
        debug!(method = "FetchMarketStats", ticker, err = ?result.as_ref().err(), "metrics");
        result
    }

    async fn fetch_coin_info(&self, ctx: &RequestContext, ticker: &str) -> FetchResult<CoinInfo> {
        let result = timed("FetchCoinInfo", self.next.fetch_coin_info(ctx, ticker)).await;
        debug!(method = "FetchCoinInfo", ticker, err = ?result.as_ref().err(), "metrics");
        result
    }

    async fn fetch_supported_tickers(
        &self,
        ctx: &RequestContext,
    ) -> FetchResult<SupportedTickersResponse> {
        let result = timed("FetchSupportedTickers", self.next.fetch_supported_tickers(ctx)).await;
        debug!(method = "FetchSupportedTickers", err = ?result.as_ref().err(), "metrics");
        result
    }

    async fn batch_fetch_price(
        &self,
        ctx: &RequestContext,
        tickers: &[String],
    ) -> FetchResult<BatchPriceResponse> {
        let result = timed("BatchFetchPrice", self.next.batch_fetch_price(ctx, tickers)).await;
        debug!(method = "BatchFetchPrice", ?tickers, err = ?result.as_ref().err(), "metrics");
        result
    }
}
