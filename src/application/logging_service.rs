//! Logging decorator around any [`PriceFetcher`].
//!
//! Emits one `info` event per call tagged with the request's correlation id.

use crate::domain::{
    BatchPriceResponse, CoinInfo, FetchResult, MarketStats, PriceFetcher, RequestContext,
    SupportedTickersResponse,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Logs a warning if dropped before [`CallLog::finish`], i.e. when the caller
/// abandoned the request mid-call.
struct CallLog<'a> {
    ctx: &'a RequestContext,
    method: &'static str,
    start: Instant,
    finished: bool,
}

impl<'a> CallLog<'a> {
    fn begin(ctx: &'a RequestContext, method: &'static str) -> Self {
        Self {
            ctx,
            method,
            start: Instant::now(),
            finished: false,
        }
    }

    fn finish(mut self) -> Duration {
        self.finished = true;
        self.start.elapsed()
    }
}

impl Drop for CallLog<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                request_id = %self.ctx.request_id,
                method = self.method,
                took = ?self.start.elapsed(),
                "call cancelled before completion"
            );
        }
    }
}

/// Decorator logging every delegated call.
pub struct LoggingService {
    next: Arc<dyn PriceFetcher>,
}

impl LoggingService {
    pub fn new(next: Arc<dyn PriceFetcher>) -> Self {
        Self { next }
    }
}

#[async_trait]
impl PriceFetcher for LoggingService {
    async fn fetch_price(&self, ctx: &RequestContext, ticker: &str) -> FetchResult<f64> {
        let log = CallLog::begin(ctx, "FetchPrice");
        let result = self.next.fetch_price(ctx, ticker).await;
        let took = log.finish();
        info!(
            request_id = %ctx.request_id,
            method = "FetchPrice",
            ticker,
            ?took,
            err = ?result.as_ref().err(),
            price = ?result.as_ref().ok(),
            "fetch_price"
        );
        result
    }

    async fn fetch_market_stats(
        &self,
        ctx: &RequestContext,
        ticker: &str,
    ) -> FetchResult<MarketStats> {
        let log = CallLog::begin(ctx, "FetchMarketStats");
        let result = self.next.fetch_market_stats(ctx, ticker).await;
        let took = log.finish();
        info!(
            request_id = %ctx.request_id,
            method = "FetchMarketStats",
            ticker,
            ?took,
            err = ?result.as_ref().err(),
            "fetch_market_stats"
        );
        result
    }

    async fn fetch_coin_info(&self, ctx: &RequestContext, ticker: &str) -> FetchResult<CoinInfo> {
        let log = CallLog::begin(ctx, "FetchCoinInfo");
        let result = self.next.fetch_coin_info(ctx, ticker).await;
        let took = log.finish();
        info!(
            request_id = %ctx.request_id,
            method = "FetchCoinInfo",
            ticker,
            ?took,
            err = ?result.as_ref().err(),
            "fetch_coin_info"
        );
        result
    }

    async fn fetch_supported_tickers(
        &self,
        ctx: &RequestContext,
    ) -> FetchResult<SupportedTickersResponse> {
        let log = CallLog::begin(ctx, "FetchSupportedTickers");
        let result = self.next.fetch_supported_tickers(ctx).await;
        let took = log.finish();
        info!(
            request_id = %ctx.request_id,
            method = "FetchSupportedTickers",
            ?took,
            err = ?result.as_ref().err(),
            "fetch_supported_tickers"
        );
        result
    }

    async fn batch_fetch_price(
        &self,
        ctx: &RequestContext,
        tickers: &[String],
    ) -> FetchResult<BatchPriceResponse> {
        let log = CallLog::begin(ctx, "BatchFetchPrice");
        let result = self.next.batch_fetch_price(ctx, tickers).await;
        let took = log.finish();
        info!(
            request_id = %ctx.request_id,
            method = "BatchFetchPrice",
            ?tickers,
            ?took,
            err = ?result.as_ref().err(),
            "batch_fetch_price"
        );
        result
    }
}
