use criterion::{black_box, criterion_group, criterion_main, Criterion};
use price_fetcher::application::{build_fetcher, LatencyConfig, PriceService};
use price_fetcher::domain::{MarketData, PriceFetcher, RequestContext};
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Base service lookups with latency disabled
fn benchmark_base_service(c: &mut Criterion) {
    let mut group = c.benchmark_group("base_service");
    let rt = runtime();
    let svc = PriceService::new(Arc::new(MarketData::builtin()), LatencyConfig::none());
    let ctx = RequestContext::new("bench");

    group.bench_function("fetch_price", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(svc.fetch_price(&ctx, "BTC").await.unwrap()) });
    });

    group.bench_function("fetch_market_stats", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(svc.fetch_market_stats(&ctx, "ETH").await.unwrap()) });
    });

    group.bench_function("fetch_supported_tickers", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(svc.fetch_supported_tickers(&ctx).await.unwrap()) });
    });

    let tickers: Vec<String> = MarketData::builtin().sorted_tickers();
    group.bench_function("batch_fetch_price_all", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(svc.batch_fetch_price(&ctx, &tickers).await.unwrap()) });
    });

    group.finish();
}

/// Overhead of the logging and metrics decorators over the base service
fn benchmark_decorated_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("decorated_chain");
    let rt = runtime();
    let chain = build_fetcher(Arc::new(MarketData::builtin()), LatencyConfig::none());
    let ctx = RequestContext::new("bench");

    group.bench_function("fetch_price", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(chain.fetch_price(&ctx, "BTC").await.unwrap()) });
    });

    group.bench_function("fetch_price_not_found", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(chain.fetch_price(&ctx, "ZZZ").await.is_err()) });
    });

    group.finish();
}

/// JSON encoding of the largest response
fn benchmark_json_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_operations");
    let rt = runtime();
    let svc = PriceService::new(Arc::new(MarketData::builtin()), LatencyConfig::none());
    let tickers = MarketData::builtin().sorted_tickers();
    let batch = rt
        .block_on(svc.batch_fetch_price(&RequestContext::new("bench"), &tickers))
        .unwrap();

    group.bench_function("batch_response_serialize", |b| {
        b.iter(|| black_box(serde_json::to_vec(&batch).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_base_service,
    benchmark_decorated_chain,
    benchmark_json_operations
);
criterion_main!(benches);
