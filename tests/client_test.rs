//! Round-trip tests: the typed client against a live server on an ephemeral port.

use price_fetcher::api::{create_router, AppState};
use price_fetcher::application::{build_fetcher, LatencyConfig, PriceService};
use price_fetcher::domain::{MarketData, PriceFetcher, RequestContext};
use price_fetcher::infrastructure::{ClientError, PriceClient};
use std::sync::Arc;

/// Serve the production router on 127.0.0.1:0 and return its base URL.
async fn spawn_server() -> String {
    let data = Arc::new(MarketData::builtin());
    let fetcher = build_fetcher(data.clone(), LatencyConfig::none());
    let app = create_router(AppState::new(fetcher, data), "*");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn reference_service() -> PriceService {
    PriceService::new(Arc::new(MarketData::builtin()), LatencyConfig::none())
}

#[tokio::test]
async fn test_fetch_price_round_trip() {
    let client = PriceClient::new(&spawn_server().await).unwrap();

    let quote = client.fetch_price("ETH").await.unwrap();
    assert_eq!(quote.ticker, "ETH");
    assert_eq!(quote.currency, "USD");

    let expected = reference_service()
        .fetch_price(&RequestContext::generate(), "ETH")
        .await
        .unwrap();
    assert_eq!(quote.price, expected);
}

#[tokio::test]
async fn test_tiny_prices_survive_json() {
    let client = PriceClient::new(&spawn_server().await).unwrap();
    assert_eq!(client.fetch_price("PEPE").await.unwrap().price, 0.0000015);
    assert_eq!(client.fetch_price("SHIB").await.unwrap().price, 0.000009);
}

#[tokio::test]
async fn test_market_stats_round_trip() {
    let client = PriceClient::new(&spawn_server().await).unwrap();
    let stats = client.fetch_market_stats("BTC").await.unwrap();

    let expected = reference_service()
        .fetch_market_stats(&RequestContext::generate(), "BTC")
        .await
        .unwrap();
    // Everything but the generation timestamp is deterministic.
    assert_eq!(stats.market_cap, expected.market_cap);
    assert_eq!(stats.volume_24h, expected.volume_24h);
    assert_eq!(stats.high_24h, expected.high_24h);
    assert_eq!(stats.low_24h, expected.low_24h);
    assert_eq!(stats.change_24h, expected.change_24h);
    assert_eq!(stats.circ_supply, expected.circ_supply);
}

#[tokio::test]
async fn test_coin_info_round_trip() {
    let client = PriceClient::new(&spawn_server().await).unwrap();
    let info = client.fetch_coin_info("DOGE").await.unwrap();

    let expected = reference_service()
        .fetch_coin_info(&RequestContext::generate(), "DOGE")
        .await
        .unwrap();
    assert_eq!(info, expected);
}

#[tokio::test]
async fn test_supported_tickers_round_trip() {
    let client = PriceClient::new(&spawn_server().await).unwrap();
    let resp = client.fetch_supported_tickers().await.unwrap();

    let expected = reference_service()
        .fetch_supported_tickers(&RequestContext::generate())
        .await
        .unwrap();
    assert_eq!(resp, expected);
}

#[tokio::test]
async fn test_batch_round_trip() {
    let client = PriceClient::new(&spawn_server().await).unwrap();
    let tickers = vec!["BTC".to_string(), "ETH".to_string()];
    let resp = client.batch_fetch_price(&tickers).await.unwrap();

    assert_eq!(resp.prices.len(), 2);
    assert_eq!(resp.prices[0].ticker, "BTC");
    assert_eq!(resp.prices[1].ticker, "ETH");
    assert!(resp.prices.iter().all(|p| p.timestamp == resp.timestamp));
}

#[tokio::test]
async fn test_unknown_ticker_surfaces_status() {
    let client = PriceClient::new(&spawn_server().await).unwrap();

    let err = client.fetch_price("ZZZ").await.unwrap_err();
    assert!(matches!(err, ClientError::Status(400)));
    assert_eq!(err.status(), Some(400));

    let err = client
        .batch_fetch_price(&["BTC".to_string(), "NOPE".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status(400)));
}

#[tokio::test]
async fn test_ticker_is_query_encoded() {
    let client = PriceClient::new(&spawn_server().await).unwrap();
    let err = client.fetch_price("BTC&ticker=ETH").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}
