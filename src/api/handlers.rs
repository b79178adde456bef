//! HTTP handlers for the price fetcher endpoints.
//!
//! Handlers only extract input, call the decorated fetcher with the
//! request's [`RequestContext`] and shape the JSON response.

use crate::api::error::error_response;
use crate::api::state::AppState;
use crate::domain::{
    BatchPriceRequest, BatchPriceResponse, CoinInfo, ErrorResponse, FetchError, MarketStats,
    PriceResponse, RequestContext, SupportedTickersResponse,
};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize, IntoParams)]
pub struct TickerQuery {
    /// Ticker symbol, case-sensitive
    #[param(example = "BTC")]
    #[serde(default)]
    pub ticker: String,
}

fn ticker_from(query: Result<Query<TickerQuery>, QueryRejection>) -> Result<String, FetchError> {
    query
        .map(|Query(q)| q.ticker)
        .map_err(|rejection| FetchError::BadRequest(rejection.body_text()))
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Number of priced tickers
    pub tickers: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        tickers: state.data.ticker_count(),
    })
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "system",
    responses(
        (status = 200, description = "Prometheus metrics", content_type = "text/plain")
    )
)]
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

/// Get the USD price of a ticker
#[utoipa::path(
    get,
    path = "/price",
    params(TickerQuery),
    tag = "prices",
    responses(
        (status = 200, description = "Current price", body = PriceResponse),
        (status = 400, description = "Unsupported ticker", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(request_id = %ctx.request_id))]
pub async fn price_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    query: Result<Query<TickerQuery>, QueryRejection>,
) -> Result<Json<PriceResponse>, FetchError> {
    let ticker = ticker_from(query)?;
    let price = state.fetcher.fetch_price(&ctx, &ticker).await?;
    Ok(Json(PriceResponse::usd(ticker, price, Utc::now())))
}

/// Get market statistics derived from a ticker's price
#[utoipa::path(
    get,
    path = "/market",
    params(TickerQuery),
    tag = "prices",
    responses(
        (status = 200, description = "Market statistics", body = MarketStats),
        (status = 400, description = "Unsupported ticker", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(request_id = %ctx.request_id))]
pub async fn market_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    query: Result<Query<TickerQuery>, QueryRejection>,
) -> Result<Json<MarketStats>, FetchError> {
    let ticker = ticker_from(query)?;
    state.fetcher.fetch_market_stats(&ctx, &ticker).await.map(Json)
}

/// Get descriptive information about a coin
#[utoipa::path(
    get,
    path = "/info",
    params(TickerQuery),
    tag = "coins",
    responses(
        (status = 200, description = "Coin information", body = CoinInfo),
        (status = 400, description = "Unsupported ticker", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(request_id = %ctx.request_id))]
pub async fn info_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    query: Result<Query<TickerQuery>, QueryRejection>,
) -> Result<Json<CoinInfo>, FetchError> {
    let ticker = ticker_from(query)?;
    state.fetcher.fetch_coin_info(&ctx, &ticker).await.map(Json)
}

/// List every supported ticker
#[utoipa::path(
    get,
    path = "/tickers",
    tag = "coins",
    responses(
        (status = 200, description = "Sorted ticker list", body = SupportedTickersResponse)
    )
)]
#[instrument(skip_all, fields(request_id = %ctx.request_id))]
pub async fn tickers_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Json<SupportedTickersResponse>, FetchError> {
    state.fetcher.fetch_supported_tickers(&ctx).await.map(Json)
}

/// Get prices for several tickers at once
///
/// Fails as a whole if any ticker is unsupported.
#[utoipa::path(
    post,
    path = "/batch",
    request_body = BatchPriceRequest,
    tag = "prices",
    responses(
        (status = 200, description = "Prices in request order", body = BatchPriceResponse),
        (status = 400, description = "Wrong method, malformed body or unsupported ticker", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(request_id = %ctx.request_id))]
pub async fn batch_handler(
    method: Method,
    ctx: RequestContext,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BatchPriceResponse>, FetchError> {
    if method != Method::POST {
        return Err(FetchError::BadRequest(format!(
            "method {} not allowed, use POST",
            method
        )));
    }
    let request: BatchPriceRequest = serde_json::from_slice(&body)
        .map_err(|e| FetchError::BadRequest(format!("invalid batch request body: {}", e)))?;
    state
        .fetcher
        .batch_fetch_price(&ctx, &request.tickers)
        .await
        .map(Json)
}

pub async fn method_not_allowed_handler(method: Method) -> Response {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("method {} not allowed", method),
    )
}

pub async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "route not found")
}
