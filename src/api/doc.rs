use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // System
        crate::api::handlers::health_handler,
        crate::api::handlers::metrics_handler,
        // Price fetcher
        crate::api::handlers::price_handler,
        crate::api::handlers::market_handler,
        crate::api::handlers::info_handler,
        crate::api::handlers::tickers_handler,
        crate::api::handlers::batch_handler
    ),
    components(
        schemas(
            crate::api::handlers::HealthResponse,
            crate::domain::PriceResponse,
            crate::domain::MarketStats,
            crate::domain::CoinInfo,
            crate::domain::SupportedTickersResponse,
            crate::domain::BatchPriceRequest,
            crate::domain::BatchPriceResponse,
            crate::domain::ErrorResponse
        )
    ),
    tags(
        (name = "system", description = "Health checks and metrics"),
        (name = "prices", description = "Prices and derived market statistics"),
        (name = "coins", description = "Coin metadata and supported tickers")
    ),
    info(
        title = "Price Fetcher API",
        version = "0.1.0",
        description = "JSON API serving cryptocurrency prices, market statistics and coin metadata from in-memory tables."
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in ["/price", "/market", "/info", "/tickers", "/batch", "/health", "/metrics"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
