pub mod logging_service;
pub mod metrics_service;
pub mod price_service;

pub use logging_service::LoggingService;
pub use metrics_service::MetricsService;
pub use price_service::{LatencyConfig, PriceService};

use crate::domain::{MarketData, PriceFetcher};
use std::sync::Arc;

/// Build the production chain: logging wrapping metrics wrapping the base
/// service.
pub fn build_fetcher(data: Arc<MarketData>, latency: LatencyConfig) -> Arc<dyn PriceFetcher> {
    let base: Arc<dyn PriceFetcher> = Arc::new(PriceService::new(data, latency));
    let metered: Arc<dyn PriceFetcher> = Arc::new(MetricsService::new(base));
    Arc::new(LoggingService::new(metered))
}
