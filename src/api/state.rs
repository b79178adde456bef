use crate::domain::{MarketData, PriceFetcher};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn PriceFetcher>,
    /// Tables behind `fetcher`, read directly by `/health`
    pub data: Arc<MarketData>,
    /// Installed Prometheus recorder, rendered by `/metrics`
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn PriceFetcher>, data: Arc<MarketData>) -> Self {
        Self {
            fetcher,
            data,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
