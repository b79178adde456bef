use crate::api::context::request_id_of;
use crate::api::doc::ApiDoc;
use crate::api::handlers::{
    batch_handler, health_handler, info_handler, market_handler, method_not_allowed_handler,
    metrics_handler, not_found_handler, price_handler, tickers_handler,
};
use crate::api::state::AppState;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::{
    middleware::map_request,
    routing::{any, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins == "*" {
        return CorsLayer::permissive();
    }

    // Parse comma-separated origins, filter out invalid ones
    let origin_values: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if origin_values.is_empty() {
        tracing::warn!("No valid CORS origins found, falling back to permissive CORS");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origin_values))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Drop any caller-supplied correlation id so every request gets a fresh one.
async fn strip_client_request_id(mut request: Request) -> Request {
    request.headers_mut().remove("x-request-id");
    request
}

pub fn create_router(state: AppState, allowed_origins: &str) -> Router {
    // The request id layer must sit outside the trace layer so the span can
    // carry the id. The id is not propagated to the response.
    let middleware = ServiceBuilder::new()
        .layer(map_request(strip_client_request_id))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request_id_of(request.extensions()).unwrap_or("-");
                    tracing::span!(
                        Level::INFO,
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let status = response.status().as_u16();
                        metrics::counter!(
                            "http_requests_total",
                            "status_class" => format!("{}xx", status / 100)
                        )
                        .increment(1);
                        tracing::debug!(
                            status,
                            latency_ms = latency.as_millis() as u64,
                            "response"
                        );
                    },
                ),
        )
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors_layer(allowed_origins));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // System endpoints
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Price fetcher API
        .route("/price", get(price_handler).fallback(method_not_allowed_handler))
        .route("/market", get(market_handler).fallback(method_not_allowed_handler))
        .route("/info", get(info_handler).fallback(method_not_allowed_handler))
        .route("/tickers", get(tickers_handler).fallback(method_not_allowed_handler))
        // Method is checked in the handler so that a wrong method is a 400
        .route("/batch", any(batch_handler))
        .fallback(not_found_handler)
        .layer(middleware)
        .with_state(state)
}
