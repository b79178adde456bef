//! Extractor building the [`RequestContext`] for each handler.

use crate::domain::RequestContext;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;
use tower_http::request_id::RequestId;

/// Correlation id assigned by `SetRequestIdLayer`, if the layer ran.
pub fn request_id_of(extensions: &axum::http::Extensions) -> Option<&str> {
    extensions
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(request_id_of(&parts.extensions)
            .map(RequestContext::new)
            .unwrap_or_else(RequestContext::generate))
    }
}
