//! Mapping of service errors onto the JSON error envelope.

use crate::domain::{ErrorResponse, FetchError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// JSON error body with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            code: status.as_u16(),
            message: message.into(),
        }),
    )
        .into_response()
}

/// Every fetch error is a 400; the message is the error text verbatim.
impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        error_response(StatusCode::BAD_REQUEST, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_not_found_maps_to_400() {
        let response = FetchError::NotFound("ZZZ".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.code, 400);
        assert_eq!(err.message, "ticker (ZZZ) is not supported");
    }

    #[tokio::test]
    async fn test_bad_request_message_verbatim() {
        let response = FetchError::BadRequest("expected value at line 1".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.message, "expected value at line 1");
    }
}
