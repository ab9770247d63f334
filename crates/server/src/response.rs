//! JSON response envelope.
//!
//! Successful responses are wrapped into [`ApiResponse`], while error responses
//! produced by handler errors and extractor rejections are rewritten by
//! [`error_envelope`], so that every response body carries a `success` flag.

use axum::{
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::error;

/// Successful JSON response body.
#[derive(Serialize)]
pub(crate) struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    /// Wrap the provided data.
    pub(crate) fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
            message: None,
        }
    }

    /// Attach a count of returned items.
    pub(crate) fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attach a human-readable message.
    pub(crate) fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Rewrite non-successful response bodies into `{"success": false, "code", "error"}` objects.
pub(crate) async fn error_envelope<B>(req: Request<B>, next: Next<B>) -> Response {
    let response = next.run(req).await;
    let status = response.status();

    if status.is_success() {
        return response;
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|value| value.as_bytes().starts_with(b"application/json"))
        .unwrap_or(false);

    let (mut parts, body) = response.into_parts();

    let bytes = match hyper::body::to_bytes(body).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(%err, "unable to read error response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let parsed = is_json
        .then(|| serde_json::from_slice::<Value>(&bytes).ok())
        .flatten();

    let mut object = match parsed {
        Some(Value::Object(object)) => object,
        _ => {
            let text = String::from_utf8_lossy(&bytes);

            let message = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                text.into_owned()
            };

            let mut object = Map::new();
            object.insert(String::from("code"), json!(status.as_u16()));
            object.insert(String::from("error"), Value::String(message));
            object
        }
    };

    object.insert(String::from("success"), Value::Bool(false));

    parts.headers.remove(CONTENT_LENGTH);
    parts.headers.remove(CONTENT_TYPE);

    (parts, Json(Value::Object(object))).into_response()
}
