use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

static SEQ: AtomicU64 = AtomicU64::new(0);

/// Reads the request id set by [`request_id`], or `-` outside the middleware.
pub fn request_id_of(headers: &HeaderMap) -> &str {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
}

fn incoming_id(headers: &HeaderMap) -> Option<String> {
    let v = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    (!v.is_empty() && v.len() <= 128).then(|| v.to_string())
}

fn new_id() -> String {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1000);
    format!("req-{nanos}-{}", SEQ.fetch_add(1, Ordering::Relaxed))
}

/// Propagates the caller's `X-Request-Id` or assigns one, on both the request
/// (for handlers' logs) and the response.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = incoming_id(req.headers()).unwrap_or_else(new_id);
    // Ids are either visible ASCII from a parsed header or generated ASCII.
    let value = HeaderValue::from_str(&id).ok();

    if let Some(v) = &value {
        req.headers_mut().insert(REQUEST_ID_HEADER, v.clone());
    }
    let mut res = next.run(req).await;
    if let Some(v) = value {
        res.headers_mut().insert(REQUEST_ID_HEADER, v);
    }
    res
}
