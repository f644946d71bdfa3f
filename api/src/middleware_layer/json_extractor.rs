//! Rewrites axum's plain-text body rejections into the JSON error envelope.
//!
//! The `Json` extractor rejects before the handler runs, so malformed
//! payloads never reach the document store.

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};

use tracing::warn;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Request fields used to recognise a path when the message carries none.
const KNOWN_FIELDS: [&str; 2] = ["collection_name", "query"];

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = match axum::body::to_bytes(body, 64 * 1024).await {
        Ok(b) => b,
        Err(err) => {
            warn!(error = %err, status = %parts.status, "could not read rejection body");
            Bytes::new()
        }
    };
    (parts, bytes)
}

/// Extracts the offending field from a serde/axum rejection message.
///
/// Handles `missing field `x``, `x: invalid type ...` (path-prefixed data
/// errors) and falls back to scanning for known field names.
pub(crate) fn field_path(msg: &str) -> Option<String> {
    if let Some(rest) = msg.split("missing field `").nth(1) {
        if let Some(end) = rest.find('`') {
            return Some(rest[..end].to_string());
        }
    }

    let tail = msg.rsplit("target type: ").next().unwrap_or(msg);
    if let Some((path, _)) = tail.split_once(": ") {
        if !path.is_empty() && !path.contains(char::is_whitespace) && path != "." {
            return Some(path.to_string());
        }
    }

    KNOWN_FIELDS
        .iter()
        .find(|f| msg.contains(&format!("`{f}`")) || msg.contains(&format!("{f}:")))
        .map(|f| f.to_string())
}

pub(crate) fn hint_for(status: StatusCode, msg: &str) -> Option<String> {
    if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
        Some("Send the body with `Content-Type: application/json`.".into())
    } else if msg.contains("missing field") {
        Some("This field is required.".into())
    } else if msg.contains("expected a string") {
        Some("Expected a JSON string for this field.".into())
    } else if msg.contains("expected struct")
        || msg.contains("expected a map")
        || msg.contains("expected a JSON object")
    {
        Some("Expected a JSON object like {\"query\": \"...\", \"collection_name\": \"...\"}.".into())
    } else if status == StatusCode::BAD_REQUEST {
        Some("The body is not valid JSON.".into())
    } else {
        None
    }
}

fn is_json(parts: &axum::http::response::Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    let code = match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::UNPROCESSABLE_ENTITY => "VALIDATION_ERROR",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        _ => return res,
    };

    let (mut parts, bytes) = take_body(res).await;
    if is_json(&parts) {
        return Response::from_parts(parts, Body::from(bytes));
    }

    let original = String::from_utf8_lossy(&bytes);
    let message = original.trim();
    let details = vec![ApiErrorDetail {
        path: field_path(message),
        hint: hint_for(status, message),
    }];

    let envelope = ApiResponse::<()>::error(code, message, details);
    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Response::from_parts(parts, Body::from(body))
}
