//! Whitespace trimming for request input.
//!
//! Trims leading and trailing whitespace from every string in JSON bodies, every
//! value in the query string and every value in urlencoded form bodies before the
//! handlers run, so validation sees the cleaned values. JSON that fails to parse and
//! empty bodies pass through untouched.

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use url::form_urlencoded;

use crate::http::response::{ApiError, CODE_VALIDATION};

/// Recursively trim every string inside a JSON value. Keys are left as they are.
pub fn trim_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        Value::Array(items) => Value::Array(items.into_iter().map(trim_value).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, trim_value(v))).collect()),
        other => other,
    }
}

/// Trimmed JSON body, or `None` when the body is empty or not valid JSON.
pub fn trim_json(body: &[u8]) -> Option<Vec<u8>> {
    if body.is_empty() {
        return None;
    }
    let value: Value = serde_json::from_slice(body).ok()?;
    serde_json::to_vec(&trim_value(value)).ok()
}

/// Trimmed urlencoded pairs, or `None` when no value needed trimming.
pub fn trim_pairs(input: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(input.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.iter().all(|(_, v)| v.trim() == v) {
        return None;
    }
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.trim())))
        .finish();
    Some(encoded)
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn trim_uri(uri: &Uri) -> Option<Uri> {
    let trimmed = trim_pairs(uri.query()?)?;
    let path_and_query = PathAndQuery::try_from(format!("{}?{}", uri.path(), trimmed)).ok()?;
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Uri::from_parts(parts).ok()
}

/// Middleware trimming query, JSON and form input. The state is the body size limit.
pub async fn trim_request(State(body_limit): State<usize>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    if let Some(uri) = trim_uri(&parts.uri) {
        parts.uri = uri;
    }

    let content_type = content_type(&parts.headers);
    let is_json = content_type.contains("application/json");
    let is_form = content_type.contains("application/x-www-form-urlencoded");
    if !is_json && !is_form {
        return next.run(Request::from_parts(parts, body)).await;
    }

    let bytes: Bytes = match to_bytes(body, body_limit).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read request body");
            return ApiError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                CODE_VALIDATION,
                "request body too large or unreadable",
            )
            .into_response();
        }
    };

    let trimmed = if is_json {
        trim_json(&bytes)
    } else {
        std::str::from_utf8(&bytes).ok().and_then(trim_pairs).map(String::into_bytes)
    };

    let body = match trimmed {
        Some(trimmed) => {
            parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(trimmed.len()));
            Body::from(trimmed)
        }
        None => Body::from(bytes),
    };
    next.run(Request::from_parts(parts, body)).await
}
