//! Response formatter and error envelope
//!
//! Format negotiation: an explicit `format` parameter wins outright;
//! otherwise `Accept: application/json` selects json and
//! `Accept: text/markdown` selects md. Every other Accept value,
//! `text/plain` included, defaults to json; plain text is never chosen
//! implicitly.
//!
//! Every JSON response carries the `_metadata` envelope so clients can
//! branch on `success` uniformly. The HTTP response itself is marked
//! non-cacheable: only upstream data is ever cached.

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::endpoints::{ParamValue, ParsedParams};
use crate::error::GatewayError;
use crate::trace::CacheTierStatus;

pub const AVAILABLE_FORMATS: &str = "json, text, md, usfm";
const NO_STORE: &str = "private, no-cache, no-store, must-revalidate";

/// Negotiated output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Text,
    Markdown,
    Usfm,
}

impl ResponseFormat {
    fn content_type(self) -> &'static str {
        match self {
            ResponseFormat::Json => "application/json",
            ResponseFormat::Text => "text/plain; charset=utf-8",
            ResponseFormat::Markdown => "text/markdown; charset=utf-8",
            ResponseFormat::Usfm => "text/plain; charset=utf-8",
        }
    }
}

/// Pick the response format from the `format` parameter, then Accept.
pub fn negotiate(params: &ParsedParams, headers: &HeaderMap) -> ResponseFormat {
    if let Some(format) = params.get("format").and_then(ParamValue::as_str) {
        match format {
            "text" => return ResponseFormat::Text,
            "md" | "markdown" => return ResponseFormat::Markdown,
            "usfm" => return ResponseFormat::Usfm,
            _ => return ResponseFormat::Json,
        }
    }

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if accept.contains("text/markdown") {
        ResponseFormat::Markdown
    } else {
        // application/json explicitly, and everything else by default
        ResponseFormat::Json
    }
}

/// Context the formatter needs beyond the payload itself
pub struct ResponseMeta {
    pub trace_id: Uuid,
    pub endpoint: String,
    pub cache_status: CacheTierStatus,
    pub response_time_ms: u128,
}

/// Build a success response in the negotiated format.
pub fn success(format: ResponseFormat, payload: Value, meta: &ResponseMeta) -> Response {
    let mut response = match format {
        ResponseFormat::Json => {
            let mut body = match payload {
                Value::Object(map) => Value::Object(map),
                other => json!({ "data": other }),
            };
            body["_metadata"] = json!({
                "responseTime": meta.response_time_ms,
                "cacheStatus": meta.cache_status,
                "success": true,
                "status": 200,
                "timestamp": Utc::now().to_rfc3339(),
                "traceId": meta.trace_id.to_string(),
                "endpoint": meta.endpoint,
            });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        other => {
            let body = plain_body(&payload, other);
            let mut response = (StatusCode::OK, body).into_response();
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(other.content_type()),
            );
            response
        }
    };

    apply_common_headers(&mut response, meta.trace_id, &meta.cache_status.summary);
    response
}

/// Non-JSON rendering pulls the natural text field out of the payload.
fn plain_body(payload: &Value, format: ResponseFormat) -> String {
    let field = match format {
        ResponseFormat::Markdown => "markdown",
        ResponseFormat::Usfm => "usfm",
        _ => "text",
    };
    if let Some(text) = payload.get(field).and_then(Value::as_str) {
        return text.to_string();
    }
    if let Some(scriptures) = payload.get("scriptures").and_then(Value::as_array) {
        let texts: Vec<&str> = scriptures
            .iter()
            .filter_map(|s| s.get("text").and_then(Value::as_str))
            .collect();
        if !texts.is_empty() {
            return texts.join("\n\n");
        }
    }
    payload.to_string()
}

/// Build the error envelope for a gateway error.
pub fn error(err: &GatewayError, trace_id: Option<Uuid>, response_time_ms: u128) -> Response {
    let status = err.http_status();
    let body = json!({
        "error": err.to_string(),
        "details": err.details(),
        "_metadata": {
            "success": false,
            "status": status,
            "responseTime": response_time_ms,
            "timestamp": Utc::now().to_rfc3339(),
            "traceId": trace_id.map(|id| id.to_string()),
        },
    });

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, axum::Json(body)).into_response();
    if let Some(trace_id) = trace_id {
        apply_common_headers(&mut response, trace_id, "miss");
    } else {
        apply_cors_and_cache_headers(&mut response);
    }
    response
}

/// Empty 200 CORS response for OPTIONS, sent before parameter parsing.
pub fn options() -> Response {
    let mut response = StatusCode::OK.into_response();
    apply_cors_and_cache_headers(&mut response);
    response
}

fn apply_common_headers(response: &mut Response, trace_id: Uuid, cache_summary: &str) {
    apply_cors_and_cache_headers(response);
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
        headers.insert("X-Trace-Id", value);
    }
    if let Ok(value) = HeaderValue::from_str(cache_summary) {
        headers.insert("X-Cache-Status", value);
    }
    headers.insert(
        "X-Available-Formats",
        HeaderValue::from_static(AVAILABLE_FORMATS),
    );
}

fn apply_cors_and_cache_headers(response: &mut Response) {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization, X-Cache-Bypass"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
}
