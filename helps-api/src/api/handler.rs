//! Generic endpoint handler
//!
//! One handler drives every configured endpoint: parameter pipeline,
//! dispatch, transformation, cache-status reduction, and formatting.
//! Each request gets a fresh `FetchContext`; any error escaping the
//! pipeline is rendered as an error envelope carrying the trace id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use serde_json::Value;

use crate::api::format;
use crate::dispatch;
use crate::endpoints::{EndpointConfig, ParamValue, ParsedParams};
use crate::error::{GatewayError, GatewayResult};
use crate::params;
use crate::services::transform;
use crate::trace::{cache_status, FetchContext};
use crate::AppState;

pub async fn handle(
    state: AppState,
    endpoint: Arc<EndpointConfig>,
    method: Method,
    headers: HeaderMap,
    query: HashMap<String, String>,
    body: Bytes,
) -> Response {
    let started = Instant::now();

    // OPTIONS short-circuits before parameter parsing runs
    if method == Method::OPTIONS {
        return format::options();
    }

    let body_json = match parse_body(&method, &headers, &body) {
        Ok(body_json) => body_json,
        Err(violations) => {
            return format::error(
                &GatewayError::Validation(violations),
                None,
                started.elapsed().as_millis(),
            )
        }
    };

    let parsed = match params::parse_and_validate(&endpoint.params, &query, body_json.as_ref()) {
        Ok(parsed) => parsed,
        Err(violations) => {
            tracing::debug!(endpoint = %endpoint.name, count = violations.len(), "parameter validation failed");
            return format::error(
                &GatewayError::Validation(violations),
                None,
                started.elapsed().as_millis(),
            );
        }
    };

    let bypass = parsed
        .get("bypassCache")
        .and_then(ParamValue::as_bool)
        .unwrap_or(false)
        || bypass_header(&headers);
    let ctx = FetchContext::new(bypass);

    tracing::debug!(
        endpoint = %endpoint.name,
        trace_id = %ctx.trace_id,
        bypass_cache = bypass,
        "dispatching request"
    );

    match run_pipeline(&state, &endpoint, &ctx, &parsed).await {
        Ok(payload) => {
            let status = cache_status(&ctx.trace());
            let meta = format::ResponseMeta {
                trace_id: ctx.trace_id,
                endpoint: endpoint.name.clone(),
                cache_status: status,
                response_time_ms: started.elapsed().as_millis(),
            };
            format::success(format::negotiate(&parsed, &headers), payload, &meta)
        }
        Err(error) => {
            tracing::warn!(
                endpoint = %endpoint.name,
                trace_id = %ctx.trace_id,
                error = %error,
                "request failed"
            );
            format::error(&error, Some(ctx.trace_id), started.elapsed().as_millis())
        }
    }
}

async fn run_pipeline(
    state: &AppState,
    endpoint: &EndpointConfig,
    ctx: &FetchContext,
    parsed: &ParsedParams,
) -> GatewayResult<Value> {
    let data = dispatch::dispatch(state.client.as_ref(), ctx, endpoint, parsed).await?;
    Ok(transform::apply(endpoint.transform, data, parsed))
}

/// Header form of the bypass request, coerced like the parameter:
/// only a literal "true" bypasses.
fn bypass_header(headers: &HeaderMap) -> bool {
    headers
        .get("X-Cache-Bypass")
        .and_then(|value| value.to_str().ok())
        .map(|value| value == "true")
        .unwrap_or(false)
}

/// A POST with a JSON content type may carry parameters in its body.
fn parse_body(
    method: &Method,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Option<Value>, Vec<String>> {
    if *method != Method::POST || body.is_empty() {
        return Ok(None);
    }
    let is_json = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| vec![format!("Request body is not valid JSON: {e}")])
}
