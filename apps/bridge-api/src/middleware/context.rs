//! 请求上下文中间件
//!
//! 每个 webhook 请求分配 request_id/trace_id：调用方带了 `x-trace-id` 时沿用，
//! 否则新生成。标识写入 span 与响应头，请求结束时记录状态码与耗时。

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use bridge_telemetry::{RequestIds, new_request_ids};
use std::time::Instant;
use tracing::{Instrument, info, info_span};

const REQUEST_ID_HEADER: &str = "x-request-id";
const TRACE_ID_HEADER: &str = "x-trace-id";

pub async fn request_context(req: Request<Body>, next: Next) -> Response {
    let ids = resolve_ids(req.headers());
    let span = info_span!(
        target: "bridge.http",
        "webhook_request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let started_at = Instant::now();
    let mut response = async {
        let response = next.run(req).await;
        info!(
            target: "bridge.http",
            status = response.status().as_u16(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "request_completed"
        );
        response
    }
    .instrument(span)
    .await;

    for (name, value) in [
        (REQUEST_ID_HEADER, &ids.request_id),
        (TRACE_ID_HEADER, &ids.trace_id),
    ] {
        if let Ok(value) = HeaderValue::from_str(value) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}

fn resolve_ids(headers: &HeaderMap) -> RequestIds {
    let mut ids = new_request_ids();
    if let Some(trace_id) = headers
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        ids.trace_id = trace_id.to_string();
    }
    ids
}
