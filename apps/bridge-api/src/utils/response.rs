//! HTTP 响应辅助函数
//!
//! - 错误响应：bad_request_error, invalid_notification_error
//! - 上游透传：upstream_response（接入方响应体原样返回）

use api_contract::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// 错误请求响应（请求体无法解析）
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 通知批次被拒绝（reject 策略）
pub fn invalid_notification_error(message: impl Into<String>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::<()>::error("INVALID.NOTIFICATION", message.into())),
    )
        .into_response()
}

/// 透传接入方响应体：字符串按纯文本返回，null 为空响应体，其余按 JSON 返回。
pub fn upstream_response(status: StatusCode, body: Value) -> Response {
    match body {
        Value::Null => status.into_response(),
        Value::String(text) => (status, text).into_response(),
        other => (status, Json(other)).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn string_body_is_plain_text() {
        let response = upstream_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            Value::String("bad request".to_string()),
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("text/plain"));
    }

    #[test]
    fn object_body_is_json() {
        let response = upstream_response(StatusCode::OK, serde_json::json!({ "ok": true }));
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert_eq!(content_type, "application/json");
    }
}
