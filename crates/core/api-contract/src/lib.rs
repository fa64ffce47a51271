//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Deserializer, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// Webhook 请求体：一批设备通知。
///
/// 缺失或为 `null` 的 `notifications` 视为空批次。
#[derive(Debug, Default, Deserialize)]
pub struct NotificationBatchRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notifications: Vec<NotificationDto>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<NotificationDto>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<NotificationDto>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 单条设备通知（未知字段如 `ct`、`max-age` 忽略）。
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationDto {
    pub path: String,
    pub payload: String,
    pub ep: String,
}

impl From<NotificationDto> for domain::Notification {
    fn from(dto: NotificationDto) -> Self {
        domain::Notification {
            path: dto.path,
            payload: dto.payload,
            ep: dto.ep,
        }
    }
}

/// 指标快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub notifications_received: u64,
    pub records_known: u64,
    pub records_unknown: u64,
    pub records_invalid: u64,
    pub records_skipped: u64,
    pub batches_rejected: u64,
    pub ingest_success: u64,
    pub ingest_failure: u64,
    pub ingest_latency_ms_total: u64,
    pub ingest_latency_ms_count: u64,
    pub publish_success: u64,
    pub publish_failure: u64,
}
