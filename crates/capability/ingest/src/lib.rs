//! 时序接入协作方（postSeries）。

use async_trait::async_trait;
use domain::Observation;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

/// 接入错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 上游返回非 2xx，body 为上游响应数据。
    #[error("ingestion rejected with status {status}: {body}")]
    Rejected { status: u16, body: Value },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("client error: {0}")]
    Client(String),
}

impl IngestError {
    /// 回传给 webhook 调用方的错误体：上游数据优先，否则为错误信息。
    pub fn error_body(&self) -> Value {
        match self {
            IngestError::Rejected { body, .. } => body.clone(),
            IngestError::Transport(message) | IngestError::Client(message) => {
                Value::String(message.clone())
            }
        }
    }
}

/// 接入成功响应。
#[derive(Debug, Clone, PartialEq)]
pub struct IngestResponse {
    pub status: u16,
    pub body: Value,
}

/// 时序接入抽象：一次调用提交整批记录。
#[async_trait]
pub trait SeriesIngestor: Send + Sync {
    async fn post_series(&self, records: &[Observation]) -> Result<IngestResponse, IngestError>;
}

/// 空接入器（未配置接入地址时使用）。
#[derive(Debug, Default)]
pub struct NoopIngestor;

#[async_trait]
impl SeriesIngestor for NoopIngestor {
    async fn post_series(&self, records: &[Observation]) -> Result<IngestResponse, IngestError> {
        info!(target: "bridge.ingest", records = records.len(), "series_discarded");
        Ok(IngestResponse {
            status: 200,
            body: serde_json::json!({ "accepted": records.len() }),
        })
    }
}

/// HTTP 接入器配置。
#[derive(Debug, Clone)]
pub struct HttpIngestorConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub timeout_seconds: u64,
}

/// HTTP 接入器：将记录数组以 JSON POST 到接入地址。
#[derive(Debug, Clone)]
pub struct HttpSeriesIngestor {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl HttpSeriesIngestor {
    pub fn new(config: HttpIngestorConfig) -> Result<Self, IngestError> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }
        let client = builder
            .build()
            .map_err(|err| IngestError::Client(err.to_string()))?;
        Ok(Self {
            client,
            url: config.url,
            api_key: config.api_key,
            api_secret: config.api_secret,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SeriesIngestor for HttpSeriesIngestor {
    async fn post_series(&self, records: &[Observation]) -> Result<IngestResponse, IngestError> {
        let mut request = self.client.post(&self.url).json(records);
        if let Some(api_key) = self.api_key.as_ref() {
            request = request.basic_auth(api_key, self.api_secret.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|err| IngestError::Transport(err.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| IngestError::Transport(err.to_string()))?;
        let body = parse_body(&bytes);

        if !status.is_success() {
            warn!(
                target: "bridge.ingest",
                url = %self.url,
                status = status.as_u16(),
                records = records.len(),
                "series_rejected"
            );
            return Err(IngestError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            target: "bridge.ingest",
            url = %self.url,
            status = status.as_u16(),
            records = records.len(),
            "series_posted"
        );
        Ok(IngestResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// 响应体优先按 JSON 解析，失败时保留文本；空响应为 null。
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
