//! 应用运行配置加载。

use domain::{CodeTable, InvalidValuePolicy};
use std::env;

/// 默认发布消息体。
pub const DEFAULT_PUBLISH_PAYLOAD: &str =
    r#"{"resource":"resourceName","metricName":"metric value"}"#;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// Webhook 服务运行配置。
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub http_addr: String,
    /// 未配置时使用空接入器（仅记录日志）。
    pub ingest_url: Option<String>,
    pub ingest_api_key: Option<String>,
    pub ingest_api_secret: Option<String>,
    pub ingest_timeout_seconds: u64,
    pub code_table: CodeTable,
    pub invalid_value_policy: InvalidValuePolicy,
}

impl BridgeConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr =
            read_optional("BRIDGE_HTTP_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let ingest_url = read_optional("BRIDGE_INGEST_URL");
        let ingest_api_key = read_optional("BRIDGE_INGEST_API_KEY");
        let ingest_api_secret = read_optional("BRIDGE_INGEST_API_SECRET");
        let ingest_timeout_seconds = read_u64_with_default("BRIDGE_INGEST_TIMEOUT_SECONDS", 30)?;
        let code_table = match read_optional("BRIDGE_CODE_TABLE") {
            Some(value) => CodeTable::parse(&value).map_err(|err| {
                ConfigError::Invalid("BRIDGE_CODE_TABLE".to_string(), err.to_string())
            })?,
            None => CodeTable::default(),
        };
        let invalid_value_policy = match read_optional("BRIDGE_INVALID_VALUE_POLICY") {
            Some(value) => value
                .parse::<InvalidValuePolicy>()
                .map_err(|_| ConfigError::Invalid("BRIDGE_INVALID_VALUE_POLICY".to_string(), value))?,
            None => InvalidValuePolicy::default(),
        };

        Ok(Self {
            http_addr,
            ingest_url,
            ingest_api_key,
            ingest_api_secret,
            ingest_timeout_seconds,
            code_table,
            invalid_value_policy,
        })
    }
}

/// Broker 环境（决定默认接入地址）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrokerEnvironment {
    #[default]
    Staging,
    Production,
}

impl BrokerEnvironment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "staging" | "stage" => Some(BrokerEnvironment::Staging),
            "production" | "prod" => Some(BrokerEnvironment::Production),
            _ => None,
        }
    }

    pub fn default_url(&self) -> &'static str {
        match self {
            BrokerEnvironment::Staging => "mqtts://mqtt-staging.waylay.io",
            BrokerEnvironment::Production => "mqtts://mqtt.waylay.io",
        }
    }
}

/// Broker 发布程序运行配置。
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub environment: BrokerEnvironment,
    pub broker_url: String,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 显式端口，优先于 URL 中的端口。
    pub port: Option<u16>,
    pub publish_acl: String,
    pub payload: String,
    pub qos: u8,
    pub keep_alive_seconds: u64,
    pub connect_timeout_seconds: u64,
}

impl PublisherConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match read_optional("BROKER_ENVIRONMENT") {
            Some(value) => BrokerEnvironment::parse(&value)
                .ok_or_else(|| ConfigError::Invalid("BROKER_ENVIRONMENT".to_string(), value))?,
            None => BrokerEnvironment::default(),
        };
        let broker_url = read_optional("BROKER_URL")
            .unwrap_or_else(|| environment.default_url().to_string());
        let client_id = read_optional("BROKER_CLIENT_ID")
            .unwrap_or_else(|| format!("series-bridge-{}", uuid::Uuid::new_v4()));
        let username = read_optional("BROKER_USERNAME");
        let password = read_optional("BROKER_PASSWORD");
        let port = read_optional_u16("BROKER_PORT")?;
        let publish_acl = read_optional("BROKER_PUBLISH_ACL")
            .ok_or_else(|| ConfigError::Missing("BROKER_PUBLISH_ACL".to_string()))?;
        let payload =
            read_optional("BROKER_PAYLOAD").unwrap_or_else(|| DEFAULT_PUBLISH_PAYLOAD.to_string());
        let qos = read_u8_with_default("BROKER_QOS", 1)?;
        if qos > 2 {
            return Err(ConfigError::Invalid("BROKER_QOS".to_string(), qos.to_string()));
        }
        let keep_alive_seconds = read_u64_with_default("BROKER_KEEP_ALIVE_SECONDS", 30)?;
        let connect_timeout_seconds = read_u64_with_default("BROKER_CONNECT_TIMEOUT_SECONDS", 30)?;

        Ok(Self {
            environment,
            broker_url,
            client_id,
            username,
            password,
            port,
            publish_acl,
            payload,
            qos,
            keep_alive_seconds,
            connect_timeout_seconds,
        })
    }
}

fn read_u8_with_default(key: &str, default: u8) -> Result<u8, ConfigError> {
    match read_optional(key) {
        Some(value) => value
            .trim()
            .parse::<u8>()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
        None => Ok(default),
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    match read_optional(key) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
        None => Ok(default),
    }
}

/// 空值与未设置等同。
fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn read_optional_u16(key: &str) -> Result<Option<u16>, ConfigError> {
    match read_optional(key) {
        Some(value) => value
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
        None => Ok(None),
    }
}
