//! Broker 发布：连接 → 发布一条消息 → 关闭。
//!
//! 连接状态由类型约束：只有 [`ConnectedPublisher`] 可以发布，只有
//! [`PublishedPublisher`] 可以关闭，发布前必须等待 Broker 确认连接。

pub mod endpoint;
pub mod mqtt;

use async_trait::async_trait;
use domain::PublishMessage;
use std::fmt;
use tracing::{info, warn};

pub use endpoint::{BrokerEndpoint, BrokerScheme};
pub use mqtt::MqttConnector;

/// 发布链路错误。
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error("connect error: {0}")]
    Connect(String),
    #[error("connection refused by broker: {0}")]
    Refused(String),
    #[error("timed out after {0}s waiting for broker")]
    Timeout(u64),
    #[error("publish error: {0}")]
    Publish(String),
    #[error("disconnect error: {0}")]
    Disconnect(String),
}

/// 连接参数。
#[derive(Debug, Clone)]
pub struct BrokerOptions {
    pub endpoint: BrokerEndpoint,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub qos: u8,
    pub keep_alive_seconds: u64,
    /// 等待 Broker 确认（连接/发布/断开）的超时，0 表示不限。
    pub timeout_seconds: u64,
}

/// 发布状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherState {
    Disconnected,
    Connecting,
    Connected,
    Publishing,
    Closed,
}

impl fmt::Display for PublisherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublisherState::Disconnected => "disconnected",
            PublisherState::Connecting => "connecting",
            PublisherState::Connected => "connected",
            PublisherState::Publishing => "publishing",
            PublisherState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Broker 连接器抽象：`connect` 仅在 Broker 确认连接后返回会话。
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    type Session: BrokerSession;

    async fn connect(&self, options: &BrokerOptions) -> Result<Self::Session, PublishError>;
}

/// 已建立的 Broker 会话。
#[async_trait]
pub trait BrokerSession: Send {
    /// 发布并等待与 QoS 对应的确认。
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;

    async fn disconnect(&mut self) -> Result<(), PublishError>;
}

/// 未连接状态。
pub struct BrokerPublisher<C> {
    connector: C,
    options: BrokerOptions,
}

impl<C: BrokerConnector> BrokerPublisher<C> {
    pub fn new(connector: C, options: BrokerOptions) -> Self {
        Self { connector, options }
    }

    pub fn state(&self) -> PublisherState {
        PublisherState::Disconnected
    }

    /// 建立连接并等待 Broker 确认。
    pub async fn connect(self) -> Result<ConnectedPublisher<C::Session>, PublishError> {
        let endpoint = self.options.endpoint.to_string();
        info!(
            target: "bridge.publisher",
            endpoint = %endpoint,
            client_id = %self.options.client_id,
            state = %PublisherState::Connecting,
            "broker_connecting"
        );
        let session = self.connector.connect(&self.options).await?;
        info!(
            target: "bridge.publisher",
            endpoint = %endpoint,
            state = %PublisherState::Connected,
            "broker_connected"
        );
        Ok(ConnectedPublisher { session, endpoint })
    }
}

/// 已连接状态，唯一可发布的句柄。
pub struct ConnectedPublisher<S> {
    session: S,
    endpoint: String,
}

impl<S: BrokerSession> ConnectedPublisher<S> {
    pub fn state(&self) -> PublisherState {
        PublisherState::Connected
    }

    /// 发布一条消息；失败时先关闭会话再返回错误。
    pub async fn publish(
        mut self,
        message: &PublishMessage,
    ) -> Result<PublishedPublisher<S>, PublishError> {
        info!(
            target: "bridge.publisher",
            endpoint = %self.endpoint,
            topic = %message.topic,
            payload_size = message.payload.len(),
            state = %PublisherState::Publishing,
            "broker_publishing"
        );
        match self
            .session
            .publish(&message.topic, message.payload.as_bytes())
            .await
        {
            Ok(()) => {
                info!(
                    target: "bridge.publisher",
                    endpoint = %self.endpoint,
                    topic = %message.topic,
                    "payload_published"
                );
                Ok(PublishedPublisher {
                    session: self.session,
                    endpoint: self.endpoint,
                })
            }
            Err(err) => {
                if let Err(close_err) = self.session.disconnect().await {
                    warn!(
                        target: "bridge.publisher",
                        endpoint = %self.endpoint,
                        error = %close_err,
                        "broker_close_failed"
                    );
                }
                Err(err)
            }
        }
    }
}

/// 已发布状态，只能关闭。
pub struct PublishedPublisher<S> {
    session: S,
    endpoint: String,
}

impl<S: BrokerSession> PublishedPublisher<S> {
    pub fn state(&self) -> PublisherState {
        PublisherState::Publishing
    }

    pub async fn end(mut self) -> Result<Closed, PublishError> {
        self.session.disconnect().await?;
        info!(
            target: "bridge.publisher",
            endpoint = %self.endpoint,
            state = %PublisherState::Closed,
            "client_closed"
        );
        Ok(Closed)
    }
}

/// 已关闭状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closed;

impl Closed {
    pub fn state(&self) -> PublisherState {
        PublisherState::Closed
    }
}

/// 完整流程：连接 → 发布 → 关闭。
pub async fn publish_once<C: BrokerConnector>(
    connector: C,
    options: BrokerOptions,
    message: &PublishMessage,
) -> Result<Closed, PublishError> {
    BrokerPublisher::new(connector, options)
        .connect()
        .await?
        .publish(message)
        .await?
        .end()
        .await
}
