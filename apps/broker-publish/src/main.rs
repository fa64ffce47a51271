//! 一次性 Broker 发布：连接 → 发布一条消息到 publish ACL → 关闭。

use bridge_config::PublisherConfig;
use bridge_publisher::{BrokerEndpoint, BrokerOptions, MqttConnector, PublishError, publish_once};
use bridge_telemetry::{init_tracing, record_publish_failure, record_publish_success};
use domain::PublishMessage;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在）
    dotenvy::dotenv().ok();
    let config = PublisherConfig::from_env()?;
    init_tracing();

    let options = broker_options(&config)?;
    let message = PublishMessage::new(config.publish_acl.clone(), config.payload.clone());
    info!(
        environment = ?config.environment,
        endpoint = %options.endpoint,
        topic = %message.topic,
        "publish_started"
    );

    match publish_once(MqttConnector, options, &message).await {
        Ok(closed) => {
            record_publish_success();
            info!(state = %closed.state(), "publish_finished");
            Ok(())
        }
        Err(err) => {
            record_publish_failure();
            error!(error = %err, "publish_failed");
            Err(err.into())
        }
    }
}

fn broker_options(config: &PublisherConfig) -> Result<BrokerOptions, PublishError> {
    Ok(BrokerOptions {
        endpoint: BrokerEndpoint::parse(&config.broker_url, config.port)?,
        client_id: config.client_id.clone(),
        username: config.username.clone(),
        password: config.password.clone(),
        qos: config.qos,
        keep_alive_seconds: config.keep_alive_seconds,
        timeout_seconds: config.connect_timeout_seconds,
    })
}
