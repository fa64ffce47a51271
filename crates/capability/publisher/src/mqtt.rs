//! 基于 rumqttc 的 Broker 连接器。

use async_trait::async_trait;
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
    Transport,
};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace};

use crate::{BrokerConnector, BrokerOptions, BrokerScheme, BrokerSession, PublishError};

/// rumqttc 连接器。
#[derive(Debug, Clone, Copy, Default)]
pub struct MqttConnector;

#[async_trait]
impl BrokerConnector for MqttConnector {
    type Session = MqttSession;

    async fn connect(&self, options: &BrokerOptions) -> Result<Self::Session, PublishError> {
        let (client, mut eventloop) = AsyncClient::new(mqtt_options(options), 10);
        with_timeout(options.timeout_seconds, wait_for_connack(&mut eventloop)).await?;
        Ok(MqttSession {
            client,
            eventloop,
            qos: qos_from_u8(options.qos),
            timeout_seconds: options.timeout_seconds,
        })
    }
}

/// rumqttc 会话：由调用方在等待确认时驱动 eventloop。
pub struct MqttSession {
    client: AsyncClient,
    eventloop: EventLoop,
    qos: QoS,
    timeout_seconds: u64,
}

#[async_trait]
impl BrokerSession for MqttSession {
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        self.client
            .publish(topic, self.qos, false, payload.to_vec())
            .await
            .map_err(|err| PublishError::Publish(err.to_string()))?;
        with_timeout(
            self.timeout_seconds,
            wait_for_publish_ack(&mut self.eventloop, self.qos),
        )
        .await
    }

    async fn disconnect(&mut self) -> Result<(), PublishError> {
        self.client
            .disconnect()
            .await
            .map_err(|err| PublishError::Disconnect(err.to_string()))?;
        with_timeout(self.timeout_seconds, wait_for_disconnect(&mut self.eventloop)).await
    }
}

pub(crate) fn mqtt_options(options: &BrokerOptions) -> MqttOptions {
    let mut mqtt = MqttOptions::new(
        options.client_id.clone(),
        options.endpoint.host.clone(),
        options.endpoint.port,
    );
    mqtt.set_keep_alive(Duration::from_secs(options.keep_alive_seconds.max(5)));
    mqtt.set_clean_session(true);
    if let Some(username) = options.username.as_ref() {
        mqtt.set_credentials(username, options.password.clone().unwrap_or_default());
    }
    if options.endpoint.scheme == BrokerScheme::Tls {
        mqtt.set_transport(Transport::tls_with_default_config());
    }
    mqtt
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<(), PublishError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                if ack.code == ConnectReturnCode::Success {
                    return Ok(());
                }
                return Err(PublishError::Refused(format!("{:?}", ack.code)));
            }
            Ok(event) => trace!(target: "bridge.publisher", ?event, "mqtt_event"),
            Err(err) => return Err(PublishError::Connect(err.to_string())),
        }
    }
}

async fn wait_for_publish_ack(eventloop: &mut EventLoop, qos: QoS) -> Result<(), PublishError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Outgoing(Outgoing::Publish(pkid))) if qos == QoS::AtMostOnce => {
                debug!(target: "bridge.publisher", pkid, "mqtt_publish_sent");
                return Ok(());
            }
            Ok(Event::Incoming(Packet::PubAck(ack))) if qos == QoS::AtLeastOnce => {
                debug!(target: "bridge.publisher", pkid = ack.pkid, "mqtt_puback");
                return Ok(());
            }
            Ok(Event::Incoming(Packet::PubComp(comp))) if qos == QoS::ExactlyOnce => {
                debug!(target: "bridge.publisher", pkid = comp.pkid, "mqtt_pubcomp");
                return Ok(());
            }
            Ok(event) => trace!(target: "bridge.publisher", ?event, "mqtt_event"),
            Err(err) => return Err(PublishError::Publish(err.to_string())),
        }
    }
}

async fn wait_for_disconnect(eventloop: &mut EventLoop) -> Result<(), PublishError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => return Ok(()),
            Ok(event) => trace!(target: "bridge.publisher", ?event, "mqtt_event"),
            // Broker 在收到 DISCONNECT 前关闭连接，同样视为已关闭
            Err(err) => {
                debug!(target: "bridge.publisher", error = %err, "mqtt_closed_by_peer");
                return Ok(());
            }
        }
    }
}

async fn with_timeout<F>(seconds: u64, future: F) -> Result<(), PublishError>
where
    F: Future<Output = Result<(), PublishError>>,
{
    if seconds == 0 {
        return future.await;
    }
    tokio::time::timeout(Duration::from_secs(seconds), future)
        .await
        .map_err(|_| PublishError::Timeout(seconds))?
}

fn qos_from_u8(value: u8) -> QoS {
    match value {
        0 => QoS::AtMostOnce,
        1 => QoS::AtLeastOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BrokerEndpoint;

    fn options(url: &str) -> BrokerOptions {
        BrokerOptions {
            endpoint: BrokerEndpoint::parse(url, None).expect("endpoint"),
            client_id: "client-1".to_string(),
            username: Some("user".to_string()),
            password: None,
            qos: 1,
            keep_alive_seconds: 30,
            timeout_seconds: 5,
        }
    }

    #[test]
    fn options_carry_endpoint_and_client_id() {
        let mqtt = mqtt_options(&options("mqtts://broker.example:8884"));
        assert_eq!(mqtt.client_id(), "client-1");
        assert_eq!(mqtt.broker_address(), ("broker.example".to_string(), 8884));
        assert_eq!(mqtt.keep_alive(), Duration::from_secs(30));
    }

    #[test]
    fn qos_defaults_to_at_least_once() {
        assert_eq!(qos_from_u8(0), QoS::AtMostOnce);
        assert_eq!(qos_from_u8(2), QoS::ExactlyOnce);
        assert_eq!(qos_from_u8(9), QoS::AtLeastOnce);
    }
}
