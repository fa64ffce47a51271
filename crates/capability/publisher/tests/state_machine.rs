use async_trait::async_trait;
use bridge_publisher::{
    BrokerConnector, BrokerEndpoint, BrokerOptions, BrokerPublisher, BrokerSession, PublishError,
    PublisherState, publish_once,
};
use domain::PublishMessage;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
    fail_connect: bool,
    fail_publish: bool,
}

impl Recorder {
    fn push(&self, event: String) {
        self.events.lock().expect("lock").push(event);
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }
}

struct RecordingSession {
    recorder: Recorder,
}

#[async_trait]
impl BrokerConnector for Recorder {
    type Session = RecordingSession;

    async fn connect(&self, options: &BrokerOptions) -> Result<Self::Session, PublishError> {
        self.push(format!("connect:{}:{}", options.endpoint, options.client_id));
        if self.fail_connect {
            return Err(PublishError::Refused("NotAuthorized".to_string()));
        }
        Ok(RecordingSession {
            recorder: self.clone(),
        })
    }
}

#[async_trait]
impl BrokerSession for RecordingSession {
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        self.recorder.push(format!(
            "publish:{}:{}",
            topic,
            String::from_utf8_lossy(payload)
        ));
        if self.recorder.fail_publish {
            return Err(PublishError::Publish("broker gone".to_string()));
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), PublishError> {
        self.recorder.push("disconnect".to_string());
        Ok(())
    }
}

fn options() -> BrokerOptions {
    BrokerOptions {
        endpoint: BrokerEndpoint::parse("mqtts://mqtt-staging.waylay.io", Some(8883))
            .expect("endpoint"),
        client_id: "client-1".to_string(),
        username: Some("key".to_string()),
        password: Some("secret".to_string()),
        qos: 1,
        keep_alive_seconds: 30,
        timeout_seconds: 5,
    }
}

fn message() -> PublishMessage {
    PublishMessage::new("tenant/acl", r#"{"resource":"resourceName"}"#)
}

#[tokio::test]
async fn publishes_once_then_closes_once() {
    let recorder = Recorder::default();
    let closed = publish_once(recorder.clone(), options(), &message())
        .await
        .expect("closed");
    assert_eq!(closed.state(), PublisherState::Closed);
    assert_eq!(
        recorder.events(),
        vec![
            "connect:mqtts://mqtt-staging.waylay.io:8883:client-1".to_string(),
            r#"publish:tenant/acl:{"resource":"resourceName"}"#.to_string(),
            "disconnect".to_string(),
        ]
    );
}

#[tokio::test]
async fn handles_walk_the_states_in_order() {
    let recorder = Recorder::default();
    let publisher = BrokerPublisher::new(recorder.clone(), options());
    assert_eq!(publisher.state(), PublisherState::Disconnected);
    let connected = publisher.connect().await.expect("connected");
    assert_eq!(connected.state(), PublisherState::Connected);
    assert_eq!(recorder.events().len(), 1);
    let published = connected.publish(&message()).await.expect("published");
    assert_eq!(published.state(), PublisherState::Publishing);
    published.end().await.expect("closed");
    assert_eq!(recorder.events().len(), 3);
}

#[tokio::test]
async fn connect_failure_never_publishes() {
    let recorder = Recorder {
        fail_connect: true,
        ..Recorder::default()
    };
    let err = publish_once(recorder.clone(), options(), &message())
        .await
        .expect_err("refused");
    assert!(matches!(err, PublishError::Refused(_)));
    assert_eq!(recorder.events().len(), 1);
    assert!(recorder.events()[0].starts_with("connect:"));
}

#[tokio::test]
async fn publish_failure_still_closes_session() {
    let recorder = Recorder {
        fail_publish: true,
        ..Recorder::default()
    };
    let err = publish_once(recorder.clone(), options(), &message())
        .await
        .expect_err("publish failed");
    assert!(matches!(err, PublishError::Publish(_)));
    let events = recorder.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[2], "disconnect");
}
