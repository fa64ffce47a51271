use serde::ser::{Serialize, SerializeMap, Serializer};

/// 设备上报的原始通知。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// 以 `/` 分隔的资源路径，最后一段为数值编码。
    pub path: String,
    /// base64 编码的数值文本。
    pub payload: String,
    /// 端点（设备）名称，作为观测记录的 resource。
    pub ep: String,
}

/// 转换后的观测记录。
///
/// 线上形态为扁平对象 `{ "resource": ep, <key>: value }`，其中 key 为指标名
/// （编码已知）或原始编码（编码未知）。
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Known {
        resource: String,
        code: i64,
        metric_name: String,
        value: f64,
    },
    Unknown {
        resource: String,
        /// 无法解析的路径编码为 `None`，输出键为 `"NaN"`。
        raw_code: Option<i64>,
        value: f64,
    },
}

impl Observation {
    pub fn resource(&self) -> &str {
        match self {
            Observation::Known { resource, .. } | Observation::Unknown { resource, .. } => {
                resource
            }
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Observation::Known { value, .. } | Observation::Unknown { value, .. } => *value,
        }
    }

    /// 扁平记录中的指标键。
    pub fn metric_key(&self) -> String {
        match self {
            Observation::Known { metric_name, .. } => metric_name.clone(),
            Observation::Unknown {
                raw_code: Some(code),
                ..
            } => code.to_string(),
            Observation::Unknown { raw_code: None, .. } => "NaN".to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Observation::Known { .. })
    }
}

impl Serialize for Observation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("resource", self.resource())?;
        // serde_json 将非有限浮点输出为 null
        map.serialize_entry(&self.metric_key(), &self.value())?;
        map.end()
    }
}

/// 待发布到 Broker 的单条消息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishMessage {
    /// 目标 topic（publish ACL）。
    pub topic: String,
    pub payload: String,
}

impl PublishMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}
