//! 设备通知 → 观测记录转换。

pub mod parse;

use domain::{CodeTable, InvalidValuePolicy, Notification, Observation};
use tracing::{debug, warn};

pub use parse::{decode_payload_value, parse_path_code};

/// 单条通知无法解析的原因。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReason {
    #[error("unparsable path code: {0:?}")]
    PathCode(String),
    #[error("undecodable base64 payload: {0}")]
    Base64(String),
    #[error("unparsable numeric payload: {0:?}")]
    Value(String),
}

/// 转换错误。
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("notification {index} invalid: {reason}")]
    InvalidNotification { index: usize, reason: InvalidReason },
}

/// 一批通知的转换结果。
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    pub observations: Vec<Observation>,
    /// 含无法解析编码或数值的通知数（含被跳过的）。
    pub invalid: usize,
    pub skipped: usize,
}

impl TransformOutcome {
    pub fn known(&self) -> usize {
        self.observations.iter().filter(|o| o.is_known()).count()
    }

    pub fn unknown(&self) -> usize {
        self.observations.len() - self.known()
    }
}

/// 按编码表与无效值策略转换通知。
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    table: CodeTable,
    policy: InvalidValuePolicy,
}

impl Transformer {
    pub fn new(table: CodeTable, policy: InvalidValuePolicy) -> Self {
        Self { table, policy }
    }

    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    pub fn policy(&self) -> InvalidValuePolicy {
        self.policy
    }

    /// 保持输入顺序逐条转换；`skip` 策略下输出可能短于输入。
    pub fn transform(&self, notifications: &[Notification]) -> Result<TransformOutcome, TransformError> {
        let mut outcome = TransformOutcome {
            observations: Vec::with_capacity(notifications.len()),
            ..TransformOutcome::default()
        };

        for (index, notification) in notifications.iter().enumerate() {
            debug!(
                target: "bridge.transform",
                index = index,
                ep = %notification.ep,
                path = %notification.path,
                payload = %notification.payload,
                "notification_received"
            );

            let code = parse_path_code(&notification.path);
            let value = decode_payload_value(&notification.payload);
            let reason = match (&code, &value) {
                (Err(reason), _) | (_, Err(reason)) => Some(reason.clone()),
                _ => None,
            };

            if let Some(reason) = reason {
                outcome.invalid += 1;
                match self.policy {
                    InvalidValuePolicy::Sentinel => {
                        debug!(
                            target: "bridge.transform",
                            index = index,
                            reason = %reason,
                            "notification_sentinel"
                        );
                    }
                    InvalidValuePolicy::Skip => {
                        outcome.skipped += 1;
                        warn!(
                            target: "bridge.transform",
                            index = index,
                            ep = %notification.ep,
                            reason = %reason,
                            "notification_skipped"
                        );
                        continue;
                    }
                    InvalidValuePolicy::Reject => {
                        warn!(
                            target: "bridge.transform",
                            index = index,
                            ep = %notification.ep,
                            reason = %reason,
                            "batch_rejected"
                        );
                        return Err(TransformError::InvalidNotification { index, reason });
                    }
                }
            }

            outcome
                .observations
                .push(self.observe(notification, code.ok(), value.unwrap_or(f64::NAN)));
        }

        Ok(outcome)
    }

    fn observe(&self, notification: &Notification, code: Option<i64>, value: f64) -> Observation {
        let resource = notification.ep.clone();
        match code.and_then(|code| self.table.lookup(code)) {
            Some(entry) => Observation::Known {
                resource,
                code: entry.code,
                metric_name: entry.name.clone(),
                value,
            },
            None => Observation::Unknown {
                resource,
                raw_code: code,
                value,
            },
        }
    }
}
