use std::fmt;
use std::str::FromStr;

/// 无法解析的路径编码或数值的处理策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidValuePolicy {
    /// 保留记录，数值为 NaN，编码键为 "NaN"。
    #[default]
    Sentinel,
    /// 丢弃单条记录。
    Skip,
    /// 整批失败。
    Reject,
}

impl InvalidValuePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidValuePolicy::Sentinel => "sentinel",
            InvalidValuePolicy::Skip => "skip",
            InvalidValuePolicy::Reject => "reject",
        }
    }
}

impl fmt::Display for InvalidValuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvalidValuePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sentinel" | "nan" => Ok(InvalidValuePolicy::Sentinel),
            "skip" => Ok(InvalidValuePolicy::Skip),
            "reject" | "fail" => Ok(InvalidValuePolicy::Reject),
            other => Err(other.to_string()),
        }
    }
}
