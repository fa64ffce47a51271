//! 数值编码 → 指标名映射表。

/// 映射表构造错误。
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodeTableError {
    #[error("empty metric name for code {0}")]
    EmptyName(i64),
    #[error("reserved metric name for code {0}: resource")]
    ReservedName(i64),
    #[error("invalid entry: {0}")]
    InvalidEntry(String),
}

/// 单条映射。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub code: i64,
    pub name: String,
}

/// 有序映射表，按 code 精确匹配，重复 code 以首条为准。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    entries: Vec<CodeEntry>,
}

impl CodeTable {
    pub fn new(entries: Vec<CodeEntry>) -> Result<Self, CodeTableError> {
        for entry in &entries {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(CodeTableError::EmptyName(entry.code));
            }
            if name == "resource" {
                return Err(CodeTableError::ReservedName(entry.code));
            }
        }
        Ok(Self { entries })
    }

    /// 解析 `code=name` 逗号分隔列表，例如 `5600=temperature,5501=vibration`。
    pub fn parse(raw: &str) -> Result<Self, CodeTableError> {
        let mut entries = Vec::new();
        for item in raw.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let (code, name) = item
                .split_once('=')
                .ok_or_else(|| CodeTableError::InvalidEntry(item.to_string()))?;
            let code = code
                .trim()
                .parse::<i64>()
                .map_err(|_| CodeTableError::InvalidEntry(item.to_string()))?;
            entries.push(CodeEntry {
                code,
                name: name.trim().to_string(),
            });
        }
        Self::new(entries)
    }

    pub fn lookup(&self, code: i64) -> Option<&CodeEntry> {
        self.entries.iter().find(|entry| entry.code == code)
    }

    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CodeTable {
    /// 默认设备资源编码表。
    fn default() -> Self {
        let entries = [
            (5501, "vibration"),
            (5601, "lightLuminance"),
            (5600, "temperature"),
            (5602, "times_two"),
            (5603, "luminance_value"),
        ]
        .into_iter()
        .map(|(code, name)| CodeEntry {
            code,
            name: name.to_string(),
        })
        .collect();
        Self { entries }
    }
}
