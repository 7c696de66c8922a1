use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 连接元数据: 任意 JSON 对象
pub type Metadata = Map<String, Value>;

/// 单个或多个字符串 (`"a"` 或 `["a", "b"]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }

    /// 非空字符串或非空数组
    pub fn is_provided(&self) -> bool {
        match self {
            OneOrMany::One(value) => !value.is_empty(),
            OneOrMany::Many(values) => !values.is_empty(),
        }
    }
}

/// PATCH /connection/metadata 请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMetadataBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_token: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_key: Option<String>,
    pub metadata: Metadata,
}

/// 已存储的连接
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredConnection {
    pub id: i64,
    pub connection_id: String,
    pub provider_config_key: String,
    pub connection_token: Option<String>,
    pub metadata: sqlx::types::Json<Metadata>,
}

/// 请求体校验错误 (code / message / path)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub code: String,
    pub message: String,
    pub path: Vec<String>,
}

impl FieldIssue {
    pub fn new(code: &str, message: impl Into<String>, path: &[&str]) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            path: path.iter().map(|p| p.to_string()).collect(),
        }
    }
}
