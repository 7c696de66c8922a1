//! 连接元数据更新 (PATCH /connection/metadata)。
//!
//! 校验 -> 查找连接 -> 合并写入。任一连接不存在时不更新任何连接。

use crate::models::{FieldIssue, Metadata, OneOrMany, StoredConnection, UpdateMetadataBody};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::form_urlencoded;

const KNOWN_KEYS: &[&str] = &[
    "connection_id",
    "connection_token",
    "provider_config_key",
    "metadata",
];

const MISSING_TARGET: &str =
    "Either connection_token or connection_id and data_provider_config_key must be provided";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("{0}")]
    UnknownConnection(String),

    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),
}

/// 连接存储
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn get_connections_by_ids(
        &self,
        connection_ids: &[String],
        provider_config_key: &str,
    ) -> Result<Vec<StoredConnection>, sqlx::Error>;

    async fn get_connections_by_tokens(
        &self,
        tokens: &[String],
    ) -> Result<Vec<StoredConnection>, sqlx::Error>;

    /// 浅合并: 新键覆盖旧键, 其余旧键保留
    async fn update_metadata(
        &self,
        connections: &[StoredConnection],
        metadata: &Metadata,
    ) -> Result<(), sqlx::Error>;
}

fn check_one_or_many(value: &Value, key: &'static str, issues: &mut Vec<FieldIssue>) -> bool {
    match value {
        Value::String(s) => {
            if s.is_empty() {
                issues.push(too_small(&[key]));
            }
            true
        }
        Value::Array(values) => {
            let mut valid = true;
            for (idx, v) in values.iter().enumerate() {
                let idx = idx.to_string();
                match v {
                    Value::String(s) if s.is_empty() => {
                        issues.push(too_small(&[key, idx.as_str()]));
                    }
                    Value::String(_) => {}
                    _ => {
                        issues.push(FieldIssue::new(
                            "invalid_type",
                            "Expected string",
                            &[key, idx.as_str()],
                        ));
                        valid = false;
                    }
                }
            }
            valid
        }
        _ => {
            issues.push(FieldIssue::new(
                "invalid_union",
                "Expected string or array of strings",
                &[key],
            ));
            false
        }
    }
}

fn too_small(path: &[&str]) -> FieldIssue {
    FieldIssue::new("too_small", "String must contain at least 1 character(s)", path)
}

/// 该接口不接受任何查询参数
pub fn validate_query(raw: Option<&str>) -> Result<(), Vec<FieldIssue>> {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return Ok(());
    };
    let mut keys: Vec<String> = form_urlencoded::parse(raw.as_bytes())
        .map(|(key, _)| key.into_owned())
        .collect();
    keys.sort();
    keys.dedup();
    let listed = keys
        .iter()
        .map(|key| format!("'{}'", key))
        .collect::<Vec<_>>()
        .join(", ");
    Err(vec![FieldIssue::new(
        "unrecognized_keys",
        format!("Unrecognized key(s) in object: {}", listed),
        &[],
    )])
}

/// 校验请求体, 返回所有问题而不是第一个
pub fn validate_update_body(body: &Value) -> Result<UpdateMetadataBody, Vec<FieldIssue>> {
    let Some(object) = body.as_object() else {
        return Err(vec![FieldIssue::new("invalid_type", "Expected object", &[])]);
    };

    let mut issues = Vec::new();
    // 类型错误之后不再做组合校验
    let mut well_typed = true;

    let unknown: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|key| !KNOWN_KEYS.contains(key))
        .collect();
    if !unknown.is_empty() {
        let listed = unknown
            .iter()
            .map(|key| format!("'{}'", key))
            .collect::<Vec<_>>()
            .join(", ");
        issues.push(FieldIssue::new(
            "unrecognized_keys",
            format!("Unrecognized key(s) in object: {}", listed),
            &[],
        ));
    }

    for key in ["connection_id", "connection_token"] {
        if let Some(value) = object.get(key) {
            well_typed &= check_one_or_many(value, key, &mut issues);
        }
    }

    match object.get("provider_config_key") {
        None => {}
        Some(Value::String(s)) if s.is_empty() => issues.push(too_small(&["provider_config_key"])),
        Some(Value::String(_)) => {}
        Some(_) => {
            issues.push(FieldIssue::new(
                "invalid_type",
                "Expected string",
                &["provider_config_key"],
            ));
            well_typed = false;
        }
    }

    match object.get("metadata") {
        Some(Value::Object(_)) => {}
        Some(_) => {
            issues.push(FieldIssue::new("invalid_type", "Expected object", &["metadata"]));
            well_typed = false;
        }
        None => {
            issues.push(FieldIssue::new("invalid_type", "Required", &["metadata"]));
            well_typed = false;
        }
    }

    if !well_typed {
        return Err(issues);
    }

    let provided = |key: &str| match object.get(key) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(values)) => !values.is_empty(),
        _ => false,
    };
    let has_target = provided("connection_token")
        || (provided("connection_id") && provided("provider_config_key"));
    if !has_target {
        issues.push(FieldIssue::new(
            "custom",
            MISSING_TARGET,
            &["connection_id", "connection_token", "data_provider_config_key"],
        ));
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    serde_json::from_value(body.clone())
        .map_err(|e| vec![FieldIssue::new("invalid_type", e.to_string(), &[])])
}

/// 按 token 或 (connection_id, provider_config_key) 更新元数据
pub async fn update_metadata<S>(store: &S, body: &UpdateMetadataBody) -> Result<(), MetadataError>
where
    S: ConnectionStore + ?Sized,
{
    let tokens = body
        .connection_token
        .clone()
        .filter(OneOrMany::is_provided)
        .map(OneOrMany::into_vec)
        .unwrap_or_default();

    if !tokens.is_empty() {
        let stored = store.get_connections_by_tokens(&tokens).await?;
        if stored.len() != tokens.len() {
            let unknown: Vec<&str> = tokens
                .iter()
                .filter(|t| !stored.iter().any(|c| c.connection_token.as_deref() == Some(t.as_str())))
                .map(String::as_str)
                .collect();
            return Err(MetadataError::UnknownConnection(format!(
                "Connection with connection tokens: {} not found. Please make sure the connection exists. No actions were taken on any of the connections as a result of this failure.",
                unknown.join(", ")
            )));
        }
        store.update_metadata(&stored, &body.metadata).await?;
        return Ok(());
    }

    let ids = body
        .connection_id
        .clone()
        .map(OneOrMany::into_vec)
        .unwrap_or_default();
    let provider_config_key = body.provider_config_key.clone().unwrap_or_default();
    let stored = store
        .get_connections_by_ids(&ids, &provider_config_key)
        .await?;
    if stored.len() != ids.len() {
        let unknown: Vec<&str> = ids
            .iter()
            .filter(|id| !stored.iter().any(|c| &c.connection_id == *id))
            .map(String::as_str)
            .collect();
        return Err(MetadataError::UnknownConnection(format!(
            "Connection with connection ids: {} and provider config key {} not found. Please make sure the connection exists. No actions were taken on any of the connections as a result of this failure.",
            unknown.join(", "),
            provider_config_key
        )));
    }

    store.update_metadata(&stored, &body.metadata).await?;
    tracing::info!(connections = stored.len(), "Connection metadata updated");
    Ok(())
}
