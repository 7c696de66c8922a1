pub mod http;
pub mod link;
pub mod pagination;

pub use http::HttpFetcher;
pub use link::{resolve_link, APPLY_DOC, ITEM_SELF};
pub use pagination::{ListEndpoint, Paginator};

use crate::error::{Result, SyncError};
use crate::models::{DetailEnvelope, ListResponse};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 上游读取能力 (带重试预算的 GET)
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// `Ok(None)` 表示资源不存在 (404 或空响应体)
    async fn get(&self, endpoint: &str, retries: u32) -> Result<Option<Value>>;
}

/// 按 id 获取单个资源详情; 不存在时返回空信封而不是错误
pub async fn fetch_detail<T, F>(
    fetcher: &F,
    endpoint: &str,
    retries: u32,
) -> Result<DetailEnvelope<T>>
where
    T: DeserializeOwned,
    F: Fetcher + ?Sized,
{
    match fetcher.get(endpoint, retries).await? {
        None | Some(Value::Null) => Ok(DetailEnvelope::absent()),
        Some(body) => serde_json::from_value(body)
            .map(DetailEnvelope::present)
            .map_err(|source| SyncError::Decode {
                endpoint: endpoint.to_string(),
                source,
            }),
    }
}

/// 获取子集合 (如 `/invoice/{id}/item`); 集合不存在视为空集合
pub async fn fetch_collection<F>(fetcher: &F, endpoint: &str, retries: u32) -> Result<ListResponse>
where
    F: Fetcher + ?Sized,
{
    let envelope = fetch_detail::<ListResponse, F>(fetcher, endpoint, retries).await?;
    Ok(envelope.data.unwrap_or_default())
}
