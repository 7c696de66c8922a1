pub mod invoice_sync;
pub mod mapper;
pub mod metadata;
pub mod payment_sync;

pub use invoice_sync::{assemble_invoice, sync_invoices};
pub use mapper::MapError;
pub use metadata::{
    update_metadata, validate_query, validate_update_body, ConnectionStore, MetadataError,
};
pub use payment_sync::{assemble_payment, sync_payments};

use crate::client::{Fetcher, ListEndpoint};
use crate::config::UpstreamConfig;
use crate::error::{Result, SyncError};
use crate::sink::BatchSink;
use serde::Serialize;
use url::Url;

/// 单条记录的详情路径, id 按路径段编码; id 为空时返回 `None`
pub fn record_endpoint(collection: &str, id: &str) -> Option<String> {
    if id.trim().is_empty() {
        return None;
    }
    let mut url = Url::parse("http://upstream.invalid/").ok()?;
    url.path_segments_mut()
        .ok()?
        .clear()
        .push(collection.trim_matches('/'))
        .push(id);
    Some(url.path().to_string())
}

/// 单条记录的响应体无法解码属于记录级问题: 记日志并跳过该记录。
/// 其余错误原样返回。
pub(crate) fn skip_undecodable<T>(result: Result<T>, id: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(SyncError::Decode { endpoint, source }) => {
            tracing::warn!(
                id,
                endpoint = %endpoint,
                error = %source,
                "Record skipped: undecodable response"
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// 单次同步使用的分页与重试参数
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub retries: u32,
    pub page_size: usize,
    pub confirm_short_page: bool,
}

impl SyncSettings {
    pub fn list_endpoint(&self, path: &str) -> ListEndpoint {
        ListEndpoint {
            path: path.to_string(),
            page_size: self.page_size,
            retries: self.retries,
            confirm_short_page: self.confirm_short_page,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from(&UpstreamConfig::default())
    }
}

impl From<&UpstreamConfig> for SyncSettings {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            retries: config.retries,
            page_size: config.page_size,
            confirm_short_page: config.confirm_short_page,
        }
    }
}

/// 单个模型一次同步的统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub model: String,
    pub pages: usize,
    pub saved: usize,
    pub skipped: usize,
}

impl SyncSummary {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            pages: 0,
            saved: 0,
            skipped: 0,
        }
    }
}

/// 同步入口: 由宿主按计划调用, 每次调用都从第一页开始
pub struct SyncRunner<F, S> {
    fetcher: F,
    sink: S,
    settings: SyncSettings,
}

impl<F: Fetcher, S: BatchSink> SyncRunner<F, S> {
    pub fn new(fetcher: F, sink: S, settings: SyncSettings) -> Self {
        Self {
            fetcher,
            sink,
            settings,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub async fn run_invoices(&self) -> Result<SyncSummary> {
        sync_invoices(&self.fetcher, &self.sink, &self.settings).await
    }

    pub async fn run_payments(&self) -> Result<SyncSummary> {
        sync_payments(&self.fetcher, &self.sink, &self.settings).await
    }

    /// 依次同步发票与付款; 任一失败即终止
    pub async fn run_all(&self) -> Result<Vec<SyncSummary>> {
        let invoices = self.run_invoices().await?;
        let payments = self.run_payments().await?;
        Ok(vec![invoices, payments])
    }
}
