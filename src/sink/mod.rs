pub mod memory;

pub use memory::{BatchRecord, MemorySink};

use crate::error::Result;
use crate::models::CanonicalRecord;
use async_trait::async_trait;

/// 批量写入: 每页每种模型调用一次, 按记录 id upsert
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn batch_save<R: CanonicalRecord>(&self, records: &[R], model_name: &str) -> Result<()>;
}
