use crate::error::{Result, SyncError};
use crate::models::CanonicalRecord;
use crate::sink::BatchSink;
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use std::time::{Duration, Instant};

const CHUNK_SIZE: usize = 1000;
const INSERT_TIMEOUT: Duration = Duration::from_secs(30);

/// Postgres sink: `t_sync_record` 按 (model_name, record_id) upsert
#[derive(Clone)]
pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BatchSink for PgSink {
    async fn batch_save<R: CanonicalRecord>(&self, records: &[R], model_name: &str) -> Result<()> {
        // 同一批次内重复 id 只保留最后一个版本, 否则 ON CONFLICT 会报错
        let mut rows: IndexMap<String, Value> = IndexMap::with_capacity(records.len());
        for record in records {
            rows.insert(record.record_id().to_string(), serde_json::to_value(record)?);
        }

        if rows.is_empty() {
            tracing::info!(model_name, "Empty batch, nothing to upsert");
            return Ok(());
        }

        let rows: Vec<(String, Value)> = rows.into_iter().collect();
        for chunk in rows.chunks(CHUNK_SIZE) {
            upsert_chunk(&self.pool, model_name, chunk).await?;
        }
        Ok(())
    }
}

/// 批量 upsert; payload 未变化的行不改写
async fn upsert_chunk(pool: &PgPool, model_name: &str, rows: &[(String, Value)]) -> Result<()> {
    tracing::debug!("开始构建批量 upsert 语句, {} 条记录", rows.len());
    let synced_at = Utc::now();

    let mut query_builder = sqlx::QueryBuilder::new(
        "INSERT INTO t_sync_record (model_name, record_id, payload, synced_at) ",
    );
    query_builder.push_values(rows, |mut b, (record_id, payload)| {
        b.push_bind(model_name)
            .push_bind(record_id)
            .push_bind(Json(payload.clone()))
            .push_bind(synced_at);
    });
    query_builder.push(
        " ON CONFLICT (model_name, record_id) DO UPDATE \
         SET payload = EXCLUDED.payload, synced_at = EXCLUDED.synced_at \
         WHERE t_sync_record.payload IS DISTINCT FROM EXCLUDED.payload",
    );

    let execute_start = Instant::now();
    let execute_result =
        tokio::time::timeout(INSERT_TIMEOUT, query_builder.build().execute(pool)).await;

    match execute_result {
        Ok(Ok(result)) => {
            tracing::info!(
                model_name,
                "✓ UPSERT执行成功, 影响 {} 行, 耗时: {:?}",
                result.rows_affected(),
                execute_start.elapsed()
            );
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!(
                model_name,
                "✗ UPSERT执行失败, 耗时: {:?}, 错误: {:?}",
                execute_start.elapsed(),
                e
            );
            Err(SyncError::Sink(e))
        }
        Err(_) => {
            tracing::error!(model_name, "✗ UPSERT操作超时 (>30秒)!");
            Err(SyncError::SinkTimeout {
                model_name: model_name.to_string(),
            })
        }
    }
}
