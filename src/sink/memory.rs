use super::BatchSink;
use crate::error::Result;
use crate::models::CanonicalRecord;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

/// 一次 batch_save 调用的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRecord {
    pub model_name: String,
    pub ids: Vec<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// (model_name, id) -> 最新版本
    records: IndexMap<(String, String), Value>,
    batches: Vec<BatchRecord>,
}

/// 内存 sink: 保序 upsert, 同时记录每次批量调用
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某模型当前的全部记录 (首次写入顺序)
    pub fn records(&self, model_name: &str) -> Vec<Value> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .records
            .iter()
            .filter(|((model, _), _)| model == model_name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn get(&self, model_name: &str, id: &str) -> Option<Value> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .records
            .get(&(model_name.to_string(), id.to_string()))
            .cloned()
    }

    /// 按调用顺序返回所有批次
    pub fn batches(&self) -> Vec<BatchRecord> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.batches.clone()
    }
}

#[async_trait]
impl BatchSink for MemorySink {
    async fn batch_save<R: CanonicalRecord>(&self, records: &[R], model_name: &str) -> Result<()> {
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            rows.push((record.record_id().to_string(), serde_json::to_value(record)?));
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let ids = rows.iter().map(|(id, _)| id.clone()).collect();
        for (id, value) in rows {
            state.records.insert((model_name.to_string(), id), value);
        }
        state.batches.push(BatchRecord {
            model_name: model_name.to_string(),
            ids,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalPayment;

    fn payment(id: &str, amount: f64) -> CanonicalPayment {
        CanonicalPayment {
            id: id.to_string(),
            created_at: None,
            customer_id: None,
            amount,
            currency: None,
            payment_reference: None,
            status: None,
            apply_to: vec![],
            description: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let sink = MemorySink::new();
        sink.batch_save(&[payment("1", 10.0), payment("2", 20.0)], "NetsuitePayment")
            .await
            .unwrap();
        sink.batch_save(&[payment("1", 15.0)], "NetsuitePayment")
            .await
            .unwrap();

        let records = sink.records("NetsuitePayment");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], "1");
        assert_eq!(records[0]["amount"], 15.0);
        assert_eq!(sink.batches().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_recorded() {
        let sink = MemorySink::new();
        sink.batch_save::<CanonicalPayment>(&[], "NetsuitePayment")
            .await
            .unwrap();
        assert_eq!(
            sink.batches(),
            vec![BatchRecord {
                model_name: "NetsuitePayment".to_string(),
                ids: vec![],
            }]
        );
        assert!(sink.records("NetsuitePayment").is_empty());
    }
}
