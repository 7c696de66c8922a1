#![allow(dead_code)]

use async_trait::async_trait;
use netsuite_sync::models::{Metadata, StoredConnection};
use netsuite_sync::service::ConnectionStore;
use netsuite_sync::{Fetcher, Result, SyncError};
use sqlx::types::Json;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// 以 endpoint -> JSON 响应模拟上游; 未登记的 endpoint 视为 404
#[derive(Default)]
pub struct FakeUpstream {
    responses: HashMap<String, Value>,
    failing: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, endpoint: &str, body: Value) -> Self {
        self.responses.insert(endpoint.to_string(), body);
        self
    }

    /// 该 endpoint 在重试预算内始终失败
    pub fn fail(mut self, endpoint: &str) -> Self {
        self.failing.insert(endpoint.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeUpstream {
    async fn get(&self, endpoint: &str, retries: u32) -> Result<Option<Value>> {
        self.requests.lock().unwrap().push(endpoint.to_string());
        if self.failing.contains(endpoint) {
            return Err(SyncError::RetriesExhausted {
                endpoint: endpoint.to_string(),
                attempts: retries.saturating_add(1),
                last: "status 503 Service Unavailable".to_string(),
            });
        }
        Ok(self.responses.get(endpoint).cloned())
    }
}

pub fn self_link(href: &str) -> Value {
    json!({ "links": [{ "rel": "self", "href": href }] })
}

pub fn list_page(ids: &[&str]) -> Value {
    let items: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "id": id, "links": [{ "rel": "self", "href": format!("https://ns/record/v1/x/{}", id) }] }))
        .collect();
    json!({ "items": items, "hasMore": false, "links": [] })
}

/// 内存连接存储
pub struct MemoryConnections {
    connections: Mutex<Vec<StoredConnection>>,
}

impl MemoryConnections {
    pub fn with_connection(connection_id: &str, provider_config_key: &str, token: &str) -> Self {
        Self {
            connections: Mutex::new(vec![StoredConnection {
                id: 1,
                connection_id: connection_id.to_string(),
                provider_config_key: provider_config_key.to_string(),
                connection_token: Some(token.to_string()),
                metadata: Json(Metadata::new()),
            }]),
        }
    }

    pub fn metadata(&self, connection_id: &str) -> Value {
        let connections = self.connections.lock().unwrap();
        connections
            .iter()
            .find(|c| c.connection_id == connection_id)
            .map(|c| Value::Object(c.metadata.0.clone()))
            .unwrap_or(Value::Null)
    }
}

#[async_trait]
impl ConnectionStore for MemoryConnections {
    async fn get_connections_by_ids(
        &self,
        connection_ids: &[String],
        provider_config_key: &str,
    ) -> std::result::Result<Vec<StoredConnection>, sqlx::Error> {
        let connections = self.connections.lock().unwrap();
        Ok(connections
            .iter()
            .filter(|c| {
                connection_ids.contains(&c.connection_id)
                    && c.provider_config_key == provider_config_key
            })
            .cloned()
            .collect())
    }

    async fn get_connections_by_tokens(
        &self,
        tokens: &[String],
    ) -> std::result::Result<Vec<StoredConnection>, sqlx::Error> {
        let connections = self.connections.lock().unwrap();
        Ok(connections
            .iter()
            .filter(|c| c.connection_token.as_ref().is_some_and(|t| tokens.contains(t)))
            .cloned()
            .collect())
    }

    async fn update_metadata(
        &self,
        targets: &[StoredConnection],
        metadata: &Metadata,
    ) -> std::result::Result<(), sqlx::Error> {
        let mut connections = self.connections.lock().unwrap();
        for connection in connections.iter_mut().filter(|c| targets.iter().any(|t| t.id == c.id)) {
            connection
                .metadata
                .0
                .extend(metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Ok(())
    }
}
