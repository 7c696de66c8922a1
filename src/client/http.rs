//! 基于 reqwest 的上游客户端。
//!
//! 每次调用在首次请求之外最多重试 `retries` 次, 间隔线性递增。
//! 404 与空响应体视为资源不存在; 其余 4xx (408/429 除外) 直接失败。

use super::Fetcher;
use crate::config::UpstreamConfig;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

/// 单次请求结果
enum Attempt {
    Found(Value),
    NotFound,
    Retryable(String),
    Fatal(SyncError),
}

pub struct HttpFetcher {
    http: Client,
    base_url: String,
    access_token: String,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// 相对路径拼接 base_url; 上游给出的绝对链接 (如 next) 原样使用
    fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    async fn attempt(&self, url: &str, endpoint: &str) -> Attempt {
        let mut request = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json");
        if !self.access_token.is_empty() {
            request = request.bearer_auth(&self.access_token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Retryable(e.to_string()),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Attempt::NotFound;
        }
        if status.is_server_error()
            || status == StatusCode::TOO_MANY_REQUESTS
            || status == StatusCode::REQUEST_TIMEOUT
        {
            return Attempt::Retryable(format!("status {}", status));
        }
        if !status.is_success() {
            return Attempt::Fatal(SyncError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Retryable(e.to_string()),
        };
        if body.trim().is_empty() {
            return Attempt::NotFound;
        }

        match serde_json::from_str(&body) {
            Ok(value) => Attempt::Found(value),
            Err(source) => Attempt::Fatal(SyncError::Decode {
                endpoint: endpoint.to_string(),
                source,
            }),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, endpoint: &str, retries: u32) -> Result<Option<Value>> {
        let url = self.url_for(endpoint);
        let attempts = retries.saturating_add(1);
        let mut last = String::new();

        for attempt in 1..=attempts {
            match self.attempt(&url, endpoint).await {
                Attempt::Found(value) => return Ok(Some(value)),
                Attempt::NotFound => return Ok(None),
                Attempt::Fatal(e) => return Err(e),
                Attempt::Retryable(reason) => {
                    tracing::warn!(
                        endpoint,
                        attempt,
                        attempts,
                        reason = %reason,
                        "Upstream request failed"
                    );
                    last = reason;
                    if attempt < attempts {
                        sleep(self.retry_delay.saturating_mul(attempt)).await;
                    }
                }
            }
        }

        Err(SyncError::RetriesExhausted {
            endpoint: endpoint.to_string(),
            attempts,
            last,
        })
    }
}
