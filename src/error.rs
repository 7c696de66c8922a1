use thiserror::Error;

/// 同步运行级错误: 返回 Err 即终止本次运行
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GET {endpoint} returned {status}")]
    Status { endpoint: String, status: u16 },

    #[error("GET {endpoint} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        endpoint: String,
        attempts: u32,
        last: String,
    },

    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("sink error: {0}")]
    Sink(#[from] sqlx::Error),

    #[error("sink timed out saving {model_name}")]
    SinkTimeout { model_name: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
