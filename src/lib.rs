pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod sink;

pub use client::{Fetcher, HttpFetcher};
pub use config::AppConfig;
pub use db::{create_pool, PgConnectionStore, PgSink};
pub use error::{Result, SyncError};
pub use service::{SyncRunner, SyncSettings, SyncSummary};
pub use sink::{BatchSink, MemorySink};
