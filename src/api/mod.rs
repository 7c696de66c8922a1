pub mod handlers;

pub use handlers::*;

use crate::client::Fetcher;
use crate::service::{ConnectionStore, SyncRunner};
use crate::sink::BatchSink;
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

/// 宿主调用面: 健康检查 / 同步触发 / 连接元数据
pub fn router<F, S, C>(runner: Arc<SyncRunner<F, S>>, connections: Arc<C>) -> Router
where
    F: Fetcher + 'static,
    S: BatchSink + 'static,
    C: ConnectionStore + 'static,
{
    let sync_routes = Router::new()
        .route("/api/sync/invoices", post(sync_invoices::<F, S>))
        .route("/api/sync/payments", post(sync_payments::<F, S>))
        .route("/api/sync/all", post(sync_all::<F, S>))
        .with_state(runner);

    let metadata_routes = Router::new()
        .route("/connection/metadata", patch(update_connection_metadata::<C>))
        .with_state(connections);

    Router::new()
        .route("/health", get(health_check))
        .merge(sync_routes)
        .merge(metadata_routes)
}
