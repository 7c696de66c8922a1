use crate::client::Fetcher;
use crate::service::{self, ConnectionStore, MetadataError, SyncRunner, SyncSummary};
use crate::sink::BatchSink;
use axum::{
    extract::{Json, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// 同步接口响应体
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    pub summaries: Option<Vec<SyncSummary>>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

fn sync_response(result: crate::error::Result<Vec<SyncSummary>>) -> Response {
    match result {
        Ok(summaries) => {
            let saved: usize = summaries.iter().map(|s| s.saved).sum();
            let skipped: usize = summaries.iter().map(|s| s.skipped).sum();
            let response = SyncResponse {
                success: true,
                message: format!("Synced {} records, {} skipped", saved, skipped),
                summaries: Some(summaries),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("Sync run failed: {}", e);
            let response = SyncResponse {
                success: false,
                message: format!("Error: {}", e),
                summaries: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

/// 同步发票
pub async fn sync_invoices<F, S>(State(runner): State<Arc<SyncRunner<F, S>>>) -> Response
where
    F: Fetcher + 'static,
    S: BatchSink + 'static,
{
    sync_response(runner.run_invoices().await.map(|summary| vec![summary]))
}

/// 同步付款
pub async fn sync_payments<F, S>(State(runner): State<Arc<SyncRunner<F, S>>>) -> Response
where
    F: Fetcher + 'static,
    S: BatchSink + 'static,
{
    sync_response(runner.run_payments().await.map(|summary| vec![summary]))
}

/// 依次同步发票与付款
pub async fn sync_all<F, S>(State(runner): State<Arc<SyncRunner<F, S>>>) -> Response
where
    F: Fetcher + 'static,
    S: BatchSink + 'static,
{
    sync_response(runner.run_all().await)
}

/// 更新连接元数据 (浅合并), 成功时原样返回请求体
pub async fn update_connection_metadata<C>(
    State(store): State<Arc<C>>,
    RawQuery(query): RawQuery,
    Json(body): Json<Value>,
) -> Response
where
    C: ConnectionStore + 'static,
{
    if let Err(errors) = service::validate_query(query.as_deref()) {
        let error = json!({ "error": { "code": "invalid_query_params", "errors": errors } });
        return (StatusCode::BAD_REQUEST, Json(error)).into_response();
    }

    let parsed = match service::validate_update_body(&body) {
        Ok(parsed) => parsed,
        Err(errors) => {
            let error = json!({ "error": { "code": "invalid_body", "errors": errors } });
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    match service::update_metadata(store.as_ref(), &parsed).await {
        Ok(()) => (StatusCode::OK, Json(body)).into_response(),
        Err(MetadataError::UnknownConnection(message)) => {
            let error = json!({ "error": { "code": "unknown_connection", "message": message } });
            (StatusCode::NOT_FOUND, Json(error)).into_response()
        }
        Err(MetadataError::Store(e)) => {
            tracing::error!("Metadata update failed: {:?}", e);
            let error = json!({ "error": { "code": "server_error", "message": e.to_string() } });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
        }
    }
}
