use netsuite_sync::{
    api, create_pool, AppConfig, HttpFetcher, PgConnectionStore, PgSink, SyncRunner,
    SyncSettings,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    // 上游客户端 + Postgres sink
    let fetcher = HttpFetcher::new(&config.upstream)?;
    let settings = SyncSettings::from(&config.upstream);
    let runner = Arc::new(SyncRunner::new(fetcher, PgSink::new(pool.clone()), settings));
    let connections = Arc::new(PgConnectionStore::new(pool));

    let app = api::router(runner, connections).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST  /api/sync/invoices   - invoice sync run");
    info!("  POST  /api/sync/payments   - payment sync run");
    info!("  POST  /api/sync/all        - invoices then payments");
    info!("  PATCH /connection/metadata - merge connection metadata");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
