//! 设备通知 webhook 服务：通知批次 → 观测记录 → 时序接入。

mod handlers;
mod middleware;
mod routes;
mod utils;

use bridge_config::BridgeConfig;
use bridge_ingest::{HttpIngestorConfig, HttpSeriesIngestor, NoopIngestor, SeriesIngestor};
use bridge_telemetry::init_tracing;
use bridge_transform::Transformer;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub transformer: Arc<Transformer>,
    pub ingestor: Arc<dyn SeriesIngestor>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = BridgeConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let transformer = Arc::new(Transformer::new(
        config.code_table.clone(),
        config.invalid_value_policy,
    ));
    info!(
        codes = config.code_table.len(),
        policy = %config.invalid_value_policy,
        "transformer_ready"
    );

    // 选择接入方：配置了地址则走 HTTP，否则为空接入器
    let ingestor: Arc<dyn SeriesIngestor> = match config.ingest_url.clone() {
        Some(url) => {
            info!("ingest target: http {}", url);
            Arc::new(HttpSeriesIngestor::new(HttpIngestorConfig {
                url,
                api_key: config.ingest_api_key.clone(),
                api_secret: config.ingest_api_secret.clone(),
                timeout_seconds: config.ingest_timeout_seconds,
            })?)
        }
        None => {
            info!("ingest target: noop (BRIDGE_INGEST_URL unset)");
            Arc::new(NoopIngestor)
        }
    };

    let app = routes::create_app(AppState {
        transformer,
        ingestor,
    });

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("webhook listening on {}", config.http_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
