//! 路由定义
//!
//! - 健康检查：/health
//! - 指标快照：/metrics
//! - 设备通知 webhook：/notifications
//!
//! 同时挂载在 / 与 /api/ 两种前缀下。

use super::AppState;
use super::handlers::*;
use crate::middleware::request_context;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route("/notifications", post(receive_notifications))
}

/// 创建完整应用：挂载前缀、注入状态与请求上下文
pub fn create_app(state: AppState) -> Router {
    let api = create_api_router();
    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
        .layer(middleware::from_fn(request_context))
        .layer(TraceLayer::new_for_http())
}
