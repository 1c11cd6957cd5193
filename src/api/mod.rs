//! HTTP API 模块

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod app_state;
pub mod dto;
pub mod handlers;

use app_state::AppState;

/// 组装完整路由：统计端点 + WebSocket 升级端点
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/visitor-stats", get(handlers::visitor_stats))
        .route("/emotion-stats", get(handlers::emotion_stats))
        .route("/mental-state", get(handlers::mental_state))
        .route("/metrics", get(handlers::metrics))
        .route("/ws", get(crate::websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
