//! HTTP 处理器
//!
//! 健康检查与统计调试端点。

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::app_state::AppState;
use crate::api::dto::{
    CacheSizes, EmotionStatsResponse, HealthResponse, MentalStateResponse, SessionEmotionStats,
    VisitorStatsResponse,
};

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        active_sessions: state.sessions.len(),
        visitors: state.visitors.len(),
        cache_size: CacheSizes {
            response: state.response_cache.len(),
            audio: state.audio_cache.len(),
        },
    })
}

/// GET /visitor-stats
pub async fn visitor_stats(State(state): State<Arc<AppState>>) -> Json<VisitorStatsResponse> {
    Json(VisitorStatsResponse {
        total_visitors: state.visitors.len(),
        active_sessions: state.sessions.len(),
        visitor_summary: state.visitors.summaries(),
    })
}

/// GET /emotion-stats
pub async fn emotion_stats(State(state): State<Arc<AppState>>) -> Json<EmotionStatsResponse> {
    let mut session_emotions = HashMap::new();
    for session in state.sessions.snapshot_all() {
        let mut distribution: HashMap<String, usize> = HashMap::new();
        for sample in &session.emotion_history {
            *distribution
                .entry(sample.emotion.label().to_string())
                .or_insert(0) += 1;
        }
        session_emotions.insert(
            session.id.clone(),
            SessionEmotionStats {
                total: session.emotion_history.len(),
                distribution,
                current: session.current_emotion,
            },
        );
    }

    Json(EmotionStatsResponse {
        total_sessions: state.sessions.len(),
        session_emotions,
        emotion_transitions: state.transition.transition_matrix(),
    })
}

/// GET /mental-state
pub async fn mental_state(State(state): State<Arc<AppState>>) -> Json<MentalStateResponse> {
    Json(MentalStateResponse {
        mental_state: state.simulator.snapshot(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render_prometheus(),
    )
}
