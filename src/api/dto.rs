//! 对外数据结构
//!
//! WebSocket 与 HTTP 端点共用的 camelCase 载荷。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::emotion::Emotion;
use crate::models::mental_state::MentalState;
use crate::models::relationship::RelationshipStyle;
use crate::services::visitor_store::VisitorSummary;

/// 用户消息载荷
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageRequest {
    /// 消息文本
    pub message: String,
    /// 访客标识
    pub visitor_id: Option<String>,
    /// 客户端上报的已选建议
    pub selected_suggestions: Vec<String>,
}

/// 一轮对话的完整应答
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub message: String,
    pub emotion: Emotion,
    /// base64 语音，合成失败时缺省
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    pub language: String,
    pub suggestions: Vec<String>,
    pub relationship_level: RelationshipStyle,
    pub interaction_count: u64,
    pub mental_state: MentalState,
    /// 处理耗时（秒）
    pub processing_time: f64,
}

/// 问候载荷
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetingEnvelope {
    pub message: String,
    pub emotion: Emotion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    pub language: String,
    pub suggestions: Vec<String>,
    pub relationship_level: RelationshipStyle,
}

/// 健康检查应答
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub active_sessions: usize,
    pub visitors: usize,
    pub cache_size: CacheSizes,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSizes {
    pub response: usize,
    pub audio: usize,
}

/// 访客统计应答
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStatsResponse {
    pub total_visitors: usize,
    pub active_sessions: usize,
    pub visitor_summary: Vec<VisitorSummary>,
}

/// 单会话情感分布
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEmotionStats {
    pub total: usize,
    pub distribution: HashMap<String, usize>,
    pub current: Emotion,
}

/// 情感统计应答
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionStatsResponse {
    pub session_emotions: HashMap<String, SessionEmotionStats>,
    pub emotion_transitions: HashMap<String, HashMap<String, u64>>,
    pub total_sessions: usize,
}

/// 共享心理状态应答
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalStateResponse {
    pub mental_state: MentalState,
    pub timestamp: String,
}
