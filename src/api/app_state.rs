//! 应用共享状态

use std::sync::Arc;

use crate::affect::{EmotionTransitionEngine, MentalStateSimulator};
use crate::cache::{AudioCache, ResponseCache};
use crate::config::AppConfig;
use crate::observability::AppMetrics;
use crate::services::turn::TurnService;
use crate::services::{QuizService, SessionStore, VisitorStore};

/// 全部处理器共享的应用状态
pub struct AppState {
    pub config: AppConfig,
    pub sessions: Arc<SessionStore>,
    pub visitors: Arc<VisitorStore>,
    pub simulator: Arc<MentalStateSimulator>,
    pub transition: Arc<EmotionTransitionEngine>,
    pub response_cache: Arc<ResponseCache>,
    pub audio_cache: Arc<AudioCache>,
    pub turn_service: Arc<dyn TurnService>,
    pub quiz: Arc<QuizService>,
    pub metrics: AppMetrics,
}
