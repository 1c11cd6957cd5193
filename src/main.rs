//! kokoro 服务入口

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use kokoro::affect::{create_classifier, EmotionTransitionEngine, MentalStateSimulator};
use kokoro::api::app_state::AppState;
use kokoro::api::create_router;
use kokoro::cache::{AudioCache, ResponseCache};
use kokoro::config::ConfigLoader;
use kokoro::external::{create_responder, create_voice_synthesizer};
use kokoro::observability::AppMetrics;
use kokoro::services::turn::create_turn_service;
use kokoro::services::{QuizService, SessionStore, SuggestionManager, VisitorStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load()?;
    init_tracing(&config.logging.level, config.logging.json);

    info!(
        host = %config.server.host,
        port = config.server.port,
        classifier = %config.affect.classifier,
        voice_enabled = config.voice.enabled,
        "starting kokoro"
    );

    let sessions = Arc::new(SessionStore::new());
    let visitors = Arc::new(VisitorStore::new());
    let simulator = Arc::new(MentalStateSimulator::new());
    let transition = Arc::new(EmotionTransitionEngine::new());
    let response_cache = Arc::new(ResponseCache::new());
    let audio_cache = Arc::new(AudioCache::new());
    let suggestions = Arc::new(SuggestionManager::new());
    let metrics = AppMetrics::new();

    let classifier = create_classifier(&config.affect.classifier);
    let responder = create_responder(config.responder.clone())?;
    let voice = create_voice_synthesizer(config.voice.clone());

    let turn_service = create_turn_service(
        sessions.clone(),
        visitors.clone(),
        classifier,
        simulator.clone(),
        transition.clone(),
        response_cache.clone(),
        audio_cache.clone(),
        responder,
        voice,
        suggestions,
        metrics.clone(),
    );

    let quiz = Arc::new(QuizService::new(visitors.clone()));

    let state = Arc::new(AppState {
        config: config.clone(),
        sessions,
        visitors,
        simulator,
        transition,
        response_cache,
        audio_cache,
        turn_service,
        quiz,
        metrics,
    });

    let router = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, router).await?;
    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
