//! 轮次服务
//!
//! 一轮对话的完整流水线：分类用户情感 → 演化心理状态 →
//! 转移显示情感 → 取回或生成应答（缓存 → 内置问答 → 生成端）→
//! 合成语音 → 生成追问建议 → 打包应答。任何内部错误都不会
//! 传播到对端，统一退化为致歉应答。

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::affect::{
    topics_in, EmotionClassifier, EmotionTransitionEngine, MentalStateSimulator, TimeBand,
};
use crate::api::dto::{GreetingEnvelope, MessageRequest, ResponseEnvelope};
use crate::cache::{AudioCache, CachedResponse, ResponseCache};
use crate::error::Result;
use crate::external::{apology_for, Responder, StaticQa, VoiceSynthesizer};
use crate::models::emotion::Emotion;
use crate::models::language::Language;
use crate::models::relationship::greeting_for;
use crate::observability::AppMetrics;
use crate::services::session_store::SessionStore;
use crate::services::suggestion::SuggestionManager;
use crate::services::visitor_store::VisitorStore;

/// 轮次服务 trait
#[async_trait]
pub trait TurnService: Send + Sync {
    /// 处理一条用户消息，保证总能返回应答
    async fn process_message(&self, session_id: &str, request: MessageRequest)
        -> ResponseEnvelope;

    /// 生成问候（连接建立或语言切换时）
    async fn greeting(&self, session_id: &str, language: Option<Language>) -> GreetingEnvelope;

    /// 为任意文案合成语音（经语音缓存，失败返回 None）
    async fn synthesize(&self, text: &str, emotion: Emotion, language: Language)
        -> Option<String>;

    /// 会话结束：统计汇入访客并移除会话
    fn end_session(&self, session_id: &str);
}

/// 轮次服务实现
pub struct TurnServiceImpl {
    sessions: Arc<SessionStore>,
    visitors: Arc<VisitorStore>,
    classifier: Box<dyn EmotionClassifier>,
    simulator: Arc<MentalStateSimulator>,
    transition: Arc<EmotionTransitionEngine>,
    response_cache: Arc<ResponseCache>,
    audio_cache: Arc<AudioCache>,
    static_qa: StaticQa,
    responder: Box<dyn Responder>,
    voice: Box<dyn VoiceSynthesizer>,
    suggestions: Arc<SuggestionManager>,
    metrics: AppMetrics,
}

impl TurnServiceImpl {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<SessionStore>,
        visitors: Arc<VisitorStore>,
        classifier: Box<dyn EmotionClassifier>,
        simulator: Arc<MentalStateSimulator>,
        transition: Arc<EmotionTransitionEngine>,
        response_cache: Arc<ResponseCache>,
        audio_cache: Arc<AudioCache>,
        responder: Box<dyn Responder>,
        voice: Box<dyn VoiceSynthesizer>,
        suggestions: Arc<SuggestionManager>,
        metrics: AppMetrics,
    ) -> Self {
        Self {
            sessions,
            visitors,
            classifier,
            simulator,
            transition,
            response_cache,
            audio_cache,
            static_qa: StaticQa::new(),
            responder,
            voice,
            suggestions,
            metrics,
        }
    }

    /// 会话与访客合并后的已选建议
    fn merged_selected(&self, session_id: &str) -> Vec<String> {
        let mut selected = self
            .sessions
            .get(session_id)
            .map(|s| s.selected_suggestions)
            .unwrap_or_default();
        if let Some(visitor_id) = self
            .sessions
            .get(session_id)
            .and_then(|s| s.visitor_id)
        {
            selected.extend(self.visitors.selected_suggestions_of(&visitor_id));
        }
        selected
    }

    /// 取回或合成语音，经语音缓存
    async fn audio_for(
        &self,
        text: &str,
        emotion: Emotion,
        language: Language,
    ) -> Option<String> {
        if let Some(cached) = self.audio_cache.get(text, language, emotion) {
            debug!("audio cache hit");
            return Some(cached);
        }
        let audio = self.voice.synthesize(text, emotion, language).await?;
        self.audio_cache
            .insert(text, language, emotion, audio.clone());
        Some(audio)
    }

    async fn try_process(
        &self,
        session_id: &str,
        request: &MessageRequest,
    ) -> Result<ResponseEnvelope> {
        let started = Instant::now();

        // 会話状態の更新
        let (language, previous_emotion, interaction_count) =
            self.sessions.update(session_id, |session| {
                session.interaction_count += 1;
                if let Some(visitor_id) = &request.visitor_id {
                    session.visitor_id = Some(visitor_id.clone());
                }
                session.merge_selected_suggestions(&request.selected_suggestions);
                for topic in topics_in(&request.message) {
                    session.discovered_topics.insert(topic.to_string());
                }
                session.push_message("user", &request.message);
                (
                    session.language,
                    session.current_emotion,
                    session.interaction_count,
                )
            });

        let relationship = self
            .visitors
            .relationship_of(request.visitor_id.as_deref(), interaction_count);

        let user_emotion = self.classifier.classify(&request.message, language);
        let mental_state =
            self.simulator
                .update(user_emotion, &request.message, TimeBand::current());

        // 応答の取得：キャッシュ → 静的Q&A → 生成エンド
        let (message, emotion) =
            match self.response_cache.get(&request.message, language) {
                Some(cached) => {
                    self.metrics
                        .cache_hits_total
                        .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    debug!(session_id, "response cache hit");
                    (cached.message, cached.emotion)
                }
                None => {
                    self.metrics
                        .cache_misses_total
                        .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

                    let text = match self.static_qa.lookup(&request.message, language) {
                        Some(answer) => {
                            self.metrics
                                .static_qa_hits_total
                                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                            answer.to_string()
                        }
                        None => {
                            let history = self
                                .sessions
                                .get(session_id)
                                .map(|s| s.conversation_history)
                                .unwrap_or_default();
                            match self
                                .responder
                                .generate(&request.message, language, &history)
                                .await
                            {
                                Ok(text) => text,
                                Err(e) => {
                                    self.metrics
                                        .responder_failures_total
                                        .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                                    warn!(error = %e, "responder failed, using apology");
                                    apology_for(language).to_string()
                                }
                            }
                        }
                    };

                    let emotion =
                        self.transition
                            .next(previous_emotion, user_emotion, &mental_state);
                    self.response_cache.insert(
                        &request.message,
                        language,
                        CachedResponse {
                            message: text.clone(),
                            emotion,
                            mental_state: mental_state.clone(),
                        },
                    );
                    (text, emotion)
                }
            };

        let audio = self.audio_for(&message, emotion, language).await;

        let selected = self.merged_selected(session_id);
        let suggestions = self.suggestions.suggestions_for(language, &selected);

        self.sessions.update(session_id, |session| {
            session.record_emotion(emotion);
            session.push_message("assistant", &message);
            session.mental_state = mental_state.clone();
            session.relationship_style = relationship.style;
        });

        let elapsed = started.elapsed();
        self.metrics.record_turn(elapsed.as_millis() as u64);
        info!(
            session_id,
            emotion = %emotion,
            user_emotion = %user_emotion,
            elapsed_ms = elapsed.as_millis() as u64,
            "turn processed"
        );

        Ok(ResponseEnvelope {
            message,
            emotion,
            audio,
            language: language.tag().to_string(),
            suggestions,
            relationship_level: relationship.style,
            interaction_count,
            mental_state,
            processing_time: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
        })
    }
}

#[async_trait]
impl TurnService for TurnServiceImpl {
    async fn process_message(
        &self,
        session_id: &str,
        request: MessageRequest,
    ) -> ResponseEnvelope {
        match self.try_process(session_id, &request).await {
            Ok(envelope) => envelope,
            Err(e) => {
                self.metrics
                    .turn_errors_total
                    .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                error!(session_id, error = %e, "turn failed, sending apology");

                let session = self.sessions.get_or_create(session_id);
                ResponseEnvelope {
                    message: apology_for(session.language).to_string(),
                    emotion: Emotion::Neutral,
                    audio: None,
                    language: session.language.tag().to_string(),
                    suggestions: Vec::new(),
                    relationship_level: session.relationship_style,
                    interaction_count: session.interaction_count,
                    mental_state: self.simulator.snapshot(),
                    processing_time: 0.0,
                }
            }
        }
    }

    async fn greeting(&self, session_id: &str, language: Option<Language>) -> GreetingEnvelope {
        let (language, first, style) = self.sessions.update(session_id, |session| {
            if let Some(language) = language {
                session.language = language;
            }
            let first = session.first_interaction;
            session.first_interaction = false;
            (session.language, first, session.relationship_style)
        });

        let relationship = self
            .sessions
            .get(session_id)
            .and_then(|s| s.visitor_id)
            .map(|visitor_id| self.visitors.relationship_of(Some(&visitor_id), 0))
            .map(|info| info.style)
            .unwrap_or(style);

        self.sessions
            .update(session_id, |session| session.relationship_style = relationship);

        let message = greeting_for(language, relationship).to_string();
        let emotion = if first { Emotion::Start } else { Emotion::Happy };
        let audio = self.audio_for(&message, emotion, language).await;
        let selected = self.merged_selected(session_id);
        let suggestions = self.suggestions.suggestions_for(language, &selected);

        GreetingEnvelope {
            message,
            emotion,
            audio,
            language: language.tag().to_string(),
            suggestions,
            relationship_level: relationship,
        }
    }

    async fn synthesize(
        &self,
        text: &str,
        emotion: Emotion,
        language: Language,
    ) -> Option<String> {
        self.audio_for(text, emotion, language).await
    }

    fn end_session(&self, session_id: &str) {
        if let Some(session) = self.sessions.remove(session_id) {
            self.visitors.roll_up_session(&session);
            info!(
                session_id,
                turns = session.interaction_count,
                visitor = session.visitor_id.as_deref().unwrap_or("-"),
                "session rolled up"
            );
        }
    }
}

/// 创建轮次服务
#[allow(clippy::too_many_arguments)]
pub fn create_turn_service(
    sessions: Arc<SessionStore>,
    visitors: Arc<VisitorStore>,
    classifier: Box<dyn EmotionClassifier>,
    simulator: Arc<MentalStateSimulator>,
    transition: Arc<EmotionTransitionEngine>,
    response_cache: Arc<ResponseCache>,
    audio_cache: Arc<AudioCache>,
    responder: Box<dyn Responder>,
    voice: Box<dyn VoiceSynthesizer>,
    suggestions: Arc<SuggestionManager>,
    metrics: AppMetrics,
) -> Arc<dyn TurnService> {
    Arc::new(TurnServiceImpl::new(
        sessions,
        visitors,
        classifier,
        simulator,
        transition,
        response_cache,
        audio_cache,
        responder,
        voice,
        suggestions,
        metrics,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affect::create_classifier;
    use crate::external::responder::MockResponder;
    use crate::external::voice::MockVoiceSynthesizer;
    use crate::models::relationship::{greeting_for, RelationshipStyle};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn silent_voice() -> MockVoiceSynthesizer {
        let mut voice = MockVoiceSynthesizer::new();
        voice.expect_synthesize().returning(|_, _, _| None);
        voice
    }

    fn build(
        responder: MockResponder,
        voice: MockVoiceSynthesizer,
    ) -> (TurnServiceImpl, Arc<SessionStore>, Arc<VisitorStore>) {
        let sessions = Arc::new(SessionStore::new());
        let visitors = Arc::new(VisitorStore::new());
        let service = TurnServiceImpl::new(
            sessions.clone(),
            visitors.clone(),
            create_classifier("keyword"),
            Arc::new(MentalStateSimulator::new()),
            Arc::new(EmotionTransitionEngine::with_rng(ChaCha8Rng::seed_from_u64(1))),
            Arc::new(ResponseCache::new()),
            Arc::new(AudioCache::new()),
            Box::new(responder),
            Box::new(voice),
            Arc::new(SuggestionManager::with_rng(ChaCha8Rng::seed_from_u64(1))),
            AppMetrics::new(),
        );
        (service, sessions, visitors)
    }

    fn request(message: &str) -> MessageRequest {
        MessageRequest {
            message: message.to_string(),
            visitor_id: None,
            selected_suggestions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_turn_records_both_sides_of_history() {
        let mut responder = MockResponder::new();
        responder
            .expect_generate()
            .returning(|_, _, _| Ok("工房は京都にあります。".to_string()));
        let (service, sessions, _) = build(responder, silent_voice());

        let envelope = service
            .process_message("s1", request("工房の場所は"))
            .await;

        assert_eq!(envelope.message, "工房は京都にあります。");
        assert_eq!(envelope.interaction_count, 1);
        let session = sessions.get("s1").unwrap();
        assert_eq!(session.conversation_history.len(), 2);
        assert_eq!(session.conversation_history[0].role, "user");
        assert_eq!(session.conversation_history[1].role, "assistant");
    }

    #[tokio::test]
    async fn test_greeting_uses_visitor_relationship() {
        let (service, sessions, visitors) = build(MockResponder::new(), silent_voice());
        visitors.complete_quiz("v1");
        sessions.update("s1", |session| {
            session.visitor_id = Some("v1".to_string());
        });

        let greeting = service.greeting("s1", None).await;
        assert_eq!(greeting.relationship_level, RelationshipStyle::BestFriend);
        assert_eq!(
            greeting.message,
            greeting_for(Language::Ja, RelationshipStyle::BestFriend)
        );
    }

    #[tokio::test]
    async fn test_responder_never_called_for_static_answer() {
        let mut responder = MockResponder::new();
        responder.expect_generate().times(0);
        let (service, _, _) = build(responder, silent_voice());

        let envelope = service
            .process_message("s1", request("京友禅とは何ですか"))
            .await;
        assert!(envelope.message.contains("300年"));
    }
}
