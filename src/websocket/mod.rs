//! WebSocket 会话通道
//!
//! 每个连接对应一个会话：升级后立即发送问候，之后按入站事件
//! 分发到轮次服务与答题服务，断开时把会话统计汇入访客。
//! 事件为 JSON 文本帧，`type` 字段区分种类，载荷 camelCase。

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::app_state::AppState;
use crate::api::dto::{GreetingEnvelope, MessageRequest, ResponseEnvelope};
use crate::models::emotion::Emotion;
use crate::models::language::Language;

/// 入站事件
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// 用户消息
    #[serde(rename_all = "camelCase")]
    Message {
        message: String,
        #[serde(default)]
        visitor_id: Option<String>,
        #[serde(default)]
        selected_suggestions: Vec<String>,
    },
    /// 切换会话语言
    SetLanguage { language: String },
    /// 上报访客标识
    #[serde(rename_all = "camelCase")]
    VisitorInfo { visitor_id: String },
    /// 请求答题邀请
    RequestQuizProposal,
    /// 开始答题
    QuizStart,
    /// 客户端判分后的回答上报
    #[serde(rename_all = "camelCase")]
    QuizAnswer {
        question_index: usize,
        is_correct: bool,
    },
    /// 辞退挑战
    QuizDeclined,
    /// 中途退出
    QuizQuit,
    /// 请求下一题
    #[serde(rename_all = "camelCase")]
    RequestNextQuizQuestion { question_index: usize },
    /// 请求最终结果
    #[serde(rename_all = "camelCase")]
    RequestQuizFinalResult { total_correct: usize },
}

/// 出站事件
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Greeting(GreetingEnvelope),
    Response(ResponseEnvelope),
    LanguageChanged {
        language: String,
    },
    #[serde(rename_all = "camelCase")]
    QuizProposal {
        message: String,
        emotion: Emotion,
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    QuizQuestion {
        question_index: usize,
        question: String,
        options: Vec<String>,
        total_questions: usize,
        correct: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    QuizAnswerResult {
        question_index: usize,
        is_correct: bool,
        correct_option: String,
        explanation: String,
        result_message: String,
        emotion: Emotion,
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<String>,
        has_next_question: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        next_question_index: Option<usize>,
        is_final_result: bool,
        total_correct: usize,
    },
    #[serde(rename_all = "camelCase")]
    QuizFinalResult {
        message: String,
        emotion: Emotion,
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<String>,
        all_correct: bool,
    },
    Error {
        message: String,
        emotion: Emotion,
    },
}

type WsSender = SplitSink<WebSocket, Message>;

async fn send_event(sender: &mut WsSender, event: &ServerEvent) {
    match serde_json::to_string(event) {
        Ok(json) => {
            if let Err(e) = sender.send(Message::Text(json)).await {
                debug!(error = %e, "websocket send failed");
            }
        }
        Err(e) => warn!(error = %e, "event serialization failed"),
    }
}

/// WebSocket 升级入口
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (mut sender, mut receiver) = socket.split();

    state.metrics.record_connection_opened();
    info!(session_id, "websocket connected");

    // 接続直後に問候を送る
    let greeting = state.turn_service.greeting(&session_id, None).await;
    send_event(&mut sender, &ServerEvent::Greeting(greeting)).await;

    while let Some(message) = receiver.next().await {
        let message = match message {
            Ok(m) => m,
            Err(e) => {
                debug!(session_id, error = %e, "websocket receive error");
                break;
            }
        };

        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    handle_event(event, &session_id, &state, &mut sender).await;
                }
                Err(e) => {
                    warn!(session_id, error = %e, "invalid client event");
                    let language = session_language(&state, &session_id);
                    send_event(
                        &mut sender,
                        &ServerEvent::Error {
                            message: error_message(language).to_string(),
                            emotion: Emotion::Neutral,
                        },
                    )
                    .await;
                }
            },
            Message::Close(_) => break,
            // ping/pong は axum が処理する
            _ => {}
        }
    }

    state.quiz.clear(&session_id);
    state.turn_service.end_session(&session_id);
    state.metrics.record_connection_closed();
    info!(session_id, "websocket disconnected");
}

fn session_language(state: &AppState, session_id: &str) -> Language {
    state
        .sessions
        .get(session_id)
        .map(|s| s.language)
        .unwrap_or_default()
}

fn session_visitor(state: &AppState, session_id: &str) -> Option<String> {
    state.sessions.get(session_id).and_then(|s| s.visitor_id)
}

fn error_message(language: Language) -> &'static str {
    match language {
        Language::Ja => "申し訳ございません。エラーが発生しました。",
        Language::En => "Sorry, an error occurred.",
    }
}

async fn handle_event(
    event: ClientEvent,
    session_id: &str,
    state: &Arc<AppState>,
    sender: &mut WsSender,
) {
    match event {
        ClientEvent::Message {
            message,
            visitor_id,
            selected_suggestions,
        } => {
            let request = MessageRequest {
                message,
                visitor_id,
                selected_suggestions,
            };
            let envelope = state.turn_service.process_message(session_id, request).await;
            send_event(sender, &ServerEvent::Response(envelope)).await;
        }

        ClientEvent::SetLanguage { language } => {
            let language = Language::from_tag(&language);
            send_event(
                sender,
                &ServerEvent::LanguageChanged {
                    language: language.tag().to_string(),
                },
            )
            .await;
            // 言語切替後は新しい言語で問候し直す
            let greeting = state.turn_service.greeting(session_id, Some(language)).await;
            send_event(sender, &ServerEvent::Greeting(greeting)).await;
        }

        ClientEvent::VisitorInfo { visitor_id } => {
            state.visitors.register_visit(&visitor_id);
            state.sessions.update(session_id, |session| {
                session.visitor_id = Some(visitor_id.clone());
            });
            // 既知訪問者なら関係性を反映した問候に差し替わる
            let greeting = state.turn_service.greeting(session_id, None).await;
            send_event(sender, &ServerEvent::Greeting(greeting)).await;
        }

        ClientEvent::RequestQuizProposal => {
            let language = session_language(state, session_id);
            let message = state.quiz.proposal_message(language).to_string();
            let audio = state
                .turn_service
                .synthesize(&message, Emotion::Happy, language)
                .await;
            send_event(
                sender,
                &ServerEvent::QuizProposal {
                    message,
                    emotion: Emotion::Happy,
                    audio,
                },
            )
            .await;
        }

        ClientEvent::QuizStart => {
            let language = session_language(state, session_id);
            state.quiz.start(session_id, language);
            send_quiz_question(state, language, 0, sender).await;
        }

        ClientEvent::QuizAnswer {
            question_index,
            is_correct,
        } => {
            let language = session_language(state, session_id);
            match state
                .quiz
                .answer(session_id, language, question_index, is_correct)
            {
                Some(feedback) => {
                    let audio_text = format!("{} {}", feedback.message, feedback.explanation);
                    let audio = state
                        .turn_service
                        .synthesize(&audio_text, feedback.emotion, language)
                        .await;
                    send_event(
                        sender,
                        &ServerEvent::QuizAnswerResult {
                            question_index,
                            is_correct,
                            correct_option: feedback.correct_option.to_string(),
                            explanation: feedback.explanation.to_string(),
                            result_message: feedback.message,
                            emotion: feedback.emotion,
                            audio,
                            has_next_question: feedback.has_next_question,
                            next_question_index: feedback.next_question_index,
                            is_final_result: !feedback.has_next_question,
                            total_correct: feedback.total_correct,
                        },
                    )
                    .await;
                }
                None => {
                    send_event(
                        sender,
                        &ServerEvent::Error {
                            message: error_message(language).to_string(),
                            emotion: Emotion::Neutral,
                        },
                    )
                    .await;
                }
            }
        }

        ClientEvent::QuizDeclined => {
            let language = session_language(state, session_id);
            let message = state.quiz.decline(session_id, language).to_string();
            send_quiz_closing(state, session_id, language, message, sender).await;
        }

        ClientEvent::QuizQuit => {
            let language = session_language(state, session_id);
            let message = state.quiz.quit(session_id, language).to_string();
            send_quiz_closing(state, session_id, language, message, sender).await;
        }

        ClientEvent::RequestNextQuizQuestion { question_index } => {
            let language = session_language(state, session_id);
            send_quiz_question(state, language, question_index, sender).await;
        }

        ClientEvent::RequestQuizFinalResult { total_correct } => {
            let language = session_language(state, session_id);
            let visitor_id = session_visitor(state, session_id);
            let result = state.quiz.final_result(
                session_id,
                visitor_id.as_deref(),
                language,
                total_correct,
            );
            let audio = state
                .turn_service
                .synthesize(&result.message, result.emotion, language)
                .await;
            send_event(
                sender,
                &ServerEvent::QuizFinalResult {
                    message: result.message,
                    emotion: result.emotion,
                    audio,
                    all_correct: result.all_correct,
                },
            )
            .await;
        }
    }
}

async fn send_quiz_question(
    state: &Arc<AppState>,
    language: Language,
    question_index: usize,
    sender: &mut WsSender,
) {
    let Some(question) = state.quiz.question(language, question_index) else {
        send_event(
            sender,
            &ServerEvent::Error {
                message: error_message(language).to_string(),
                emotion: Emotion::Neutral,
            },
        )
        .await;
        return;
    };

    let prefix = match language {
        Language::Ja => format!("問題{}: {}", question_index + 1, question.question),
        Language::En => format!("Question {}: {}", question_index + 1, question.question),
    };
    let audio = state
        .turn_service
        .synthesize(&prefix, Emotion::Explaining, language)
        .await;

    send_event(
        sender,
        &ServerEvent::QuizQuestion {
            question_index,
            question: question.question.to_string(),
            options: question.options.iter().map(|o| o.to_string()).collect(),
            total_questions: crate::services::quiz::QUIZ_LENGTH,
            correct: question.correct,
            audio,
        },
    )
    .await;
}

/// 辞退・中断時の丁寧な応答（response イベントとして送る）
async fn send_quiz_closing(
    state: &Arc<AppState>,
    session_id: &str,
    language: Language,
    message: String,
    sender: &mut WsSender,
) {
    let audio = state
        .turn_service
        .synthesize(&message, Emotion::Neutral, language)
        .await;
    let session = state.sessions.get_or_create(session_id);
    send_event(
        sender,
        &ServerEvent::Response(ResponseEnvelope {
            message,
            emotion: Emotion::Neutral,
            audio,
            language: language.tag().to_string(),
            suggestions: Vec::new(),
            relationship_level: session.relationship_style,
            interaction_count: session.interaction_count,
            mental_state: state.simulator.snapshot(),
            processing_time: 0.0,
        }),
    )
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_parsing() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"message","message":"こんにちは","visitorId":"v1","selectedSuggestions":["a"]}"#,
        )
        .unwrap();
        match event {
            ClientEvent::Message {
                message,
                visitor_id,
                selected_suggestions,
            } => {
                assert_eq!(message, "こんにちは");
                assert_eq!(visitor_id.as_deref(), Some("v1"));
                assert_eq!(selected_suggestions, vec!["a".to_string()]);
            }
            _ => panic!("unexpected event"),
        }
    }

    #[test]
    fn test_quiz_answer_parsing() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"quiz_answer","questionIndex":1,"isCorrect":true}"#)
                .unwrap();
        assert!(matches!(
            event,
            ClientEvent::QuizAnswer {
                question_index: 1,
                is_correct: true
            }
        ));
    }

    #[test]
    fn test_server_event_tagging() {
        let event = ServerEvent::LanguageChanged {
            language: "en".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"language_changed""#));
        assert!(json.contains(r#""language":"en""#));
    }

    #[test]
    fn test_error_event_shape() {
        let event = ServerEvent::Error {
            message: "oops".to_string(),
            emotion: Emotion::Neutral,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""emotion":"neutral""#));
    }
}
