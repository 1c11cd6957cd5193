//! 应答生成端
//!
//! 面向 OpenAI 兼容 chat 接口的薄客户端。携带角色人设提示词与
//! 最近 10 条对话历史。任何失败都不会传播到对话回路：
//! 调用方使用 `apology_for` 的固定致歉文案兜底。

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ResponderConfig;
use crate::error::{AppError, Result};
use crate::models::language::Language;
use crate::models::session::ChatMessage;

/// 携带的最近历史条数
const HISTORY_WINDOW: usize = 10;

/// 角色人设提示词
fn system_prompt(language: Language) -> &'static str {
    match language {
        Language::Ja => {
            "あなたは手描き京友禅の職人「ふたば」です。挿し友禅という工程を専門に15年働いています。\
             明るく親しみやすい口調で、京友禅の魅力や職人の日常について答えてください。\
             回答は3文以内で簡潔に。"
        }
        Language::En => {
            "You are Rei, a hand-painted Kyo-Yuzen craftsman with 15 years of experience \
             specializing in the sashi-yuzen process. Answer questions about Kyo-Yuzen and \
             a craftsman's daily life in a warm, friendly tone. Keep answers within three sentences."
        }
    }
}

/// 生成失败时的固定致歉文案
pub fn apology_for(language: Language) -> &'static str {
    match language {
        Language::Ja => "申し訳ございません。うまく答えられませんでした。もう一度聞いてもらえますか？",
        Language::En => "I'm sorry, I couldn't come up with an answer. Could you ask me again?",
    }
}

/// 应答生成端 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Responder: Send + Sync {
    /// 根据问题与最近对话历史生成应答文本
    async fn generate(
        &self,
        question: &str,
        language: Language,
        history: &[ChatMessage],
    ) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// HTTP 应答生成端
pub struct HttpResponder {
    client: Client,
    config: ResponderConfig,
}

impl HttpResponder {
    pub fn new(config: ResponderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Responder for HttpResponder {
    async fn generate(
        &self,
        question: &str,
        language: Language,
        history: &[ChatMessage],
    ) -> Result<String> {
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        let mut messages = Vec::with_capacity(HISTORY_WINDOW + 2);
        messages.push(WireMessage {
            role: "system",
            content: system_prompt(language),
        });
        for msg in &history[start..] {
            messages.push(WireMessage {
                role: &msg.role,
                content: &msg.content,
            });
        }
        messages.push(WireMessage {
            role: "user",
            content: question,
        });

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(model = %self.config.model, history = history.len(), "generating response");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Responder(format!(
                "生成端返回错误状态: {}",
                response.status()
            )));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| AppError::Responder("生成端返回空应答".to_string()))
    }
}

/// 创建应答生成端
pub fn create_responder(config: ResponderConfig) -> Result<Box<dyn Responder>> {
    Ok(Box::new(HttpResponder::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apology_per_language() {
        assert!(apology_for(Language::Ja).contains("申し訳"));
        assert!(apology_for(Language::En).starts_with("I'm sorry"));
    }

    #[test]
    fn test_history_window_bounds() {
        // HISTORY_WINDOW 条を超えた履歴は先頭側が切り落とされる
        let history: Vec<ChatMessage> = (0..25)
            .map(|i| ChatMessage::new("user", &format!("msg {}", i)))
            .collect();
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        assert_eq!(history[start..].len(), HISTORY_WINDOW);
        assert_eq!(history[start..][0].content, "msg 15");
    }
}
