//! 会话实体
//!
//! 每个活跃连接对应一个会话。会话在连接建立时创建，每轮对话更新，
//! 断开时将统计量汇入所属访客后销毁。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::models::emotion::Emotion;
use crate::models::language::Language;
use crate::models::mental_state::MentalState;
use crate::models::relationship::RelationshipStyle;

/// 情感历史保留的最大条数
pub const EMOTION_HISTORY_CAPACITY: usize = 50;

/// 对话消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 角色（user / assistant）
    pub role: String,
    /// 内容
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

/// 情感历史样本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionSample {
    /// 情感类别
    pub emotion: Emotion,
    /// 记录时间
    pub timestamp: DateTime<Utc>,
    /// 记录时的交互轮数
    pub interaction_count: u64,
}

/// 会话实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// 会话唯一标识
    pub id: String,

    /// 所属访客标识（客户端提供，可为空）
    pub visitor_id: Option<String>,

    /// 会话语言
    pub language: Language,

    /// 有序对话历史
    pub conversation_history: Vec<ChatMessage>,

    /// 交互轮数
    pub interaction_count: u64,

    /// 有界情感历史（容量 50，先进先出）
    pub emotion_history: VecDeque<EmotionSample>,

    /// 当前显示情感
    pub current_emotion: Emotion,

    /// 最近一次回合的心理状态快照
    pub mental_state: MentalState,

    /// 关系风格
    pub relationship_style: RelationshipStyle,

    /// 本会话已展示/选择过的建议
    pub selected_suggestions: Vec<String>,

    /// 本会话中触及过的话题词
    pub discovered_topics: HashSet<String>,

    /// 是否尚未发送过首次问候
    pub first_interaction: bool,

    /// 会话创建时间
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// 创建新会话
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            visitor_id: None,
            language: Language::Ja,
            conversation_history: Vec::new(),
            interaction_count: 0,
            emotion_history: VecDeque::with_capacity(EMOTION_HISTORY_CAPACITY),
            current_emotion: Emotion::Neutral,
            mental_state: MentalState::default(),
            relationship_style: RelationshipStyle::Formal,
            selected_suggestions: Vec::new(),
            discovered_topics: HashSet::new(),
            first_interaction: true,
            created_at: Utc::now(),
        }
    }

    /// 追加一条对话消息
    pub fn push_message(&mut self, role: &str, content: &str) {
        self.conversation_history.push(ChatMessage::new(role, content));
    }

    /// 最近 n 条对话历史
    pub fn recent_history(&self, n: usize) -> &[ChatMessage] {
        let start = self.conversation_history.len().saturating_sub(n);
        &self.conversation_history[start..]
    }

    /// 记录一次情感，超过容量时淘汰最旧样本
    pub fn record_emotion(&mut self, emotion: Emotion) {
        self.current_emotion = emotion;
        if self.emotion_history.len() >= EMOTION_HISTORY_CAPACITY {
            self.emotion_history.pop_front();
        }
        self.emotion_history.push_back(EmotionSample {
            emotion,
            timestamp: Utc::now(),
            interaction_count: self.interaction_count,
        });
    }

    /// 合并客户端上报的已选建议（大小写不敏感去重）
    pub fn merge_selected_suggestions(&mut self, incoming: &[String]) {
        for suggestion in incoming {
            let exists = self
                .selected_suggestions
                .iter()
                .any(|s| s.eq_ignore_ascii_case(suggestion));
            if !exists {
                self.selected_suggestions.push(suggestion.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_create() {
        let session = Session::new("session_1");
        assert_eq!(session.id, "session_1");
        assert_eq!(session.current_emotion, Emotion::Neutral);
        assert_eq!(session.language, Language::Ja);
        assert!(session.first_interaction);
        assert!(session.emotion_history.is_empty());
    }

    #[test]
    fn test_emotion_history_bounded() {
        let mut session = Session::new("session_1");
        for i in 0..(EMOTION_HISTORY_CAPACITY + 10) {
            session.interaction_count = i as u64;
            session.record_emotion(Emotion::Happy);
        }
        assert_eq!(session.emotion_history.len(), EMOTION_HISTORY_CAPACITY);
        // 最旧的 10 条已被淘汰
        assert_eq!(session.emotion_history.front().unwrap().interaction_count, 10);
    }

    #[test]
    fn test_recent_history_window() {
        let mut session = Session::new("session_1");
        for i in 0..15 {
            session.push_message("user", &format!("msg {}", i));
        }
        let recent = session.recent_history(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].content, "msg 5");
    }

    #[test]
    fn test_merge_selected_suggestions_dedup() {
        let mut session = Session::new("session_1");
        session.merge_selected_suggestions(&["What is Kyo-Yuzen?".to_string()]);
        session.merge_selected_suggestions(&[
            "what is kyo-yuzen?".to_string(),
            "Any hobbies?".to_string(),
        ]);
        assert_eq!(session.selected_suggestions.len(), 2);
    }
}
