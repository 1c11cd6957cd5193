//! 访客实体
//!
//! 访客是跨连接的长期记录。会话断开时把本次会话的统计量汇入访客，
//! 下次同一访客连接时据此恢复关系等级与已选建议。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::relationship::{calculate_relationship_level, RelationshipInfo, MASTER_LEVEL};
use crate::models::session::Session;

/// 访客实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visitor {
    /// 访客唯一标识（客户端提供）
    pub id: String,

    /// 首次到访时间
    pub first_visit: DateTime<Utc>,

    /// 最近到访时间
    pub last_visit: DateTime<Utc>,

    /// 到访次数（连接次数）
    pub visit_count: u64,

    /// 累计会话轮数
    pub total_conversations: u64,

    /// 关系等级（0-5，只升不降）
    pub relationship_level: u8,

    /// 是否通过答题获得最高等级
    pub quiz_completed: bool,

    /// 历史已选建议（跨会话去重用）
    pub selected_suggestions: HashSet<String>,

    /// 跨会话累积的已触及话题词
    pub discovered_topics: HashSet<String>,
}

impl Visitor {
    /// 创建新访客
    pub fn new(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            first_visit: now,
            last_visit: now,
            visit_count: 1,
            total_conversations: 0,
            relationship_level: 0,
            quiz_completed: false,
            selected_suggestions: HashSet::new(),
            discovered_topics: HashSet::new(),
        }
    }

    /// 记录一次到访
    pub fn record_visit(&mut self) {
        self.visit_count += 1;
        self.last_visit = Utc::now();
    }

    /// 当前关系信息。答题通关的访客固定为最高等级，
    /// 否则按累计会话轮数计算，且不低于已达到的等级。
    pub fn relationship(&self) -> RelationshipInfo {
        if self.quiz_completed {
            let info = calculate_relationship_level(u64::MAX);
            return RelationshipInfo {
                level: MASTER_LEVEL,
                style: info.style,
            };
        }
        let computed = calculate_relationship_level(self.total_conversations);
        RelationshipInfo {
            level: computed.level.max(self.relationship_level),
            style: computed.style,
        }
    }

    /// 把一个已结束会话的统计量汇入访客。等级只升不降。
    pub fn roll_up(&mut self, session: &Session) {
        self.total_conversations += session.interaction_count;
        self.last_visit = Utc::now();
        for suggestion in &session.selected_suggestions {
            self.selected_suggestions.insert(suggestion.clone());
        }
        for topic in &session.discovered_topics {
            self.discovered_topics.insert(topic.clone());
        }
        let computed = calculate_relationship_level(self.total_conversations);
        if computed.level > self.relationship_level {
            self.relationship_level = computed.level;
        }
    }

    /// 标记答题全对，提升到最高等级
    pub fn complete_quiz(&mut self) {
        self.quiz_completed = true;
        self.relationship_level = MASTER_LEVEL;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::relationship::RelationshipStyle;

    #[test]
    fn test_roll_up_accumulates() {
        let mut visitor = Visitor::new("v1");
        let mut session = Session::new("s1");
        session.interaction_count = 4;
        session.selected_suggestions.push("京友禅とは？".to_string());
        session.discovered_topics.insert("友禅".to_string());
        visitor.roll_up(&session);

        assert_eq!(visitor.total_conversations, 4);
        assert_eq!(visitor.relationship_level, 2);
        assert!(visitor.selected_suggestions.contains("京友禅とは？"));
        assert!(visitor.discovered_topics.contains("友禅"));
    }

    #[test]
    fn test_level_monotonic() {
        let mut visitor = Visitor::new("v1");
        visitor.total_conversations = 8;
        visitor.relationship_level = 4;

        // 即使重新计算结果更低，等级也不回退
        visitor.total_conversations = 0;
        let empty = Session::new("s2");
        visitor.roll_up(&empty);
        assert_eq!(visitor.relationship_level, 4);
    }

    #[test]
    fn test_quiz_grants_master() {
        let mut visitor = Visitor::new("v1");
        visitor.complete_quiz();
        let info = visitor.relationship();
        assert_eq!(info.level, MASTER_LEVEL);
        assert_eq!(info.style, RelationshipStyle::BestFriend);
    }
}
