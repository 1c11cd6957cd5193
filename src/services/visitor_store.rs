//! 访客存储
//!
//! 访客的长期记录映射。会话断开时调用 `roll_up_session`
//! 把会话统计汇入访客，关系等级只升不降。

use dashmap::DashMap;
use serde::Serialize;

use crate::models::relationship::{calculate_relationship_level, RelationshipInfo};
use crate::models::session::Session;
use crate::models::visitor::Visitor;

/// 访客摘要（统计端点用）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorSummary {
    pub visitor_id: String,
    pub visit_count: u64,
    pub total_conversations: u64,
    pub relationship_level: u8,
    pub quiz_completed: bool,
    pub discovered_topics: Vec<String>,
}

/// 访客存储
pub struct VisitorStore {
    visitors: DashMap<String, Visitor>,
}

impl VisitorStore {
    pub fn new() -> Self {
        Self {
            visitors: DashMap::new(),
        }
    }

    /// 登记一次到访：已知访客累加到访次数，新访客建档
    pub fn register_visit(&self, visitor_id: &str) -> Visitor {
        match self.visitors.entry(visitor_id.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                occupied.get_mut().record_visit();
                occupied.get().clone()
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(Visitor::new(visitor_id)).clone()
            }
        }
    }

    pub fn get(&self, visitor_id: &str) -> Option<Visitor> {
        self.visitors.get(visitor_id).map(|v| v.clone())
    }

    /// 当前关系信息。未建档访客按零会话计算。
    pub fn relationship_of(&self, visitor_id: Option<&str>, extra_turns: u64) -> RelationshipInfo {
        match visitor_id.and_then(|id| self.get(id)) {
            Some(visitor) => {
                if visitor.quiz_completed {
                    return visitor.relationship();
                }
                let info = calculate_relationship_level(visitor.total_conversations + extra_turns);
                RelationshipInfo {
                    level: info.level.max(visitor.relationship_level),
                    style: info.style,
                }
            }
            None => calculate_relationship_level(extra_turns),
        }
    }

    /// 把已结束会话汇入所属访客
    pub fn roll_up_session(&self, session: &Session) {
        if let Some(visitor_id) = &session.visitor_id {
            let mut entry = self
                .visitors
                .entry(visitor_id.clone())
                .or_insert_with(|| Visitor::new(visitor_id));
            entry.roll_up(session);
        }
    }

    /// 答题全对，访客升至最高等级
    pub fn complete_quiz(&self, visitor_id: &str) {
        let mut entry = self
            .visitors
            .entry(visitor_id.to_string())
            .or_insert_with(|| Visitor::new(visitor_id));
        entry.complete_quiz();
    }

    /// 访客历史已选建议
    pub fn selected_suggestions_of(&self, visitor_id: &str) -> Vec<String> {
        self.get(visitor_id)
            .map(|v| v.selected_suggestions.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    /// 全部访客摘要（统计端点用）
    pub fn summaries(&self) -> Vec<VisitorSummary> {
        self.visitors
            .iter()
            .map(|entry| {
                let mut topics: Vec<String> =
                    entry.discovered_topics.iter().cloned().collect();
                topics.sort();
                VisitorSummary {
                    visitor_id: entry.id.clone(),
                    visit_count: entry.visit_count,
                    total_conversations: entry.total_conversations,
                    relationship_level: entry.relationship_level,
                    quiz_completed: entry.quiz_completed,
                    discovered_topics: topics,
                }
            })
            .collect()
    }
}

impl Default for VisitorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::relationship::{RelationshipStyle, MASTER_LEVEL};

    #[test]
    fn test_roll_up_raises_level_monotonically() {
        let store = VisitorStore::new();
        store.register_visit("v1");

        let mut session = Session::new("s1");
        session.visitor_id = Some("v1".to_string());
        session.interaction_count = 8;
        store.roll_up_session(&session);
        assert_eq!(store.get("v1").unwrap().relationship_level, 4);

        // 追加の空会話では等級は下がらない
        let mut empty = Session::new("s2");
        empty.visitor_id = Some("v1".to_string());
        store.roll_up_session(&empty);
        assert_eq!(store.get("v1").unwrap().relationship_level, 4);
    }

    #[test]
    fn test_relationship_counts_in_flight_turns() {
        let store = VisitorStore::new();
        store.register_visit("v1");
        // 既存 0 会話 + 進行中 4 ターン → level 2
        let info = store.relationship_of(Some("v1"), 4);
        assert_eq!(info.level, 2);
        assert_eq!(info.style, RelationshipStyle::Friendly);
    }

    #[test]
    fn test_register_visit_counts() {
        let store = VisitorStore::new();
        assert_eq!(store.register_visit("v1").visit_count, 1);
        assert_eq!(store.register_visit("v1").visit_count, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_visitor_is_formal() {
        let store = VisitorStore::new();
        let info = store.relationship_of(None, 0);
        assert_eq!(info.level, 0);
        assert_eq!(info.style, RelationshipStyle::Formal);
    }

    #[test]
    fn test_quiz_completion_grants_master() {
        let store = VisitorStore::new();
        store.complete_quiz("v1");
        let info = store.relationship_of(Some("v1"), 0);
        assert_eq!(info.level, MASTER_LEVEL);
    }

    #[test]
    fn test_suggestion_union_across_sessions() {
        let store = VisitorStore::new();
        let mut session = Session::new("s1");
        session.visitor_id = Some("v1".to_string());
        session.selected_suggestions.push("京友禅とは何ですか？".to_string());
        store.roll_up_session(&session);

        let mut later = Session::new("s2");
        later.visitor_id = Some("v1".to_string());
        later.selected_suggestions.push("のりおき工程って何？".to_string());
        later.selected_suggestions.push("京友禅とは何ですか？".to_string());
        store.roll_up_session(&later);

        assert_eq!(store.selected_suggestions_of("v1").len(), 2);
    }
}
