//! 关系进阶
//!
//! 根据累计会话次数计算访客与角色之间的理解度等级和说话风格。
//! 等级只升不降；5 级（Master）仅能通过答题全对获得。

use serde::{Deserialize, Serialize};

use crate::models::language::Language;

/// 最高关系等级（答题奖励）
pub const MASTER_LEVEL: u8 = 5;

/// 说话风格
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStyle {
    /// 初次见面的敬语
    Formal,
    /// 礼貌但轻松
    CasualPolite,
    /// 亲切
    Friendly,
    /// 亲近
    Close,
    /// 挚友
    BestFriend,
}

impl Default for RelationshipStyle {
    fn default() -> Self {
        RelationshipStyle::Formal
    }
}

/// 关系等级信息
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RelationshipInfo {
    /// 等级（0-5）
    pub level: u8,
    /// 对应的说话风格
    pub style: RelationshipStyle,
}

/// 根据累计会话次数计算关系等级
pub fn calculate_relationship_level(conversation_count: u64) -> RelationshipInfo {
    let (level, style) = match conversation_count {
        0..=1 => (0, RelationshipStyle::Formal),
        2..=3 => (1, RelationshipStyle::CasualPolite),
        4..=5 => (2, RelationshipStyle::Friendly),
        6..=7 => (3, RelationshipStyle::Close),
        _ => (4, RelationshipStyle::BestFriend),
    };
    RelationshipInfo { level, style }
}

/// 根据语言和关系风格选择问候语
pub fn greeting_for(language: Language, style: RelationshipStyle) -> &'static str {
    match (language, style) {
        (Language::Ja, RelationshipStyle::Formal) => {
            "はじめまして！手描き京友禅職人のふたばです！何でも質問してくださいね！"
        }
        (Language::Ja, RelationshipStyle::CasualPolite) => {
            "こんにちは！また会えて嬉しいです。今日はどんなお話をしましょうか？"
        }
        (Language::Ja, RelationshipStyle::Friendly) | (Language::Ja, RelationshipStyle::Close) => {
            "やっほー！会いたかったよ〜！今日も楽しくお話しようね！"
        }
        (Language::Ja, RelationshipStyle::BestFriend) => {
            "おっす！元気にしてた？なんか面白い話ある？"
        }
        (Language::En, RelationshipStyle::Formal) => {
            "Hello! I'm Rei. It's a pleasure to meet you."
        }
        (Language::En, RelationshipStyle::CasualPolite) => {
            "Hello again! It's nice to see you. What would you like to talk about today?"
        }
        (Language::En, RelationshipStyle::Friendly) | (Language::En, RelationshipStyle::Close) => {
            "Hey there! I missed you! Let's have fun chatting today!"
        }
        (Language::En, RelationshipStyle::BestFriend) => {
            "Yo! How've you been? Got any interesting stories?"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, RelationshipStyle::Formal)]
    #[case(1, 0, RelationshipStyle::Formal)]
    #[case(2, 1, RelationshipStyle::CasualPolite)]
    #[case(3, 1, RelationshipStyle::CasualPolite)]
    #[case(4, 2, RelationshipStyle::Friendly)]
    #[case(5, 2, RelationshipStyle::Friendly)]
    #[case(6, 3, RelationshipStyle::Close)]
    #[case(7, 3, RelationshipStyle::Close)]
    #[case(8, 4, RelationshipStyle::BestFriend)]
    #[case(100, 4, RelationshipStyle::BestFriend)]
    fn test_level_thresholds(
        #[case] count: u64,
        #[case] level: u8,
        #[case] style: RelationshipStyle,
    ) {
        let info = calculate_relationship_level(count);
        assert_eq!(info.level, level);
        assert_eq!(info.style, style);
    }

    #[test]
    fn test_greeting_exists_for_all_styles() {
        for style in [
            RelationshipStyle::Formal,
            RelationshipStyle::CasualPolite,
            RelationshipStyle::Friendly,
            RelationshipStyle::Close,
            RelationshipStyle::BestFriend,
        ] {
            assert!(!greeting_for(Language::Ja, style).is_empty());
            assert!(!greeting_for(Language::En, style).is_empty());
        }
    }
}
