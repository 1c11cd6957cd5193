//! 建议阶段管理
//!
//! 追问建议按理解阶段推进：概要 → 技术细节 → 职人个人话题。
//! 阶段由已选建议数（会话与访客合并去重后）决定，候选池按语言
//! 与阶段固定内置；过滤已选后最多随机抽取 3 条。

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use std::collections::HashSet;

use crate::models::language::Language;

/// 建议阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionStage {
    /// 概要把握
    Overview,
    /// 技术细节
    Technical,
    /// 职人个人
    Personal,
}

impl SuggestionStage {
    /// 从已选建议数判定阶段：0-2 概要、3-4 技术、5 以上个人
    pub fn from_selected_count(count: usize) -> SuggestionStage {
        if count < 3 {
            SuggestionStage::Overview
        } else if count < 5 {
            SuggestionStage::Technical
        } else {
            SuggestionStage::Personal
        }
    }
}

/// 单次返回的最大建议数
pub const MAX_SUGGESTIONS: usize = 3;

static POOL_JA_OVERVIEW: &[&str] = &[
    "京友禅とは何ですか？",
    "友禅染の歴史を教えて",
    "他の染色技法との違いは？",
];

static POOL_JA_TECHNICAL: &[&str] = &["のりおき工程って何？", "一番難しい技術は？"];

static POOL_JA_PERSONAL: &[&str] = &[
    "職人になったきっかけは？",
    "15年間で一番大変だったこと",
    "仕事のやりがいは？",
    "一日のスケジュール",
    "将来の夢は？",
    "プライベートはどう過ごす？",
    "後継者について",
    "海外での反応は？",
    "師匠との思い出は？",
    "印象に残っている作品は？",
    "お客様とのエピソード",
    "失敗から学んだこと",
    "休日の過ごし方",
    "趣味はある？",
    "家族は仕事を応援してくれる？",
];

static POOL_EN_OVERVIEW: &[&str] = &[
    "What is Kyo-Yuzen?",
    "Tell me about the history of Yuzen dyeing",
];

static POOL_EN_TECHNICAL: &[&str] = &[
    "What is the norioki process?",
    "What's the most difficult technique?",
];

static POOL_EN_PERSONAL: &[&str] = &[
    "What led you to become a craftsman?",
    "What was the hardest thing in 15 years?",
    "What's rewarding about your work?",
    "Your daily schedule",
    "Your future dreams?",
    "How do you spend your private time?",
    "About successors",
    "Reactions from overseas?",
    "Memories with your master?",
    "Your most memorable work?",
    "Episodes with customers",
    "Lessons from failures",
    "How do you spend weekends?",
    "Any hobbies?",
    "Does your family support your work?",
];

static FALLBACK_JA: &[&str] = &[
    "京友禅について教えて",
    "どんな作品を作っていますか？",
    "友禅の工程を説明してください",
];

static FALLBACK_EN: &[&str] = &[
    "Tell me about Kyo-Yuzen",
    "What kind of works do you create?",
    "Explain the Yuzen process",
];

fn pool_for(language: Language, stage: SuggestionStage) -> &'static [&'static str] {
    match (language, stage) {
        (Language::Ja, SuggestionStage::Overview) => POOL_JA_OVERVIEW,
        (Language::Ja, SuggestionStage::Technical) => POOL_JA_TECHNICAL,
        (Language::Ja, SuggestionStage::Personal) => POOL_JA_PERSONAL,
        (Language::En, SuggestionStage::Overview) => POOL_EN_OVERVIEW,
        (Language::En, SuggestionStage::Technical) => POOL_EN_TECHNICAL,
        (Language::En, SuggestionStage::Personal) => POOL_EN_PERSONAL,
    }
}

fn normalize(suggestion: &str) -> String {
    suggestion.trim().to_lowercase()
}

/// 建议管理器
pub struct SuggestionManager {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl SuggestionManager {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
        }
    }

    /// 使用指定随机源创建（测试用）
    pub fn with_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// 生成当前阶段的追问建议
    ///
    /// `selected` 为会话与访客合并后的已选建议，大小写和首尾
    /// 空白不敏感地去重与过滤。候选不超过 3 条时全部返回，
    /// 否则随机抽取 3 条。候选池为空时退回固定默认列表。
    pub fn suggestions_for(&self, language: Language, selected: &[String]) -> Vec<String> {
        let selected_normalized: HashSet<String> =
            selected.iter().map(|s| normalize(s)).collect();

        let stage = SuggestionStage::from_selected_count(selected_normalized.len());
        let pool = pool_for(language, stage);
        if pool.is_empty() {
            let fallback = match language {
                Language::Ja => FALLBACK_JA,
                Language::En => FALLBACK_EN,
            };
            return fallback.iter().map(|s| s.to_string()).collect();
        }

        let mut available: Vec<&str> = pool
            .iter()
            .copied()
            .filter(|s| !selected_normalized.contains(&normalize(s)))
            .collect();

        if available.len() <= MAX_SUGGESTIONS {
            return available.iter().map(|s| s.to_string()).collect();
        }

        let mut guard = self.rng.lock();
        available.shuffle(&mut **guard);
        available
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|s| s.to_string())
            .collect()
    }

    /// 当前阶段（统计与问候流程用）
    pub fn stage_for(&self, selected: &[String]) -> SuggestionStage {
        let unique: HashSet<String> = selected.iter().map(|s| normalize(s)).collect();
        SuggestionStage::from_selected_count(unique.len())
    }
}

impl Default for SuggestionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    fn manager() -> SuggestionManager {
        SuggestionManager::with_rng(ChaCha8Rng::seed_from_u64(1))
    }

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(0, SuggestionStage::Overview)]
    #[case(2, SuggestionStage::Overview)]
    #[case(3, SuggestionStage::Technical)]
    #[case(4, SuggestionStage::Technical)]
    #[case(5, SuggestionStage::Personal)]
    #[case(20, SuggestionStage::Personal)]
    fn test_stage_thresholds(#[case] count: usize, #[case] expected: SuggestionStage) {
        assert_eq!(SuggestionStage::from_selected_count(count), expected);
    }

    #[test]
    fn test_overview_returns_all_when_small_pool() {
        let suggestions = manager().suggestions_for(Language::Ja, &[]);
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions.contains(&"京友禅とは何ですか？".to_string()));
    }

    #[test]
    fn test_never_repeats_selected() {
        let selected = owned(&["京友禅とは何ですか？"]);
        let suggestions = manager().suggestions_for(Language::Ja, &selected);
        assert!(!suggestions.contains(&"京友禅とは何ですか？".to_string()));
    }

    #[test]
    fn test_filter_is_case_and_space_insensitive() {
        let selected = owned(&["  what is kyo-yuzen?  "]);
        let suggestions = manager().suggestions_for(Language::En, &selected);
        assert!(!suggestions.contains(&"What is Kyo-Yuzen?".to_string()));
    }

    #[test]
    fn test_personal_stage_samples_three() {
        // 去重后 5 条已选 → 个人阶段，池内 15 条，抽 3 条
        let selected = owned(&[
            "京友禅とは何ですか？",
            "友禅染の歴史を教えて",
            "他の染色技法との違いは？",
            "のりおき工程って何？",
            "一番難しい技術は？",
        ]);
        let m = manager();
        for _ in 0..20 {
            let suggestions = m.suggestions_for(Language::Ja, &selected);
            assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
            let unique: HashSet<&String> = suggestions.iter().collect();
            assert_eq!(unique.len(), MAX_SUGGESTIONS);
        }
    }

    #[test]
    fn test_duplicate_selections_count_once_for_stage() {
        let selected = owned(&[
            "京友禅とは何ですか？",
            "京友禅とは何ですか？",
            "京友禅とは何ですか？",
        ]);
        // 去重后 1 条已选 → 仍在概要阶段
        assert_eq!(manager().stage_for(&selected), SuggestionStage::Overview);
    }
}
