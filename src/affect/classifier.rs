//! 情感分类器
//!
//! 按固定优先级对用户输入判定情感类别：
//! 1. 不当话题词命中 → DangerQuestion（强制）
//! 2. 认真提问打分 ≥ 2 → Explaining（强制）
//! 3. 基础情感词表（喜 → 悲 → 怒 → 惊，先命中先返回）
//! 4. 以上都不命中 → Neutral

use crate::models::emotion::Emotion;
use crate::models::language::Language;

/// 不当话题词表（日英混合，统一小写比较）
static DANGER_TERMS: &[&str] = &[
    "セクシー",
    "エロ",
    "裸",
    "脱",
    "下着",
    "胸",
    "おっぱい",
    "パンツ",
    "ブラ",
    "きわどい",
    "えっち",
    "いやらしい",
    "sexy",
    "nude",
    "naked",
    "breast",
    "underwear",
    "erotic",
    "strip",
    "panties",
    "bra",
    "inappropriate",
];

/// 疑问标记
static QUESTION_MARKERS: &[&str] = &[
    "?", "？", "どう", "なぜ", "なに", "教えて", "how", "why", "what", "explain",
];

/// 专业话题词
static TECHNICAL_TERMS: &[&str] = &[
    "方法",
    "手順",
    "技術",
    "仕組み",
    "やり方",
    "原理",
    "システム",
    "詳しく",
    "具体的",
];

static HAPPY_WORDS: &[&str] = &[
    "嬉しい",
    "うれしい",
    "楽しい",
    "たのしい",
    "わくわく",
    "やった",
    "最高",
    "happy",
    "glad",
    "excited",
    "joy",
    "great",
];

static SAD_WORDS: &[&str] = &[
    "悲しい",
    "かなしい",
    "寂しい",
    "さみしい",
    "辛い",
    "つらい",
    "泣",
    "涙",
    "sad",
    "lonely",
    "cry",
    "tear",
    "depressed",
];

static ANGRY_WORDS: &[&str] = &[
    "怒",
    "おこ",
    "むかつく",
    "イライラ",
    "腹立",
    "ムカ",
    "angry",
    "mad",
    "furious",
    "annoyed",
    "pissed",
];

static SURPRISED_WORDS: &[&str] = &[
    "驚",
    "びっくり",
    "すごい",
    "まさか",
    "えっ",
    "わっ",
    "surprise",
    "amazing",
    "wow",
    "incredible",
    "unbelievable",
];

/// 认真提问的长文阈值（字符数）
const LONG_TEXT_THRESHOLD: usize = 50;

/// 情感分类器 trait
pub trait EmotionClassifier: Send + Sync {
    /// 对用户文本判定情感类别。纯函数，不修改任何状态。
    fn classify(&self, text: &str, language: Language) -> Emotion;
}

/// 规则优先级分类器
///
/// 词表同时覆盖日英两种语言，language 参数保留给需要
/// 区分词表的策略实现。
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        KeywordClassifier
    }

    fn seriousness_score(text: &str, text_lower: &str) -> u32 {
        let mut score = 0;
        if QUESTION_MARKERS.iter().any(|m| text_lower.contains(m)) {
            score += 1;
        }
        if text.chars().count() > LONG_TEXT_THRESHOLD {
            score += 1;
        }
        if TECHNICAL_TERMS.iter().any(|t| text_lower.contains(t)) {
            score += 1;
        }
        score
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionClassifier for KeywordClassifier {
    fn classify(&self, text: &str, _language: Language) -> Emotion {
        if text.is_empty() {
            return Emotion::Neutral;
        }

        let text_lower = text.to_lowercase();
        let text_lower = text_lower.trim();

        if DANGER_TERMS.iter().any(|k| text_lower.contains(k)) {
            return Emotion::DangerQuestion;
        }

        if Self::seriousness_score(text, text_lower) >= 2 {
            return Emotion::Explaining;
        }

        if HAPPY_WORDS.iter().any(|w| text_lower.contains(w)) {
            return Emotion::Happy;
        }
        if SAD_WORDS.iter().any(|w| text_lower.contains(w)) {
            return Emotion::Sad;
        }
        if ANGRY_WORDS.iter().any(|w| text_lower.contains(w)) {
            return Emotion::Angry;
        }
        if SURPRISED_WORDS.iter().any(|w| text_lower.contains(w)) {
            return Emotion::Surprised;
        }

        Emotion::Neutral
    }
}

/// 创建分类器
///
/// `strategy` 为 "weighted" 时使用加权分类器，其余值使用规则分类器。
pub fn create_classifier(strategy: &str) -> Box<dyn EmotionClassifier> {
    match strategy {
        "weighted" => Box::new(super::weighted::WeightedClassifier::new()),
        _ => Box::new(KeywordClassifier::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn classifier() -> KeywordClassifier {
        KeywordClassifier::new()
    }

    #[rstest]
    #[case("今日は嬉しいです", Emotion::Happy)]
    #[case("ちょっと悲しい気分", Emotion::Sad)]
    #[case("イライラする！", Emotion::Angry)]
    #[case("びっくりした！", Emotion::Surprised)]
    #[case("こんにちは", Emotion::Neutral)]
    #[case("I'm so happy today", Emotion::Happy)]
    #[case("that makes me mad", Emotion::Angry)]
    fn test_basic_emotions(#[case] text: &str, #[case] expected: Emotion) {
        assert_eq!(classifier().classify(text, Language::Ja), expected);
    }

    #[test]
    fn test_danger_terms_always_win() {
        // 不当話題词即使与其他情感词同时出现也最优先
        assert_eq!(
            classifier().classify("嬉しいけどセクシーな話をして", Language::Ja),
            Emotion::DangerQuestion
        );
        assert_eq!(
            classifier().classify("tell me something SEXY", Language::En),
            Emotion::DangerQuestion
        );
    }

    #[test]
    fn test_serious_question_scores() {
        // 疑問标记 + 专业词 = 2 分
        assert_eq!(
            classifier().classify("友禅の技術を教えて？", Language::Ja),
            Emotion::Explaining
        );
        // 疑問标记のみ = 1 分、不足
        assert_eq!(classifier().classify("元気？", Language::Ja), Emotion::Neutral);
    }

    #[test]
    fn test_long_question_is_serious() {
        let long = "京友禅というのはどういうものなのか、その歴史や文化的背景も含めてできるだけ丁寧に詳しく説明してもらえますか";
        assert!(long.chars().count() > 50);
        assert_eq!(classifier().classify(long, Language::Ja), Emotion::Explaining);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(classifier().classify("", Language::Ja), Emotion::Neutral);
    }

    #[test]
    fn test_factory_strategy() {
        let c = create_classifier("keyword");
        assert_eq!(c.classify("嬉しい", Language::Ja), Emotion::Happy);
        let w = create_classifier("weighted");
        assert_eq!(w.classify("嬉しい！最高！", Language::Ja), Emotion::Happy);
    }
}
