//! 加权情感分类器
//!
//! 规则分类器的备选策略：对四种基础情感分别打分，输出得分最高的
//! 类别和置信度。关键词命中 2.0 × 权重，语气正则命中 1.0 × 权重，
//! 语境短语命中 0.5；短文本放大最高分；竞争接近时压低置信度。
//! 不当话题与认真提问的强制判定仍然最优先。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::emotion::Emotion;
use crate::models::language::Language;

use super::classifier::{EmotionClassifier, KeywordClassifier};

struct EmotionLexicon {
    emotion: Emotion,
    keywords: &'static [&'static str],
    patterns: &'static [&'static str],
    context_phrases: &'static [&'static str],
    weight: f64,
}

static LEXICONS: &[EmotionLexicon] = &[
    EmotionLexicon {
        emotion: Emotion::Happy,
        keywords: &[
            "嬉しい", "うれしい", "楽しい", "たのしい", "ハッピー", "happy", "幸せ",
            "しあわせ", "最高", "さいこう", "やった", "わーい", "素晴らしい", "ありがとう",
            "感謝", "面白い", "おもしろい", "ワクワク", "わくわく", "大好き", "だいすき",
            "glad", "nice", "good",
        ],
        patterns: &[r"♪+", r"〜+$", r"www", r"笑$"],
        context_phrases: &[
            "よかった", "楽しみ", "期待", "頑張", "がんば", "応援", "成功", "達成",
            "おめでとう", "congratulations",
        ],
        weight: 1.3,
    },
    EmotionLexicon {
        emotion: Emotion::Sad,
        keywords: &[
            "悲しい", "かなしい", "寂しい", "さびしい", "さみしい", "泣", "涙", "辛い",
            "つらい", "苦しい", "切ない", "しんどい", "失望", "落ち込", "がっかり",
            "残念", "ざんねん", "孤独", "絶望", "つまらない", "sad", "blue",
        ],
        patterns: &[r"。。。", r"…+$", r"T[T_]T", r";;", r"泣$"],
        context_phrases: &[
            "心配", "しんぱい", "不安", "ふあん", "困った", "こまった", "後継者がいない",
            "技術が消える", "伝統がなくなる",
        ],
        weight: 1.2,
    },
    EmotionLexicon {
        emotion: Emotion::Angry,
        keywords: &[
            "怒", "おこ", "イライラ", "いらいら", "ムカつく", "むかつく", "腹立", "キレ",
            "ふざけ", "最悪", "さいあく", "うざい", "許せない", "不愉快", "不満", "angry",
            "mad", "furious",
        ],
        patterns: &[r"！！+", r"怒$", r"ムカ"],
        context_phrases: &[
            "納得いかない", "理解できない", "腹が立つ", "不公平", "文句", "抗議", "反対",
        ],
        weight: 1.3,
    },
    EmotionLexicon {
        emotion: Emotion::Surprised,
        keywords: &[
            "驚", "おどろ", "びっくり", "ビックリ", "すごい", "スゴイ", "えっ", "まじ",
            "マジ", "信じられない", "本当", "うそ", "嘘", "まさか", "意外", "予想外",
            "衝撃", "ショック", "wow", "amazing",
        ],
        patterns: &[r"[!?！？]+", r"。。+", r"ええ[!?！？]"],
        context_phrases: &[
            "知らなかった", "初めて", "はじめて", "想定外", "驚き", "発見",
        ],
        weight: 1.1,
    },
];

static COMPILED_PATTERNS: Lazy<Vec<Vec<Regex>>> = Lazy::new(|| {
    LEXICONS
        .iter()
        .map(|lex| {
            lex.patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect()
        })
        .collect()
});

/// 短文本阈值（字符数）
const SHORT_TEXT_THRESHOLD: usize = 10;
/// 判定为有情感所需的最低分
const MIN_SCORE: f64 = 1.0;
/// 竞争接近时的置信度衰减
const COMPETING_DAMPENING: f64 = 0.8;

/// 加权分类器
pub struct WeightedClassifier {
    forced: KeywordClassifier,
}

impl WeightedClassifier {
    pub fn new() -> Self {
        Self {
            forced: KeywordClassifier::new(),
        }
    }

    /// 带置信度的分类
    pub fn classify_with_confidence(&self, text: &str, language: Language) -> (Emotion, f64) {
        if text.is_empty() {
            return (Emotion::Neutral, 0.5);
        }

        // 强制类别沿用规则分类器的判定
        let forced = self.forced.classify(text, language);
        if forced.is_forced() {
            return (forced, 1.0);
        }

        let text_lower = text.to_lowercase();
        let mut scores = [0.0f64; 4];

        for (i, lex) in LEXICONS.iter().enumerate() {
            for keyword in lex.keywords {
                if text_lower.contains(&keyword.to_lowercase()) {
                    scores[i] += 2.0 * lex.weight;
                }
            }
            for regex in &COMPILED_PATTERNS[i] {
                if regex.is_match(text) {
                    scores[i] += 1.0 * lex.weight;
                }
            }
            for phrase in lex.context_phrases {
                if text_lower.contains(&phrase.to_lowercase()) {
                    scores[i] += 0.5;
                }
            }
        }

        let mut best = 0usize;
        for i in 1..scores.len() {
            if scores[i] > scores[best] {
                best = i;
            }
        }

        // 短い文は感情が強い傾向
        if text.chars().count() < SHORT_TEXT_THRESHOLD && scores[best] > 0.0 {
            scores[best] *= 1.2;
        }

        if scores[best] < MIN_SCORE {
            return (Emotion::Neutral, 0.5);
        }

        let mut confidence = (scores[best] / 10.0).min(1.0);

        // 次点との差が小さい場合は信頼度を下げる
        let mut second = 0.0f64;
        for (i, score) in scores.iter().enumerate() {
            if i != best && *score > second {
                second = *score;
            }
        }
        if scores[best] - second < 1.0 {
            confidence *= COMPETING_DAMPENING;
        }

        (LEXICONS[best].emotion, confidence)
    }
}

impl Default for WeightedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionClassifier for WeightedClassifier {
    fn classify(&self, text: &str, language: Language) -> Emotion {
        self.classify_with_confidence(text, language).0
    }
}
