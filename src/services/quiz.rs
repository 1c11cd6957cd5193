//! 答题奖励流程
//!
//! 理解度达到最高后可挑战固定 3 题的知识问答。判分在客户端完成，
//! 服务端跟踪进度、生成逐题反馈与最终结果；全对时把访客提升到
//! 最高关系等级。辞退或中途退出会清空进度并礼貌回应。

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

use crate::models::emotion::Emotion;
use crate::models::language::Language;
use crate::services::visitor_store::VisitorStore;

/// 题目总数
pub const QUIZ_LENGTH: usize = 3;

/// 单道题目
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: &'static str,
    pub options: [&'static str; 3],
    pub correct: usize,
    pub explanation: &'static str,
}

static QUIZ_JA: [QuizQuestion; QUIZ_LENGTH] = [
    QuizQuestion {
        question: "京友禅を確立したとされる人物は誰でしょう？",
        options: ["A) 宮崎友禅斎", "B) 野々村仁清", "C) 本阿弥光悦"],
        correct: 0,
        explanation: "江戸時代の元禄期に、扇絵師だった宮崎友禅斎が確立した染色技法です。彼の名前が「友禅染」の由来となっています！",
    },
    QuizQuestion {
        question: "京友禅の最大の特徴である技法は何でしょう？",
        options: [
            "A) 型紙を使った捺染",
            "B) 糸目糊による手描き染色",
            "C) 絞り染め",
        ],
        correct: 1,
        explanation: "細い筒から糊を絞り出して輪郭線を描き、色が混ざらないようにする「糸目糊」が京友禅の代表的な技法です。繊細で優美な表現が可能になります✨",
    },
    QuizQuestion {
        question: "京友禅の色彩や図柄の特徴として正しいものはどれ？",
        options: [
            "A) 原色を多用した大胆な柄",
            "B) 藍色一色のシンプルな柄",
            "C) 優美で雅な多色使いの柄",
        ],
        correct: 2,
        explanation: "京友禅は、京都の雅な文化を反映した繊細で優美な色彩と、四季の草花や御所車などの伝統的な図柄が特徴です。多彩な色を使った華やかさが魅力です🌸",
    },
];

static QUIZ_EN: [QuizQuestion; QUIZ_LENGTH] = [
    QuizQuestion {
        question: "Who is credited with establishing Kyo-Yuzen?",
        options: [
            "A) Miyazaki Yuzensai",
            "B) Nonomura Ninsei",
            "C) Hon'ami Koetsu",
        ],
        correct: 0,
        explanation: "It was established by Miyazaki Yuzensai, a fan painter during the Genroku period of the Edo era. His name became the origin of \"Yuzen-zome\"!",
    },
    QuizQuestion {
        question: "What is the main technique characteristic of Kyo-Yuzen?",
        options: [
            "A) Stencil dyeing",
            "B) Hand-painted dyeing with paste resist",
            "C) Tie-dyeing",
        ],
        correct: 1,
        explanation: "The \"itome-nori\" (paste resist) technique, where paste is squeezed from a thin tube to draw outlines preventing color mixing, is the representative technique of Kyo-Yuzen. It enables delicate and elegant expressions✨",
    },
    QuizQuestion {
        question: "Which correctly describes the color and pattern characteristics of Kyo-Yuzen?",
        options: [
            "A) Bold patterns with primary colors",
            "B) Simple patterns in indigo only",
            "C) Elegant multi-colored patterns",
        ],
        correct: 2,
        explanation: "Kyo-Yuzen features delicate and elegant colors reflecting Kyoto's refined culture, and traditional patterns like seasonal flowers and imperial carriages. The splendor of diverse colors is its charm🌸",
    },
];

/// 题库
pub fn questions_for(language: Language) -> &'static [QuizQuestion; QUIZ_LENGTH] {
    match language {
        Language::Ja => &QUIZ_JA,
        Language::En => &QUIZ_EN,
    }
}

/// 会话内的答题进度
#[derive(Debug, Clone, Default)]
struct QuizProgress {
    current_question: usize,
    correct_answers: usize,
}

/// 逐题反馈
#[derive(Debug, Clone)]
pub struct AnswerFeedback {
    pub message: String,
    pub explanation: &'static str,
    pub correct_option: &'static str,
    pub emotion: Emotion,
    pub has_next_question: bool,
    pub next_question_index: Option<usize>,
    pub total_correct: usize,
}

/// 最终结果
#[derive(Debug, Clone)]
pub struct FinalResult {
    pub message: String,
    pub emotion: Emotion,
    pub all_correct: bool,
}

/// 答题服务
pub struct QuizService {
    progress: DashMap<String, QuizProgress>,
    visitors: Arc<VisitorStore>,
}

impl QuizService {
    pub fn new(visitors: Arc<VisitorStore>) -> Self {
        Self {
            progress: DashMap::new(),
            visitors,
        }
    }

    /// 挑战邀请文案
    pub fn proposal_message(&self, language: Language) -> &'static str {
        match language {
            Language::Ja => "理解度レベルがMAXになりました！クイズに挑戦して全問正解したら素敵なプレゼントがもらえるよ！クイズに挑戦しますか？",
            Language::En => "Your understanding level is MAX! Challenge the quiz and get a special present if you answer all correctly! Will you try?",
        }
    }

    /// 开始答题，返回第一题
    pub fn start(&self, session_id: &str, language: Language) -> &'static QuizQuestion {
        self.progress
            .insert(session_id.to_string(), QuizProgress::default());
        &questions_for(language)[0]
    }

    /// 取指定题目，越界返回 None
    pub fn question(&self, language: Language, index: usize) -> Option<&'static QuizQuestion> {
        questions_for(language).get(index)
    }

    /// 记录一次客户端判分的回答并生成反馈
    pub fn answer(
        &self,
        session_id: &str,
        language: Language,
        question_index: usize,
        is_correct: bool,
    ) -> Option<AnswerFeedback> {
        let question = self.question(language, question_index)?;

        let total_correct = {
            let mut progress = self
                .progress
                .entry(session_id.to_string())
                .or_default();
            progress.current_question = question_index + 1;
            if is_correct {
                progress.correct_answers += 1;
            }
            progress.correct_answers
        };

        let (message, emotion) = if is_correct {
            match language {
                Language::Ja => ("すごい！正解です！", Emotion::Surprised),
                Language::En => ("Amazing! Correct!", Emotion::Surprised),
            }
        } else {
            match language {
                Language::Ja => ("あぁ、惜しいです！", Emotion::Sad),
                Language::En => ("Oh, so close!", Emotion::Sad),
            }
        };

        let has_next = question_index + 1 < QUIZ_LENGTH;
        Some(AnswerFeedback {
            message: message.to_string(),
            explanation: question.explanation,
            correct_option: question.options[question.correct],
            emotion,
            has_next_question: has_next,
            next_question_index: has_next.then_some(question_index + 1),
            total_correct,
        })
    }

    /// 结束答题并给出最终结果。全对时把访客升至最高等级。
    pub fn final_result(
        &self,
        session_id: &str,
        visitor_id: Option<&str>,
        language: Language,
        total_correct: usize,
    ) -> FinalResult {
        self.progress.remove(session_id);

        let all_correct = total_correct == QUIZ_LENGTH;
        if all_correct {
            if let Some(visitor_id) = visitor_id {
                self.visitors.complete_quiz(visitor_id);
            }
        }

        let (message, emotion) = if all_correct {
            let message = match language {
                Language::Ja => "コングラチュレーション！おめでとうございます！全問正解したあなたに特別なプレゼントです！".to_string(),
                Language::En => "Congratulations! Perfect score! Here's a special present for you!".to_string(),
            };
            (message, Emotion::Happy)
        } else {
            let message = match language {
                Language::Ja => format!("{}/3問正解でした。再度挑戦しますか？", total_correct),
                Language::En => format!("You got {}/3 correct. Try again?", total_correct),
            };
            (message, Emotion::Neutral)
        };

        FinalResult {
            message,
            emotion,
            all_correct,
        }
    }

    /// 辞退挑战
    pub fn decline(&self, session_id: &str, language: Language) -> &'static str {
        self.progress.remove(session_id);
        match language {
            Language::Ja => "わかった！また挑戦したくなったら声をかけてね！",
            Language::En => "Okay! Let me know when you want to try!",
        }
    }

    /// 中途退出
    pub fn quit(&self, session_id: &str, language: Language) -> &'static str {
        self.progress.remove(session_id);
        match language {
            Language::Ja => "わかった！準備ができたらまた挑戦してね！",
            Language::En => "Okay! Come back when you're ready!",
        }
    }

    /// 会话断开时清理进度
    pub fn clear(&self, session_id: &str) {
        self.progress.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::relationship::MASTER_LEVEL;

    fn service() -> QuizService {
        QuizService::new(Arc::new(VisitorStore::new()))
    }

    #[test]
    fn test_start_returns_first_question() {
        let quiz = service();
        let q = quiz.start("s1", Language::Ja);
        assert_eq!(q.question, QUIZ_JA[0].question);
    }

    #[test]
    fn test_answer_feedback_progression() {
        let quiz = service();
        quiz.start("s1", Language::En);

        let first = quiz.answer("s1", Language::En, 0, true).unwrap();
        assert_eq!(first.emotion, Emotion::Surprised);
        assert!(first.has_next_question);
        assert_eq!(first.next_question_index, Some(1));

        let second = quiz.answer("s1", Language::En, 1, false).unwrap();
        assert_eq!(second.emotion, Emotion::Sad);
        assert_eq!(second.total_correct, 1);

        let last = quiz.answer("s1", Language::En, 2, true).unwrap();
        assert!(!last.has_next_question);
        assert_eq!(last.next_question_index, None);
        assert_eq!(last.total_correct, 2);
    }

    #[test]
    fn test_out_of_range_question_index() {
        let quiz = service();
        assert!(quiz.answer("s1", Language::Ja, QUIZ_LENGTH, true).is_none());
    }

    #[test]
    fn test_perfect_score_promotes_visitor() {
        let visitors = Arc::new(VisitorStore::new());
        let quiz = QuizService::new(visitors.clone());
        quiz.start("s1", Language::Ja);

        let result = quiz.final_result("s1", Some("v1"), Language::Ja, QUIZ_LENGTH);
        assert!(result.all_correct);
        assert_eq!(result.emotion, Emotion::Happy);
        assert_eq!(visitors.get("v1").unwrap().relationship_level, MASTER_LEVEL);
    }

    #[test]
    fn test_partial_score_keeps_level() {
        let visitors = Arc::new(VisitorStore::new());
        let quiz = QuizService::new(visitors.clone());
        quiz.start("s1", Language::En);

        let result = quiz.final_result("s1", Some("v1"), Language::En, 2);
        assert!(!result.all_correct);
        assert_eq!(result.message, "You got 2/3 correct. Try again?");
        assert!(visitors.get("v1").is_none());
    }

    #[test]
    fn test_decline_and_quit_clear_progress() {
        let quiz = service();
        quiz.start("s1", Language::Ja);
        quiz.decline("s1", Language::Ja);
        // 進捗が消えていれば再スタートで 0 から
        quiz.start("s1", Language::Ja);
        let feedback = quiz.answer("s1", Language::Ja, 0, true).unwrap();
        assert_eq!(feedback.total_correct, 1);
    }
}
