//! 情感类型
//!
//! 定义角色可表现的情感类别。`DangerQuestion` 与 `Explaining`
//! 是强制类别：一旦在用户输入中检测到，将绕过概率状态机直接输出。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 情感类别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    /// 中性
    Neutral,
    /// 喜悦
    Happy,
    /// 悲伤
    Sad,
    /// 愤怒
    Angry,
    /// 惊讶
    Surprised,
    /// 不当话题（强制类别）
    #[serde(rename = "dangerquestion")]
    DangerQuestion,
    /// 专注讲解（强制类别）
    Explaining,
    /// 初次见面
    Start,
}

impl Emotion {
    /// 全部情感类别（固定顺序，采样时依赖该顺序）
    pub const ALL: [Emotion; 8] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Surprised,
        Emotion::DangerQuestion,
        Emotion::Explaining,
        Emotion::Start,
    ];

    /// 是否为强制类别（绕过概率转移）
    pub fn is_forced(&self) -> bool {
        matches!(self, Emotion::DangerQuestion | Emotion::Explaining)
    }

    /// 情感标签
    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
            Emotion::DangerQuestion => "dangerquestion",
            Emotion::Explaining => "explaining",
            Emotion::Start => "start",
        }
    }

    /// 从标签解析，未知标签回退为中性
    pub fn from_label(label: &str) -> Emotion {
        match label.trim().to_lowercase().as_str() {
            "neutral" => Emotion::Neutral,
            "happy" => Emotion::Happy,
            "sad" => Emotion::Sad,
            "angry" => Emotion::Angry,
            "surprised" | "surprise" => Emotion::Surprised,
            "dangerquestion" => Emotion::DangerQuestion,
            "explaining" => Emotion::Explaining,
            "start" => Emotion::Start,
            _ => Emotion::Neutral,
        }
    }
}

impl Default for Emotion {
    fn default() -> Self {
        Emotion::Neutral
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
