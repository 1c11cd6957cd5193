//! 语言标签

use serde::{Deserialize, Serialize};
use std::fmt;

/// 支持的会话语言
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// 日语
    Ja,
    /// 英语
    En,
}

impl Language {
    /// 从语言标签解析，未知标签回退为日语
    pub fn from_tag(tag: &str) -> Language {
        match tag.trim().to_lowercase().as_str() {
            "en" => Language::En,
            _ => Language::Ja,
        }
    }

    /// 语言标签
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Ja
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Language::from_tag("en"), Language::En);
        assert_eq!(Language::from_tag("EN "), Language::En);
        assert_eq!(Language::from_tag("ja"), Language::Ja);
        assert_eq!(Language::from_tag("fr"), Language::Ja);
    }
}
