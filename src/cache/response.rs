//! 应答缓存
//!
//! 同一个问题（归一化后）在 24 小时内复用上次的应答，避免重复
//! 调用生成端。过期采用惰性检查：读取时判断时间戳，过期条目
//! 保留在表中直到被同键写入覆盖。

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::models::emotion::Emotion;
use crate::models::language::Language;
use crate::models::mental_state::MentalState;

/// 缓存有效期
const TTL_HOURS: i64 = 24;

/// 缓存的应答
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub message: String,
    pub emotion: Emotion,
    pub mental_state: MentalState,
}

struct CacheEntry {
    response: CachedResponse,
    created_at: DateTime<Utc>,
}

/// 归一化问题文本：小写、去除 `? ! ？ ！ 。 、` 与首尾空白
pub fn normalize_question(question: &str) -> String {
    question
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '?' | '？' | '!' | '！' | '。' | '、'))
        .collect::<String>()
        .trim()
        .to_string()
}

fn cache_key(question: &str, language: Language) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_question(question).as_bytes());
    hasher.update(b"_");
    hasher.update(language.tag().as_bytes());
    hex::encode(hasher.finalize())
}

/// 应答缓存
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 读取缓存，过期条目返回 None
    pub fn get(&self, question: &str, language: Language) -> Option<CachedResponse> {
        self.get_at(question, language, Utc::now())
    }

    /// 以指定时刻做过期判断的读取（测试用时钟注入点）
    pub fn get_at(
        &self,
        question: &str,
        language: Language,
        now: DateTime<Utc>,
    ) -> Option<CachedResponse> {
        let key = cache_key(question, language);
        let entries = self.entries.read();
        let entry = entries.get(&key)?;
        if now - entry.created_at < Duration::hours(TTL_HOURS) {
            Some(entry.response.clone())
        } else {
            None
        }
    }

    /// 写入缓存，同键覆盖并刷新时间戳
    pub fn insert(&self, question: &str, language: Language, response: CachedResponse) {
        self.insert_at(question, language, response, Utc::now());
    }

    /// 以指定时刻写入（测试用时钟注入点）
    pub fn insert_at(
        &self,
        question: &str,
        language: Language,
        response: CachedResponse,
        now: DateTime<Utc>,
    ) {
        let key = cache_key(question, language);
        self.entries.write().insert(
            key,
            CacheEntry {
                response,
                created_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CachedResponse {
        CachedResponse {
            message: "京友禅は京都の伝統染色です".to_string(),
            emotion: Emotion::Explaining,
            mental_state: MentalState::default(),
        }
    }

    #[test]
    fn test_normalize_question() {
        assert_eq!(normalize_question("京友禅とは？"), "京友禅とは");
        assert_eq!(normalize_question("  What is Yuzen?!  "), "what is yuzen");
        assert_eq!(normalize_question("それは、何。"), "それは何");
    }

    #[test]
    fn test_normalized_variants_share_entry() {
        let cache = ResponseCache::new();
        cache.insert("京友禅とは？", Language::Ja, sample());
        assert!(cache.get("京友禅とは！", Language::Ja).is_some());
        assert!(cache.get("  京友禅とは  ", Language::Ja).is_some());
    }

    #[test]
    fn test_language_separates_keys() {
        let cache = ResponseCache::new();
        cache.insert("hello", Language::Ja, sample());
        assert!(cache.get("hello", Language::En).is_none());
    }

    #[test]
    fn test_ttl_expiry_is_lazy() {
        let cache = ResponseCache::new();
        let t0 = Utc::now();
        cache.insert_at("質問", Language::Ja, sample(), t0);

        let before_expiry = t0 + Duration::hours(23);
        assert!(cache.get_at("質問", Language::Ja, before_expiry).is_some());

        let after_expiry = t0 + Duration::hours(25);
        assert!(cache.get_at("質問", Language::Ja, after_expiry).is_none());
        // 過期条目仍占据表项，直到被覆盖
        assert_eq!(cache.len(), 1);

        cache.insert_at("質問", Language::Ja, sample(), after_expiry);
        assert!(cache.get_at("質問", Language::Ja, after_expiry).is_some());
        assert_eq!(cache.len(), 1);
    }
}
