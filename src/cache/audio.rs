//! 语音缓存
//!
//! 合成后的 base64 语音按 (文本, 语言, 情感) 缓存，容量固定 100。
//! 除值表外单独维护一个键队列，插满时先淘汰最早入队的键。

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};

use crate::models::emotion::Emotion;
use crate::models::language::Language;

/// 缓存容量上限
pub const AUDIO_CACHE_CAPACITY: usize = 100;

fn cache_key(text: &str, language: Language, emotion: Emotion) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(b"_");
    hasher.update(language.tag().as_bytes());
    hasher.update(b"_");
    hasher.update(emotion.label().as_bytes());
    hex::encode(hasher.finalize())
}

struct Inner {
    entries: HashMap<String, String>,
    order: VecDeque<String>,
}

/// 语音缓存
pub struct AudioCache {
    inner: Mutex<Inner>,
}

impl AudioCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::with_capacity(AUDIO_CACHE_CAPACITY),
            }),
        }
    }

    pub fn get(&self, text: &str, language: Language, emotion: Emotion) -> Option<String> {
        let key = cache_key(text, language, emotion);
        self.inner.lock().entries.get(&key).cloned()
    }

    /// 写入缓存。新键在容量已满时先淘汰最旧键；
    /// 同键重复写入只更新值，不改变入队顺序。
    pub fn insert(&self, text: &str, language: Language, emotion: Emotion, audio_b64: String) {
        let key = cache_key(text, language, emotion);
        let mut inner = self.inner.lock();

        if inner.entries.contains_key(&key) {
            inner.entries.insert(key, audio_b64);
            return;
        }

        if inner.order.len() >= AUDIO_CACHE_CAPACITY {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(key, audio_b64);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

impl Default for AudioCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_after_insert() {
        let cache = AudioCache::new();
        cache.insert("こんにちは", Language::Ja, Emotion::Happy, "YXVkaW8=".to_string());
        assert_eq!(
            cache.get("こんにちは", Language::Ja, Emotion::Happy),
            Some("YXVkaW8=".to_string())
        );
        // 情感不同视为不同键
        assert!(cache.get("こんにちは", Language::Ja, Emotion::Sad).is_none());
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let cache = AudioCache::new();
        for i in 0..AUDIO_CACHE_CAPACITY {
            cache.insert(&format!("text-{}", i), Language::Ja, Emotion::Neutral, format!("a{}", i));
        }
        assert_eq!(cache.len(), AUDIO_CACHE_CAPACITY);
        assert!(cache.get("text-0", Language::Ja, Emotion::Neutral).is_some());

        // 第 101 条恰好挤掉最早的 text-0
        cache.insert("text-100", Language::Ja, Emotion::Neutral, "a100".to_string());
        assert_eq!(cache.len(), AUDIO_CACHE_CAPACITY);
        assert!(cache.get("text-0", Language::Ja, Emotion::Neutral).is_none());
        assert!(cache.get("text-1", Language::Ja, Emotion::Neutral).is_some());
        assert!(cache.get("text-100", Language::Ja, Emotion::Neutral).is_some());
    }

    #[test]
    fn test_duplicate_insert_keeps_order() {
        let cache = AudioCache::new();
        for i in 0..AUDIO_CACHE_CAPACITY {
            cache.insert(&format!("text-{}", i), Language::Ja, Emotion::Neutral, "a".to_string());
        }
        // text-0 を上書きしても順序は変わらない
        cache.insert("text-0", Language::Ja, Emotion::Neutral, "b".to_string());
        cache.insert("new", Language::Ja, Emotion::Neutral, "c".to_string());
        assert!(cache.get("text-0", Language::Ja, Emotion::Neutral).is_none());
    }
}
