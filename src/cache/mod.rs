//! 进程内缓存
//!
//! - `response`：应答缓存，键为归一化问题 + 语言，24 小时惰性过期
//! - `audio`：语音缓存，容量 100，先进先出淘汰

pub mod audio;
pub mod response;

pub use audio::AudioCache;
pub use response::{normalize_question, CachedResponse, ResponseCache};
