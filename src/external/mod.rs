//! 外部协作者
//!
//! - `static_qa`：内置问答表，先于生成端查询
//! - `responder`：对话生成端的 HTTP 客户端
//! - `voice`：语音合成端的 HTTP 客户端

pub mod responder;
pub mod static_qa;
pub mod voice;

pub use responder::{apology_for, create_responder, HttpResponder, Responder};
pub use static_qa::StaticQa;
pub use voice::{create_voice_synthesizer, SsmlVoiceSynthesizer, VoiceSynthesizer};
