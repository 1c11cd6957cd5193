//! Kokoro - 虚拟角色情感与进阶引擎
//!
//! 接收用户消息，分析其情感倾向，演化角色的深层心理状态，
//! 通过概率状态机决定角色的下一个表情，并按阶段课程推送追问建议。

pub mod affect;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod external;
pub mod models;
pub mod observability;
pub mod services;
pub mod websocket;
