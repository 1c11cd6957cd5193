//! 配置模块

pub mod config;
pub mod loader;

pub use config::{
    AffectConfig, AppConfig, LoggingConfig, ResponderConfig, ServerConfig, VoiceConfig,
};
pub use loader::ConfigLoader;
