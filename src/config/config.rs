//! 应用配置
//!
//! 所有配置节都提供可直接启动的默认值，生产环境通过
//! `kokoro.toml` 或 `KOKORO_` 前缀的环境变量覆盖。

use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应答生成端配置
    pub responder: ResponderConfig,
    /// 语音合成端配置
    pub voice: VoiceConfig,
    /// 情感系统配置
    pub affect: AffectConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别过滤（tracing EnvFilter 语法）
    pub level: String,
    /// 是否输出 JSON 格式
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,kokoro=debug".to_string(),
            json: false,
        }
    }
}

/// 应答生成端配置（OpenAI 兼容的 chat 接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// 接口地址
    pub base_url: String,
    /// API 密钥
    pub api_key: String,
    /// 模型名
    pub model: String,
    /// 采样温度
    pub temperature: f64,
    /// 最大生成 token 数
    pub max_tokens: u32,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 300,
            timeout_secs: 30,
        }
    }
}

/// 语音合成端配置（SSML REST 接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// 是否启用语音合成
    pub enabled: bool,
    /// 服务区域
    pub region: String,
    /// API 密钥
    pub api_key: String,
    /// 音色名
    pub voice_name: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            region: "japaneast".to_string(),
            api_key: String::new(),
            voice_name: "ja-JP-NanamiNeural".to_string(),
            timeout_secs: 30,
        }
    }
}

/// 情感系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AffectConfig {
    /// 分类器策略："keyword" 或 "weighted"
    pub classifier: String,
}

impl Default for AffectConfig {
    fn default() -> Self {
        Self {
            classifier: "keyword".to_string(),
        }
    }
}
