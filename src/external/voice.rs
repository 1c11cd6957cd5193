//! 语音合成端
//!
//! 面向 SSML REST 接口的薄客户端。按显示情感映射语音风格与
//! 抑扬强度，返回 base64 编码的音频。合成失败不致命：
//! 返回 None，对话回路继续走纯文本。

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::VoiceConfig;
use crate::models::emotion::Emotion;
use crate::models::language::Language;

/// 情感对应的语音风格
fn style_for(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Happy | Emotion::Start => "cheerful",
        Emotion::Sad => "sad",
        Emotion::Angry => "angry",
        Emotion::Surprised => "excited",
        Emotion::DangerQuestion => "serious",
        Emotion::Neutral | Emotion::Explaining => "general",
    }
}

/// 情感对应的抑扬强度
fn style_degree_for(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Happy | Emotion::Surprised | Emotion::Start => "2",
        Emotion::Sad | Emotion::Angry => "1.8",
        _ => "1.5",
    }
}

fn xml_lang(language: Language) -> &'static str {
    match language {
        Language::Ja => "ja-JP",
        Language::En => "en-US",
    }
}

/// 转义进入 SSML 文本节点的内容
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// 语音合成端 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceSynthesizer: Send + Sync {
    /// 合成语音并返回 base64。不可用或失败时返回 None。
    async fn synthesize(
        &self,
        text: &str,
        emotion: Emotion,
        language: Language,
    ) -> Option<String>;
}

/// SSML REST 语音合成端
pub struct SsmlVoiceSynthesizer {
    client: Client,
    config: VoiceConfig,
}

impl SsmlVoiceSynthesizer {
    pub fn new(config: VoiceConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn build_ssml(&self, text: &str, emotion: Emotion, language: Language) -> String {
        format!(
            concat!(
                "<speak version=\"1.0\" xmlns=\"http://www.w3.org/2001/10/synthesis\" ",
                "xmlns:mstts=\"https://www.w3.org/2001/mstts\" xml:lang=\"{lang}\">",
                "<voice name=\"{voice}\">",
                "<mstts:express-as style=\"{style}\" styledegree=\"{degree}\">",
                "<prosody pitch=\"+5%\">{text}</prosody>",
                "</mstts:express-as></voice></speak>"
            ),
            lang = xml_lang(language),
            voice = self.config.voice_name,
            style = style_for(emotion),
            degree = style_degree_for(emotion),
            text = escape_xml(text),
        )
    }

    async fn request(&self, ssml: String) -> crate::error::Result<Vec<u8>> {
        let url = format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.config.region
        );
        let response = self
            .client
            .post(url)
            .header("Ocp-Apim-Subscription-Key", &self.config.api_key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", "riff-24khz-16bit-mono-pcm")
            .body(ssml)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(crate::error::AppError::Voice(format!(
                "合成端返回错误状态: {}",
                response.status()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl VoiceSynthesizer for SsmlVoiceSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        emotion: Emotion,
        language: Language,
    ) -> Option<String> {
        if !self.config.enabled || text.is_empty() {
            return None;
        }

        let ssml = self.build_ssml(text, emotion, language);
        match self.request(ssml).await {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), emotion = %emotion, "voice synthesized");
                Some(BASE64.encode(bytes))
            }
            Err(e) => {
                warn!(error = %e, "voice synthesis failed, continuing without audio");
                None
            }
        }
    }
}

/// 创建语音合成端
pub fn create_voice_synthesizer(config: VoiceConfig) -> Box<dyn VoiceSynthesizer> {
    Box::new(SsmlVoiceSynthesizer::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Emotion::Happy, "cheerful", "2")]
    #[case(Emotion::Start, "cheerful", "2")]
    #[case(Emotion::Sad, "sad", "1.8")]
    #[case(Emotion::Angry, "angry", "1.8")]
    #[case(Emotion::Surprised, "excited", "2")]
    #[case(Emotion::DangerQuestion, "serious", "1.5")]
    #[case(Emotion::Explaining, "general", "1.5")]
    #[case(Emotion::Neutral, "general", "1.5")]
    fn test_style_mapping(
        #[case] emotion: Emotion,
        #[case] style: &str,
        #[case] degree: &str,
    ) {
        assert_eq!(style_for(emotion), style);
        assert_eq!(style_degree_for(emotion), degree);
    }

    #[test]
    fn test_ssml_contains_style_and_text() {
        let synth = SsmlVoiceSynthesizer::new(VoiceConfig::default());
        let ssml = synth.build_ssml("こんにちは", Emotion::Happy, Language::Ja);
        assert!(ssml.contains("style=\"cheerful\""));
        assert!(ssml.contains("こんにちは"));
        assert!(ssml.contains("xml:lang=\"ja-JP\""));
    }

    #[test]
    fn test_ssml_escapes_markup() {
        let synth = SsmlVoiceSynthesizer::new(VoiceConfig::default());
        let ssml = synth.build_ssml("a < b & c", Emotion::Neutral, Language::En);
        assert!(ssml.contains("a &lt; b &amp; c"));
    }

    #[tokio::test]
    async fn test_disabled_synthesizer_returns_none() {
        let synth = SsmlVoiceSynthesizer::new(VoiceConfig::default());
        assert!(synth
            .synthesize("hello", Emotion::Neutral, Language::En)
            .await
            .is_none());
    }
}
