//! Gemini `generateContent` 请求/响应结构
//!
//! 只覆盖本服务用到的字段，未知字段在反序列化时忽略

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::application::ports::{NoAudioReason, SpeechAudio};
use crate::domain::story::ImageBatch;

// ============================================================================
// 请求
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// 图片按顺序作为 inline 片段，提示词放在最后
    pub fn narrative(images: &ImageBatch, prompt: &str) -> Self {
        let mut parts: Vec<Part> = images
            .iter()
            .map(|image| Part::inline(image.format().mime_type(), image.bytes()))
            .collect();
        parts.push(Part::text(prompt));

        Self {
            contents: vec![Content::user(parts)],
            generation_config: None,
        }
    }

    /// 单一预置音色，仅要求音频输出
    pub fn speech(text: &str, voice: &str) -> Self {
        Self {
            contents: vec![Content::user(vec![Part::text(text)])],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.to_string(),
                        },
                    },
                },
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
    pub speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

// ============================================================================
// 共用
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// 思考过程片段，不属于最终文本
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    fn inline(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: STANDARD.encode(bytes),
            }),
            ..Default::default()
        }
    }
}

/// Base64 inline 数据
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

// ============================================================================
// 响应
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> Option<&[Part]> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
    }

    /// 第一个候选结果中所有非思考文本片段的拼接；没有时返回空串
    pub fn text(&self) -> String {
        self.first_parts()
            .unwrap_or_default()
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
    }

    /// 取第一个 inline 音频片段并解码
    pub fn first_audio(&self) -> Result<SpeechAudio, NoAudioReason> {
        if self.candidates.is_empty() {
            return Err(NoAudioReason::NoCandidates);
        }
        let parts = match self.first_parts() {
            Some(parts) if !parts.is_empty() => parts,
            _ => return Err(NoAudioReason::MissingPayload),
        };

        let Some(inline) = parts.iter().find_map(|p| p.inline_data.as_ref()) else {
            return Err(if parts.iter().any(|p| p.text.is_some()) {
                NoAudioReason::TextOnly
            } else {
                NoAudioReason::MissingPayload
            });
        };

        if inline.data.is_empty() {
            return Err(NoAudioReason::EmptyPayload);
        }
        let pcm = STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|_| NoAudioReason::UndecodablePayload)?;
        if pcm.is_empty() {
            return Err(NoAudioReason::EmptyPayload);
        }

        Ok(SpeechAudio {
            pcm,
            mime_type: (!inline.mime_type.is_empty()).then(|| inline.mime_type.clone()),
        })
    }
}

/// 错误响应 `{"error": {"code", "message", "status"}}`
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

impl ErrorBody {
    /// `details[*].reason`，例如 `API_KEY_INVALID`
    pub fn has_reason(&self, reason: &str) -> bool {
        self.details
            .iter()
            .any(|d| d.reason.as_deref() == Some(reason))
    }
}

/// `google.rpc.ErrorInfo` 等详情条目，只取 reason
#[derive(Debug, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::fixtures::{jpeg, png};
    use serde_json::json;

    fn response(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_narrative_request_layout() {
        let images = ImageBatch::new(vec![png(1), jpeg(2)]).unwrap();
        let body = serde_json::to_value(GenerateContentRequest::narrative(&images, "write")).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts.as_array().unwrap().len(), 3);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], STANDARD.encode(png(1)));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[2]["text"], "write");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_speech_request_layout() {
        let body = serde_json::to_value(GenerateContentRequest::speech("Hello", "Kore")).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["AUDIO"]));
        assert_eq!(
            body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Kore"
        );
    }

    #[test]
    fn test_text_skips_thoughts() {
        let r = response(json!({
            "candidates": [{"content": {"parts": [
                {"text": "thinking...", "thought": true},
                {"text": "Once "},
                {"text": "upon a time"}
            ]}}]
        }));
        assert_eq!(r.text(), "Once upon a time");
    }

    #[test]
    fn test_text_empty_when_blocked() {
        let r = response(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert_eq!(r.text(), "");
        assert_eq!(r.block_reason(), Some("SAFETY"));
    }

    #[test]
    fn test_first_audio_decodes_payload() {
        let r = response(json!({
            "candidates": [{"content": {"parts": [{"inlineData": {
                "mimeType": "audio/L16;codec=pcm;rate=24000",
                "data": STANDARD.encode([1u8, 0, 2, 0])
            }}]}}]
        }));
        let audio = r.first_audio().unwrap();
        assert_eq!(audio.pcm, vec![1, 0, 2, 0]);
        assert_eq!(audio.declared_sample_rate(), Some(24_000));
    }

    #[test]
    fn test_first_audio_reasons() {
        assert_eq!(
            response(json!({})).first_audio(),
            Err(NoAudioReason::NoCandidates)
        );
        assert_eq!(
            response(json!({"candidates": [{"finishReason": "OTHER"}]})).first_audio(),
            Err(NoAudioReason::MissingPayload)
        );
        assert_eq!(
            response(json!({"candidates": [{"content": {"parts": [{"text": "hi"}]}}]}))
                .first_audio(),
            Err(NoAudioReason::TextOnly)
        );
        assert_eq!(
            response(json!({"candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "audio/L16", "data": ""}}
            ]}}]}))
            .first_audio(),
            Err(NoAudioReason::EmptyPayload)
        );
        assert_eq!(
            response(json!({"candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "audio/L16", "data": "%%%"}}
            ]}}]}))
            .first_audio(),
            Err(NoAudioReason::UndecodablePayload)
        );
    }
}
