//! Generation Ports - 远程生成服务抽象
//!
//! 定义故事生成与语音合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::story::{ImageBatch, Prompt};

/// 语音响应中缺少音频的具体原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoAudioReason {
    /// 响应中没有任何候选结果
    NoCandidates,
    /// 服务只返回了文本
    TextOnly,
    /// 候选结果中没有任何内容片段
    MissingPayload,
    /// inline 音频存在但长度为 0
    EmptyPayload,
    /// inline 音频无法解码
    UndecodablePayload,
}

impl std::fmt::Display for NoAudioReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NoCandidates => "no candidates returned",
            Self::TextOnly => "service returned text instead of audio",
            Self::MissingPayload => "candidate carried no content",
            Self::EmptyPayload => "inline audio payload was empty",
            Self::UndecodablePayload => "inline audio payload could not be decoded",
        };
        f.write_str(text)
    }
}

/// 生成服务错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("No API credential configured")]
    MissingCredential,

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("No audio in response: {0}")]
    NoAudioInResponse(NoAudioReason),
}

impl GenerationError {
    /// 调用方重试是否有意义
    ///
    /// 传输失败与服务端错误可能是暂时的；凭据问题重试无效。
    /// 无音频的响应通常是生成结果本身的随机性，允许重试。
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TransportFailure(_) | Self::ServiceError(_) => true,
            Self::NoAudioInResponse(reason) => *reason != NoAudioReason::UndecodablePayload,
            Self::MissingCredential | Self::AuthFailure(_) => false,
        }
    }
}

/// 故事生成请求
#[derive(Debug, Clone)]
pub struct NarrativeRequest {
    /// 按故事顺序排列的图片
    pub images: ImageBatch,
    /// 指令文本
    pub prompt: Prompt,
}

/// 语音合成请求
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// 要朗读的文本
    pub text: String,
    /// 预置音色名称
    pub voice: String,
}

/// 语音合成结果：原始 PCM（单声道 / 16 位 / 24000 Hz）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub pcm: Vec<u8>,
    /// 服务声明的 MIME 类型，例如 `audio/L16;codec=pcm;rate=24000`
    pub mime_type: Option<String>,
}

impl SpeechAudio {
    /// 从 MIME 参数中读取服务声明的采样率
    pub fn declared_sample_rate(&self) -> Option<u32> {
        self.mime_type.as_deref()?.split(';').find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("rate") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
    }
}

/// Narrative Generator Port
///
/// 图片 + 提示词 -> 故事文本。返回文本原样透传，可能为空。
#[async_trait]
pub trait NarrativeGeneratorPort: Send + Sync {
    async fn generate_narrative(&self, request: NarrativeRequest) -> Result<String, GenerationError>;
}

/// Speech Synthesizer Port
///
/// 文本 -> 原始 PCM。响应中没有音频时返回 `NoAudioInResponse`。
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    async fn synthesize_speech(&self, request: SpeechRequest) -> Result<SpeechAudio, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_sample_rate() {
        let audio = SpeechAudio {
            pcm: vec![],
            mime_type: Some("audio/L16;codec=pcm;rate=24000".to_string()),
        };
        assert_eq!(audio.declared_sample_rate(), Some(24_000));

        let audio = SpeechAudio {
            pcm: vec![],
            mime_type: Some("audio/pcm".to_string()),
        };
        assert_eq!(audio.declared_sample_rate(), None);
    }

    #[test]
    fn test_retryable_categories() {
        assert!(GenerationError::TransportFailure("reset".into()).is_retryable());
        assert!(!GenerationError::AuthFailure("bad key".into()).is_retryable());
        assert!(!GenerationError::MissingCredential.is_retryable());
        assert!(GenerationError::NoAudioInResponse(NoAudioReason::TextOnly).is_retryable());
    }

    #[test]
    fn test_no_audio_is_not_transport() {
        let err = GenerationError::NoAudioInResponse(NoAudioReason::NoCandidates);
        assert!(!matches!(err, GenerationError::TransportFailure(_)));
        assert_eq!(err.to_string(), "No audio in response: no candidates returned");
    }
}
