//! Fake Generation Client - 用于测试与离线运行的生成客户端
//!
//! 不调用远程服务：故事返回固定文本，朗读返回指定时长的静音 PCM

use async_trait::async_trait;

use crate::application::ports::{
    GenerationError, NarrativeGeneratorPort, NarrativeRequest, SpeechAudio, SpeechRequest,
    SpeechSynthesizerPort,
};
use crate::domain::audio::PcmFormat;

/// Fake Generation Client 配置
#[derive(Debug, Clone)]
pub struct FakeGenerationConfig {
    /// 固定返回的故事文本
    pub story: String,
    /// 静音音频时长（毫秒）
    pub speech_duration_ms: u64,
}

impl Default for FakeGenerationConfig {
    fn default() -> Self {
        Self {
            story: "Once upon a time, a small lantern learned to glow on its own.".to_string(),
            speech_duration_ms: 1000,
        }
    }
}

/// Fake Generation Client
pub struct FakeGenerationClient {
    config: FakeGenerationConfig,
}

impl FakeGenerationClient {
    pub fn new(config: FakeGenerationConfig) -> Self {
        tracing::info!(
            story_len = config.story.len(),
            speech_duration_ms = config.speech_duration_ms,
            "FakeGenerationClient initialized"
        );
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeGenerationConfig::default())
    }
}

#[async_trait]
impl NarrativeGeneratorPort for FakeGenerationClient {
    async fn generate_narrative(&self, request: NarrativeRequest) -> Result<String, GenerationError> {
        tracing::debug!(
            image_count = request.images.len(),
            "FakeGenerationClient: returning fixed story"
        );
        Ok(self.config.story.clone())
    }
}

#[async_trait]
impl SpeechSynthesizerPort for FakeGenerationClient {
    async fn synthesize_speech(&self, request: SpeechRequest) -> Result<SpeechAudio, GenerationError> {
        let format = PcmFormat::SPEECH;
        let len = format.bytes_for_duration_ms(self.config.speech_duration_ms);

        tracing::debug!(
            text_len = request.text.len(),
            voice = %request.voice,
            pcm_bytes = len,
            "FakeGenerationClient: returning silence"
        );

        Ok(SpeechAudio {
            pcm: vec![0u8; len],
            mime_type: Some(format!(
                "audio/L16;codec=pcm;rate={}",
                format.sample_rate_hz
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::fixtures::png;
    use crate::domain::story::{build_prompt, Genre, ImageBatch};

    #[tokio::test]
    async fn test_fake_story() {
        let client = FakeGenerationClient::new(FakeGenerationConfig {
            story: "A fixed tale.".to_string(),
            speech_duration_ms: 0,
        });
        let story = client
            .generate_narrative(NarrativeRequest {
                images: ImageBatch::new(vec![png(1)]).unwrap(),
                prompt: build_prompt(Genre::Fantasy),
            })
            .await
            .unwrap();
        assert_eq!(story, "A fixed tale.");
    }

    #[tokio::test]
    async fn test_fake_speech_is_one_second_of_silence() {
        let client = FakeGenerationClient::with_defaults();
        let audio = client
            .synthesize_speech(SpeechRequest {
                text: "Hello world".to_string(),
                voice: "Kore".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(audio.pcm.len(), 48_000);
        assert!(audio.pcm.iter().all(|b| *b == 0));
        assert_eq!(audio.declared_sample_rate(), Some(24_000));
    }
}
