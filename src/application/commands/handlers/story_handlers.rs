//! Story Command Handlers

use std::sync::Arc;
use std::time::Instant;

use crate::application::commands::{GenerateStory, NarrateStory};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    NarrativeGeneratorPort, NarrativeRequest, SpeechRequest, SpeechSynthesizerPort,
};
use crate::domain::audio::{self, AudioInfo, PcmFormat};
use crate::domain::story::{build_prompt, Genre, ImageBatch, StoryError, MAX_IMAGES};

// ============================================================================
// GenerateStory
// ============================================================================

/// 生成故事响应
#[derive(Debug, Clone)]
pub struct GenerateStoryResponse {
    /// 服务返回的原始文本
    pub story: String,
    pub genre: Genre,
    pub image_count: usize,
}

/// GenerateStory Handler
pub struct GenerateStoryHandler {
    generator: Arc<dyn NarrativeGeneratorPort>,
    max_images: usize,
}

impl GenerateStoryHandler {
    pub fn new(generator: Arc<dyn NarrativeGeneratorPort>, max_images: usize) -> Self {
        Self {
            generator,
            max_images: max_images.min(MAX_IMAGES),
        }
    }

    pub async fn handle(
        &self,
        command: GenerateStory,
    ) -> Result<GenerateStoryResponse, ApplicationError> {
        // 前置条件全部在本地检查，不满足时不发起远程调用
        let genre: Genre = command.genre.parse()?;
        let images = ImageBatch::with_limit(command.images, self.max_images)?;
        let image_count = images.len();

        tracing::debug!(
            genre = %genre,
            image_count,
            image_bytes = images.total_bytes(),
            "Generating story"
        );

        let started = Instant::now();
        let story = self
            .generator
            .generate_narrative(NarrativeRequest {
                images,
                prompt: build_prompt(genre),
            })
            .await?;

        if story.trim().is_empty() {
            tracing::warn!(genre = %genre, image_count, "Generation returned no text");
            return Err(ApplicationError::EmptyResult);
        }

        tracing::info!(
            genre = %genre,
            image_count,
            story_chars = story.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Story generated"
        );

        Ok(GenerateStoryResponse {
            story,
            genre,
            image_count,
        })
    }
}

// ============================================================================
// NarrateStory
// ============================================================================

/// 朗读响应
#[derive(Debug, Clone)]
pub struct NarrateStoryResponse {
    /// WAV 容器字节
    pub wav: Vec<u8>,
    pub info: AudioInfo,
    /// 文本是否因长度上限被截断
    pub truncated: bool,
}

/// NarrateStory Handler
pub struct NarrateStoryHandler {
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    voice: String,
    /// 0 表示不限制
    max_text_chars: usize,
}

impl NarrateStoryHandler {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        voice: impl Into<String>,
        max_text_chars: usize,
    ) -> Self {
        Self {
            synthesizer,
            voice: voice.into(),
            max_text_chars,
        }
    }

    pub async fn handle(
        &self,
        command: NarrateStory,
    ) -> Result<NarrateStoryResponse, ApplicationError> {
        if command.text.trim().is_empty() {
            return Err(StoryError::EmptyText.into());
        }

        let (text, truncated) = truncate_chars(command.text, self.max_text_chars);
        if truncated {
            tracing::warn!(
                max_text_chars = self.max_text_chars,
                "Story text truncated before synthesis"
            );
        }

        tracing::debug!(
            text_chars = text.chars().count(),
            voice = %self.voice,
            "Synthesizing narration"
        );

        let started = Instant::now();
        let speech = self
            .synthesizer
            .synthesize_speech(SpeechRequest {
                text,
                voice: self.voice.clone(),
            })
            .await?;

        if let Some(rate) = speech.declared_sample_rate() {
            if rate != PcmFormat::SPEECH.sample_rate_hz {
                tracing::warn!(
                    declared_rate = rate,
                    expected_rate = PcmFormat::SPEECH.sample_rate_hz,
                    "Speech service declared an unexpected sample rate"
                );
            }
        }

        let wav = audio::encode_speech(&speech.pcm)?;
        let info = audio::probe_info(&wav)
            .map_err(|e| ApplicationError::internal(format!("Encoded WAV failed probing: {}", e)))?;

        tracing::info!(
            pcm_bytes = speech.pcm.len(),
            duration_ms = info.duration_ms,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Narration synthesized"
        );

        Ok(NarrateStoryResponse {
            wav,
            info,
            truncated,
        })
    }
}

/// 按字符数截断（保证落在字符边界上）
fn truncate_chars(text: String, max_chars: usize) -> (String, bool) {
    if max_chars == 0 {
        return (text, false);
    }
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (text[..byte_index].to_string(), true),
        None => (text, false),
    }
}
