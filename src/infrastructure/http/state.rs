//! Application State
//!
//! 包含 Command Handlers 与朗读临时存储

use std::sync::Arc;

use crate::application::{
    GenerateStoryHandler, NarrateStoryHandler, NarrativeGeneratorPort, SpeechSynthesizerPort,
};
use crate::domain::story::MAX_IMAGES;
use crate::infrastructure::adapters::TempNarrationStore;

/// 用例参数
#[derive(Debug, Clone)]
pub struct StoryOptions {
    /// 单次使用的图片上限，多余的上传会被忽略
    pub max_images: usize,
    /// 预置音色
    pub voice: String,
    /// 朗读字符上限，0 表示不限制
    pub max_text_chars: usize,
}

impl Default for StoryOptions {
    fn default() -> Self {
        Self {
            max_images: MAX_IMAGES,
            voice: "Kore".to_string(),
            max_text_chars: 0,
        }
    }
}

/// 应用状态
pub struct AppState {
    pub options: StoryOptions,
    pub narration_store: TempNarrationStore,

    // ========== Command Handlers ==========
    pub generate_story_handler: GenerateStoryHandler,
    pub narrate_story_handler: NarrateStoryHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        generator: Arc<dyn NarrativeGeneratorPort>,
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        narration_store: TempNarrationStore,
        options: StoryOptions,
    ) -> Self {
        let max_images = options.max_images.clamp(1, MAX_IMAGES);
        Self {
            generate_story_handler: GenerateStoryHandler::new(generator, max_images),
            narrate_story_handler: NarrateStoryHandler::new(
                synthesizer,
                options.voice.clone(),
                options.max_text_chars,
            ),
            narration_store,
            options: StoryOptions {
                max_images,
                ..options
            },
        }
    }
}
