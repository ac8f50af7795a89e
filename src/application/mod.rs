//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（故事生成、语音合成）
//! - commands: 命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    handlers::{
        GenerateStoryHandler, GenerateStoryResponse, NarrateStoryHandler, NarrateStoryResponse,
    },
    GenerateStory, NarrateStory,
};

pub use error::ApplicationError;

pub use ports::{
    GenerationError, NarrativeGeneratorPort, NarrativeRequest, NoAudioReason, SpeechAudio,
    SpeechRequest, SpeechSynthesizerPort,
};
