//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Story Context: 故事类型、提示词与图片批次
//! - Audio Context: PCM 格式与 WAV 容器
//!
//! 领域层不依赖任何 I/O

pub mod audio;
pub mod story;
