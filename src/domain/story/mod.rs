//! Story Context - 故事限界上下文
//!
//! 职责:
//! - 故事类型（Genre）及其语气
//! - 提示词构建
//! - 输入图片序列的约束

mod errors;
mod genre;
mod images;
mod prompt;

pub use errors::StoryError;
pub use genre::Genre;
pub use images::{ImageBatch, ImageFormat, ImagePayload, MAX_IMAGES};
pub use prompt::{build_prompt, build_prompt_for_label, Prompt, MIN_PARAGRAPHS, TARGET_WORDS};

#[cfg(test)]
pub(crate) use images::fixtures;
