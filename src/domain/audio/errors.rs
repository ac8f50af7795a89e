//! Audio Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// PCM 长度未按帧对齐，或超出容器可表示的大小
    #[error("Malformed audio data: {0}")]
    MalformedAudioData(String),

    #[error("Invalid PCM format: {0}")]
    InvalidFormat(String),

    #[error("Invalid WAV container: {0}")]
    InvalidContainer(String),
}

impl AudioError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedAudioData(message.into())
    }

    pub fn invalid_container(message: impl Into<String>) -> Self {
        Self::InvalidContainer(message.into())
    }
}
