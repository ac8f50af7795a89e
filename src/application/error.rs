//! 应用层错误定义
//!
//! 统一的命令错误类型，每个类别对应一条可读的提示

use thiserror::Error;

use crate::application::ports::{GenerationError, NoAudioReason};
use crate::domain::audio::AudioError;
use crate::domain::story::StoryError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 未配置凭据，不会发起任何网络请求
    #[error("No API key configured for the generation service")]
    MissingCredential,

    /// 未知的故事类型
    #[error("Unknown story genre: {0}")]
    InvalidGenre(String),

    /// 输入校验失败
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// PCM 数据未按帧对齐
    #[error("Malformed audio data: {0}")]
    MalformedAudioData(String),

    /// 网络层失败（含超时）
    #[error("Could not reach the generation service: {0}")]
    TransportFailure(String),

    /// 服务拒绝凭据
    #[error("The generation service rejected the API key: {0}")]
    AuthFailure(String),

    /// 服务端处理失败（配额、输入被拒等）
    #[error("The generation service returned an error: {0}")]
    ServiceError(String),

    /// 生成成功但没有可用文本
    #[error("No story was generated, please try again")]
    EmptyResult,

    /// 合成成功但响应中没有音频
    #[error("No audio was returned: {0}")]
    NoAudioInResponse(NoAudioReason),

    /// 临时文件等存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// EmptyResult / NoAudioInResponse 属于“有效但未成功”的结果
    pub fn is_unsuccessful_result(&self) -> bool {
        matches!(self, Self::EmptyResult | Self::NoAudioInResponse(_))
    }
}

impl From<GenerationError> for ApplicationError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingCredential => Self::MissingCredential,
            GenerationError::TransportFailure(msg) => Self::TransportFailure(msg),
            GenerationError::AuthFailure(msg) => Self::AuthFailure(msg),
            GenerationError::ServiceError(msg) => Self::ServiceError(msg),
            GenerationError::NoAudioInResponse(reason) => Self::NoAudioInResponse(reason),
        }
    }
}

impl From<StoryError> for ApplicationError {
    fn from(err: StoryError) -> Self {
        match err {
            StoryError::InvalidGenre(label) => Self::InvalidGenre(label),
            other => Self::ValidationError(other.to_string()),
        }
    }
}

impl From<AudioError> for ApplicationError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::MalformedAudioData(msg) => Self::MalformedAudioData(msg),
            other => Self::InternalError(other.to_string()),
        }
    }
}
