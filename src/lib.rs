//! Taleforge - 看图讲故事并朗读
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Story Context: 故事类型、提示词、图片批次
//! - Audio Context: PCM 格式、WAV 封装与校验
//!
//! 应用层 (application/):
//! - Ports: 故事生成、语音合成端口
//! - Commands: GenerateStory / NarrateStory 及处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Adapters: Gemini 客户端、离线替身、朗读临时文件

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
