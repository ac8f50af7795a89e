//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 生成服务选择
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Gemini 配置
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// 故事配置
    #[serde(default)]
    pub story: StoryConfig,

    /// 朗读配置
    #[serde(default)]
    pub narration: NarrationConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体最大大小（字节），默认 50MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_max_upload_size() -> usize {
    50 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// 生成服务提供方
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Gemini
    #[default]
    Gemini,
    /// 离线替身：固定故事 + 静音
    Fake,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => f.write_str("gemini"),
            Provider::Fake => f.write_str("fake"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub provider: Provider,
}

/// Gemini 配置
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API 凭据，未设置时回退到 GOOGLE_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// API 基础 URL
    #[serde(default = "default_gemini_url")]
    pub base_url: String,

    /// 故事生成模型
    #[serde(default = "default_narrative_model")]
    pub narrative_model: String,

    /// 语音合成模型
    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    /// 预置音色
    #[serde(default = "default_voice")]
    pub voice: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_narrative_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_gemini_timeout() -> u64 {
    300
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_url(),
            narrative_model: default_narrative_model(),
            speech_model: default_speech_model(),
            voice: default_voice(),
            timeout_secs: default_gemini_timeout(),
        }
    }
}

impl GeminiConfig {
    /// 非空白的 API key
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// 故事配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoryConfig {
    /// 单次最多使用的图片数，只能调低
    #[serde(default = "default_max_images")]
    pub max_images: usize,
}

fn default_max_images() -> usize {
    10
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            max_images: default_max_images(),
        }
    }
}

/// 朗读配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NarrationConfig {
    /// 最大朗读字符数，0 表示不限制
    #[serde(default)]
    pub max_text_chars: usize,

    /// 临时 WAV 文件目录，未设置时使用系统临时目录
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
