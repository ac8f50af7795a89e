//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, Provider};
use crate::domain::story::MAX_IMAGES;

/// 凭据回退使用的环境变量
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No Gemini API key configured (set gemini.api_key, TALEFORGE_GEMINI__API_KEY or GOOGLE_API_KEY)")]
    MissingCredential,
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `TALEFORGE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// `gemini.api_key` 未设置时使用 `GOOGLE_API_KEY`。
///
/// # 环境变量示例
/// - `TALEFORGE_SERVER__PORT=8080`
/// - `TALEFORGE_GENERATION__PROVIDER=fake`
/// - `TALEFORGE_GEMINI__VOICE=Puck`
/// - `TALEFORGE_STORY__MAX_IMAGES=5`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8501)?
        .set_default("server.max_upload_size", 50 * 1024 * 1024)?
        .set_default("generation.provider", "gemini")?
        .set_default("gemini.base_url", "https://generativelanguage.googleapis.com")?
        .set_default("gemini.narrative_model", "gemini-2.5-pro")?
        .set_default("gemini.speech_model", "gemini-2.5-flash-preview-tts")?
        .set_default("gemini.voice", "Kore")?
        .set_default("gemini.timeout_secs", 300)?
        .set_default("story.max_images", MAX_IMAGES as u64)?
        .set_default("narration.max_text_chars", 0)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: TALEFORGE_GEMINI__API_KEY=...
    builder = builder.add_source(
        Environment::with_prefix("TALEFORGE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let mut app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    apply_credential_fallback(&mut app_config, std::env::var(API_KEY_ENV).ok());

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 未显式配置 key 时使用回退值
pub fn apply_credential_fallback(config: &mut AppConfig, fallback: Option<String>) {
    if config.gemini.api_key().is_some() {
        return;
    }
    if let Some(key) = fallback.filter(|k| !k.trim().is_empty()) {
        config.gemini.api_key = Some(key);
    }
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.story.max_images == 0 || config.story.max_images > MAX_IMAGES {
        return Err(ConfigError::ValidationError(format!(
            "story.max_images must be between 1 and {}",
            MAX_IMAGES
        )));
    }

    if config.generation.provider == Provider::Gemini {
        let gemini = &config.gemini;
        if gemini.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Gemini base URL cannot be empty".to_string(),
            ));
        }
        if gemini.narrative_model.trim().is_empty() || gemini.speech_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Gemini model names cannot be empty".to_string(),
            ));
        }
        if gemini.voice.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Gemini voice cannot be empty".to_string(),
            ));
        }
        if gemini.api_key().is_none() {
            return Err(ConfigError::MissingCredential);
        }
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志），不输出 API key
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Max Upload Size: {} bytes", config.server.max_upload_size);
    tracing::info!("Provider: {}", config.generation.provider);
    if config.generation.provider == Provider::Gemini {
        tracing::info!("Gemini URL: {}", config.gemini.base_url);
        tracing::info!("Narrative Model: {}", config.gemini.narrative_model);
        tracing::info!("Speech Model: {}", config.gemini.speech_model);
        tracing::info!("Voice: {}", config.gemini.voice);
        tracing::info!("Gemini Timeout: {}s", config.gemini.timeout_secs);
        tracing::info!(
            "API Key: {}",
            if config.gemini.api_key().is_some() { "set" } else { "missing" }
        );
    }
    tracing::info!("Max Images: {}", config.story.max_images);
    tracing::info!("Max Narration Chars: {}", config.narration.max_text_chars);
    if let Some(dir) = &config.narration.temp_dir {
        tracing::info!("Narration Temp Dir: {:?}", dir);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
