//! Taleforge - 看图讲故事并朗读
//!
//! 启动流程：加载配置 -> 初始化日志 -> 选择生成服务 -> 启动 HTTP 服务器

use std::sync::Arc;

use taleforge::application::{NarrativeGeneratorPort, SpeechSynthesizerPort};
use taleforge::config::{load_config, print_config, AppConfig, Provider};
use taleforge::infrastructure::adapters::{
    ApiKey, FakeGenerationClient, GeminiClient, GeminiClientConfig, TempNarrationStore,
};
use taleforge::infrastructure::http::{AppState, HttpServer, ServerConfig, StoryOptions};

/// 初始化日志（RUST_LOG 优先于配置）
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},taleforge={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

/// 按配置创建两个端口的实现
fn build_generation(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn NarrativeGeneratorPort>, Arc<dyn SpeechSynthesizerPort>)> {
    match config.generation.provider {
        Provider::Gemini => {
            let gemini = &config.gemini;
            let api_key = ApiKey::new(gemini.api_key().unwrap_or_default())?;
            let client_config = GeminiClientConfig {
                base_url: gemini.base_url.clone(),
                api_key,
                narrative_model: gemini.narrative_model.clone(),
                speech_model: gemini.speech_model.clone(),
                timeout_secs: gemini.timeout_secs,
            };
            let client = Arc::new(GeminiClient::new(client_config)?);
            let generator: Arc<dyn NarrativeGeneratorPort> = client.clone();
            let synthesizer: Arc<dyn SpeechSynthesizerPort> = client;
            Ok((generator, synthesizer))
        }
        Provider::Fake => {
            tracing::warn!("Using fake generation provider, no remote calls will be made");
            let client = Arc::new(FakeGenerationClient::with_defaults());
            let generator: Arc<dyn NarrativeGeneratorPort> = client.clone();
            let synthesizer: Arc<dyn SpeechSynthesizerPort> = client;
            Ok((generator, synthesizer))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 中的 GOOGLE_API_KEY 等变量
    dotenv::dotenv().ok();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Taleforge - 看图讲故事");
    print_config(&config);

    let (generator, synthesizer) = build_generation(&config)?;

    let narration_store = TempNarrationStore::new(config.narration.temp_dir.clone()).await?;

    let options = StoryOptions {
        max_images: config.story.max_images,
        voice: config.gemini.voice.clone(),
        max_text_chars: config.narration.max_text_chars,
    };
    let state = AppState::new(generator, synthesizer, narration_store, options);

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_upload_size(config.server.max_upload_size);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
