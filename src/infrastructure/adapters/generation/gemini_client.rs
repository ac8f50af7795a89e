//! Gemini Client - 调用 Google Generative Language REST API
//!
//! 实现 NarrativeGeneratorPort 与 SpeechSynthesizerPort
//!
//! 外部 API:
//! POST {base_url}/v1beta/models/{model}:generateContent
//! Header: x-goog-api-key: <key>
//! Request/Response: JSON，图片与音频均为 base64 inline 数据

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;

use super::gemini_wire::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::application::ports::{
    GenerationError, NarrativeGeneratorPort, NarrativeRequest, SpeechAudio, SpeechRequest,
    SpeechSynthesizerPort,
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const API_KEY_INVALID_REASON: &str = "API_KEY_INVALID";

/// API 凭据
///
/// Debug 输出不包含明文
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// 空白字符串视为未配置
    pub fn new(value: impl Into<String>) -> Result<Self, GenerationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GenerationError::MissingCredential);
        }
        Ok(Self(trimmed.to_string()))
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Gemini 客户端配置
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    /// API 基础 URL
    pub base_url: String,
    pub api_key: ApiKey,
    /// 故事生成模型
    pub narrative_model: String,
    /// 语音合成模型
    pub speech_model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl GeminiClientConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key,
            narrative_model: "gemini-2.5-pro".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
            timeout_secs: 300,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Gemini 客户端
pub struct GeminiClient {
    client: Client,
    config: GeminiClientConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::TransportFailure(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let url = self.generate_url(model);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.config.api_key.expose())
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let error = classify_error(status, &error_text);
            tracing::warn!(model = %model, status = %status, error = %error, "Gemini request failed");
            return Err(error);
        }

        response.json::<GenerateContentResponse>().await.map_err(|e| {
            if e.is_decode() {
                GenerationError::ServiceError(format!("Malformed response body: {}", e))
            } else {
                transport_error(e)
            }
        })
    }
}

/// 网络层错误统一归为 TransportFailure（超时同样如此）
fn transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::TransportFailure(format!("Request timed out: {}", e))
    } else if e.is_connect() {
        GenerationError::TransportFailure(format!("Cannot connect to Gemini: {}", e))
    } else {
        GenerationError::TransportFailure(e.to_string())
    }
}

/// 非 2xx 响应分类
///
/// Gemini 对无效 key 返回 400 INVALID_ARGUMENT，需要结合 reason 或 message 判断；
/// 其余提到 key 的错误（配额、计费等）仍属于服务端错误
fn classify_error(status: StatusCode, body: &str) -> GenerationError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let error = envelope.error;

    let auth_status = matches!(error.status.as_str(), "UNAUTHENTICATED" | "PERMISSION_DENIED");
    let auth_http = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN);
    let invalid_key = error.has_reason(API_KEY_INVALID_REASON)
        || (error.status == "INVALID_ARGUMENT" && error.message.contains("API key not valid"));

    let message = if error.message.is_empty() {
        body.trim().to_string()
    } else {
        error.message
    };

    if auth_status || auth_http || invalid_key {
        GenerationError::AuthFailure(message)
    } else {
        GenerationError::ServiceError(format!("HTTP {}: {}", status.as_u16(), message))
    }
}

#[async_trait]
impl NarrativeGeneratorPort for GeminiClient {
    async fn generate_narrative(&self, request: NarrativeRequest) -> Result<String, GenerationError> {
        let body = GenerateContentRequest::narrative(&request.images, request.prompt.as_str());
        let model = &self.config.narrative_model;

        tracing::debug!(
            url = %self.generate_url(model),
            image_count = request.images.len(),
            prompt_len = request.prompt.as_str().len(),
            "Sending Gemini narrative request"
        );

        let response = self.generate_content(model, &body).await?;
        let text = response.text();

        if text.is_empty() {
            tracing::warn!(
                block_reason = ?response.block_reason(),
                finish_reason = ?response.finish_reason(),
                "Gemini returned no narrative text"
            );
        } else {
            tracing::info!(
                model = %model,
                text_len = text.len(),
                finish_reason = ?response.finish_reason(),
                "Gemini narrative completed"
            );
        }

        Ok(text)
    }
}

#[async_trait]
impl SpeechSynthesizerPort for GeminiClient {
    async fn synthesize_speech(&self, request: SpeechRequest) -> Result<SpeechAudio, GenerationError> {
        let body = GenerateContentRequest::speech(&request.text, &request.voice);
        let model = &self.config.speech_model;

        tracing::debug!(
            url = %self.generate_url(model),
            text_len = request.text.len(),
            voice = %request.voice,
            "Sending Gemini speech request"
        );

        let response = self.generate_content(model, &body).await?;
        let audio = response.first_audio().map_err(|reason| {
            tracing::warn!(
                reason = %reason,
                finish_reason = ?response.finish_reason(),
                "Gemini speech response carried no audio"
            );
            GenerationError::NoAudioInResponse(reason)
        })?;

        tracing::info!(
            model = %model,
            audio_size = audio.pcm.len(),
            mime_type = ?audio.mime_type,
            "Gemini speech completed"
        );

        Ok(audio)
    }
}
