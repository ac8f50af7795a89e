//! Story HTTP Handlers

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::path::Path;
use std::sync::Arc;

use crate::application::{ApplicationError, GenerateStory, NarrateStory};
use crate::domain::story::ImageFormat;
use crate::infrastructure::http::dto::{ApiResponse, NarrateRequest, StoryResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 朗读响应中的音频时长头
pub const AUDIO_DURATION_HEADER: &str = "x-audio-duration-ms";
/// 朗读响应中的采样率头
pub const AUDIO_SAMPLE_RATE_HEADER: &str = "x-audio-sample-rate";
/// 朗读文本是否被截断
pub const TEXT_TRUNCATED_HEADER: &str = "x-text-truncated";

/// 根据图片文件名后缀判断是否允许上传；无文件名时交由内容识别
fn accepts_image(file_name: Option<&str>) -> bool {
    match file_name {
        None => true,
        Some(name) => Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .is_some(),
    }
}

/// 生成故事
///
/// multipart: `genre` 文本字段 + 一个或多个 `images` 文件字段。
/// 超出上限的图片按上传顺序丢弃，并在响应中标记 `truncated`
pub async fn generate_story(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<StoryResponse>>, ApiError> {
    let max_images = state.options.max_images;
    let mut genre: Option<String> = None;
    let mut images: Vec<Vec<u8>> = Vec::new();
    let mut received = 0usize;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "genre" => {
                genre = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read genre: {}", e)))?,
                );
            }
            "images" | "images[]" => {
                if !accepts_image(field.file_name()) {
                    return Err(ApiError::BadRequest(
                        "Only JPG, JPEG, PNG, WEBP images are allowed".to_string(),
                    ));
                }

                received += 1;
                if images.len() >= max_images {
                    continue;
                }

                images.push(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let genre = genre.ok_or_else(|| ApiError::BadRequest("Genre is required".to_string()))?;

    let truncated = received > max_images;
    if truncated {
        tracing::warn!(
            received,
            max_images,
            "Too many images uploaded, only the first ones are used"
        );
    }

    let result = state
        .generate_story_handler
        .handle(GenerateStory { images, genre })
        .await?;

    tracing::info!(
        genre = %result.genre,
        image_count = result.image_count,
        truncated,
        "Story generated"
    );

    Ok(Json(ApiResponse::success(StoryResponse {
        story: result.story,
        genre: result.genre.into(),
        image_count: result.image_count,
        truncated,
    })))
}

/// 朗读故事
///
/// 返回 `audio/wav`，内容从临时文件流式读取，响应体释放后文件即被删除
pub async fn narrate_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NarrateRequest>,
) -> Result<Response, ApiError> {
    let result = state
        .narrate_story_handler
        .handle(NarrateStory { text: req.text })
        .await?;

    let file = state
        .narration_store
        .write(result.wav)
        .await
        .map_err(|e| ApplicationError::StorageError(e.to_string()))?;
    let file_size = file.len();

    let stream = file
        .into_stream()
        .await
        .map_err(|e| ApplicationError::StorageError(e.to_string()))?;

    tracing::info!(
        size = file_size,
        duration_ms = result.info.duration_ms,
        truncated = result.truncated,
        "Narration ready"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/wav")
        .header(header::CONTENT_LENGTH, file_size)
        .header(header::CONTENT_DISPOSITION, "inline; filename=\"narration.wav\"")
        .header(AUDIO_DURATION_HEADER, result.info.duration_ms)
        .header(AUDIO_SAMPLE_RATE_HEADER, result.info.sample_rate)
        .header(TEXT_TRUNCATED_HEADER, result.truncated.to_string())
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_image() {
        assert!(accepts_image(Some("page1.JPG")));
        assert!(accepts_image(Some("page2.jpeg")));
        assert!(accepts_image(Some("page3.png")));
        assert!(accepts_image(Some("page4.webp")));
        assert!(accepts_image(None));
        assert!(!accepts_image(Some("notes.txt")));
        assert!(!accepts_image(Some("noext")));
    }
}
