//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::domain::story::Genre;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Genre DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GenreResponse {
    pub label: &'static str,
    pub slug: &'static str,
    pub tone: &'static str,
}

impl From<Genre> for GenreResponse {
    fn from(genre: Genre) -> Self {
        Self {
            label: genre.label(),
            slug: genre.slug(),
            tone: genre.tone(),
        }
    }
}

// ============================================================================
// Story DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StoryResponse {
    pub story: String,
    pub genre: GenreResponse,
    /// 实际使用的图片数
    pub image_count: usize,
    /// 上传数量超过上限，多余的图片被忽略
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub struct NarrateRequest {
    pub text: String,
}
