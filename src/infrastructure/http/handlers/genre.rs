//! Genre Handler

use axum::Json;

use crate::domain::story::Genre;
use crate::infrastructure::http::dto::{ApiResponse, GenreResponse};

/// 列出全部故事类型（固定顺序）
pub async fn list_genres() -> Json<ApiResponse<Vec<GenreResponse>>> {
    Json(ApiResponse::success(
        Genre::ALL.into_iter().map(GenreResponse::from).collect(),
    ))
}
