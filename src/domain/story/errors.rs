//! Story Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    #[error("Invalid genre: {0}")]
    InvalidGenre(String),

    #[error("At least one image is required")]
    NoImages,

    #[error("Too many images: {count} supplied, at most {max} allowed")]
    TooManyImages { count: usize, max: usize },

    #[error("Image #{index} is not a supported JPEG, PNG or WebP file")]
    UnsupportedImage { index: usize },

    #[error("Story text is empty")]
    EmptyText,
}
