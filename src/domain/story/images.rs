//! Story Context - 输入图片

use super::StoryError;

/// 单次生成允许的最大图片数
pub const MAX_IMAGES: usize = 10;

/// 支持的图片编码（按文件头识别）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// 根据魔数识别图片格式
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// 上传文件扩展名白名单
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// 已识别格式的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl ImagePayload {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

/// 有序图片序列
///
/// 不变量:
/// - 1 <= len <= 上限（不超过 MAX_IMAGES）
/// - 顺序即故事场景顺序
/// - 每张图片都能识别为 JPEG/PNG/WebP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBatch {
    images: Vec<ImagePayload>,
}

impl ImageBatch {
    pub fn new(images: Vec<Vec<u8>>) -> Result<Self, StoryError> {
        Self::with_limit(images, MAX_IMAGES)
    }

    /// 使用更严格的上限构建；`limit` 大于 MAX_IMAGES 时按 MAX_IMAGES 处理
    pub fn with_limit(images: Vec<Vec<u8>>, limit: usize) -> Result<Self, StoryError> {
        let max = limit.min(MAX_IMAGES);
        if images.is_empty() {
            return Err(StoryError::NoImages);
        }
        if images.len() > max {
            return Err(StoryError::TooManyImages {
                count: images.len(),
                max,
            });
        }

        let images = images
            .into_iter()
            .enumerate()
            .map(|(index, bytes)| {
                ImageFormat::sniff(&bytes)
                    .map(|format| ImagePayload { bytes, format })
                    .ok_or(StoryError::UnsupportedImage { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImagePayload> {
        self.images.iter()
    }

    /// 图片总字节数
    pub fn total_bytes(&self) -> usize {
        self.images.iter().map(|i| i.bytes.len()).sum()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// 最小的 PNG 文件头（格式识别只看魔数）
    pub fn png(tag: u8) -> Vec<u8> {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.push(tag);
        bytes
    }

    pub fn jpeg(tag: u8) -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, tag]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{jpeg, png};
    use super::*;

    #[test]
    fn test_sniff_formats() {
        assert_eq!(ImageFormat::sniff(&png(0)), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&jpeg(0)), Some(ImageFormat::Jpeg));
        assert_eq!(
            ImageFormat::sniff(b"RIFF\x10\0\0\0WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::sniff(b"RIFF\x10\0\0\0WAVEfmt "), None);
        assert_eq!(ImageFormat::sniff(b"GIF89a"), None);
        assert_eq!(ImageFormat::sniff(&[]), None);
    }

    #[test]
    fn test_batch_keeps_order() {
        let batch = ImageBatch::new(vec![png(1), jpeg(2), png(3)]).unwrap();
        let tags: Vec<u8> = batch.iter().map(|i| *i.bytes().last().unwrap()).collect();
        assert_eq!(tags, vec![1, 2, 3]);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert_eq!(ImageBatch::new(vec![]), Err(StoryError::NoImages));
    }

    #[test]
    fn test_eleven_images_rejected() {
        let images: Vec<_> = (0..11).map(png).collect();
        assert_eq!(
            ImageBatch::new(images),
            Err(StoryError::TooManyImages { count: 11, max: 10 })
        );
    }

    #[test]
    fn test_ten_images_accepted() {
        let images: Vec<_> = (0..10).map(png).collect();
        assert_eq!(ImageBatch::new(images).unwrap().len(), 10);
    }

    #[test]
    fn test_custom_limit_cannot_exceed_max() {
        let images: Vec<_> = (0..11).map(png).collect();
        assert!(matches!(
            ImageBatch::with_limit(images, 50),
            Err(StoryError::TooManyImages { max: 10, .. })
        ));

        let images: Vec<_> = (0..4).map(png).collect();
        assert!(ImageBatch::with_limit(images, 3).is_err());
    }

    #[test]
    fn test_unsupported_image_reports_index() {
        let result = ImageBatch::new(vec![png(0), b"plain text".to_vec()]);
        assert_eq!(result, Err(StoryError::UnsupportedImage { index: 1 }));
    }
}
