//! Story Commands

/// 根据图片生成故事
#[derive(Debug, Clone)]
pub struct GenerateStory {
    /// 按顺序排列的图片原始字节
    pub images: Vec<Vec<u8>>,
    /// 故事类型标签，例如 "Comedy"、"fairy-tale"
    pub genre: String,
}

/// 将故事文本朗读为 WAV 音频
#[derive(Debug, Clone)]
pub struct NarrateStory {
    pub text: String,
}
