//! Storage Adapter - 朗读音频临时文件

mod temp_narration;

pub use temp_narration::{NarrationFile, NarrationStoreError, NarrationStream, TempNarrationStore};
