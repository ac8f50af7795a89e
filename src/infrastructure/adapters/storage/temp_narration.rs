//! Temp Narration Store - 朗读音频的临时文件存储
//!
//! 每次朗读写入独立的临时文件，文件随 `NarrationFile` / `NarrationStream` 一起释放，
//! 无论响应是否完整发送都会被删除

use futures_util::Stream;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tempfile::TempPath;
use thiserror::Error;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// 临时存储错误
#[derive(Debug, Error)]
pub enum NarrationStoreError {
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for NarrationStoreError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

/// 临时文件存储
#[derive(Debug, Clone, Default)]
pub struct TempNarrationStore {
    /// None 表示系统临时目录
    dir: Option<PathBuf>,
}

impl TempNarrationStore {
    pub async fn new(dir: Option<PathBuf>) -> Result<Self, NarrationStoreError> {
        if let Some(dir) = &dir {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(Self { dir })
    }

    /// 写入 WAV 数据，返回持有文件所有权的句柄
    pub async fn write(&self, wav: Vec<u8>) -> Result<NarrationFile, NarrationStoreError> {
        let dir = self.dir.clone();

        let file = tokio::task::spawn_blocking(move || -> Result<NarrationFile, NarrationStoreError> {
            let mut builder = tempfile::Builder::new();
            builder.prefix("narration-").suffix(".wav");
            let mut file = match &dir {
                Some(dir) => builder.tempfile_in(dir)?,
                None => builder.tempfile()?,
            };
            file.write_all(&wav)?;
            file.flush()?;

            Ok(NarrationFile {
                path: file.into_temp_path(),
                len: wav.len() as u64,
            })
        })
        .await
        .map_err(|e| NarrationStoreError::IoError(format!("Write task failed: {}", e)))??;

        tracing::debug!(path = %file.path().display(), size = file.len(), "Narration written");
        Ok(file)
    }
}

/// 临时 WAV 文件，Drop 时删除
#[derive(Debug)]
pub struct NarrationFile {
    path: TempPath,
    len: u64,
}

impl NarrationFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 转为字节流；文件在流被丢弃时删除
    pub async fn into_stream(self) -> Result<NarrationStream, NarrationStoreError> {
        let file = File::open(&self.path).await?;
        Ok(NarrationStream {
            inner: ReaderStream::new(file),
            _path: self.path,
        })
    }
}

/// 文件字节流
///
/// 读取端先于路径释放
pub struct NarrationStream {
    inner: ReaderStream<File>,
    _path: TempPath,
}

impl Stream for NarrationStream {
    type Item = <ReaderStream<File> as Stream>::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_and_stream() {
        let temp_dir = tempdir().unwrap();
        let store = TempNarrationStore::new(Some(temp_dir.path().to_path_buf()))
            .await
            .unwrap();

        let data = vec![7u8; 100_000];
        let file = store.write(data.clone()).await.unwrap();
        let path = file.path().to_path_buf();

        assert!(path.exists());
        assert!(path.starts_with(temp_dir.path()));
        assert!(path.to_string_lossy().ends_with(".wav"));
        assert_eq!(file.len(), 100_000);

        let mut stream = file.into_stream().await.unwrap();
        let mut read = Vec::new();
        while let Some(chunk) = stream.next().await {
            read.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(read, data);
        assert!(path.exists());

        drop(stream);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_file_removed_when_not_streamed() {
        let temp_dir = tempdir().unwrap();
        let store = TempNarrationStore::new(Some(temp_dir.path().join("nested")))
            .await
            .unwrap();

        let file = store.write(b"RIFF".to_vec()).await.unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());

        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_partial_stream_still_cleans_up() {
        let store = TempNarrationStore::default();
        let file = store.write(vec![1u8; 200_000]).await.unwrap();
        let path = file.path().to_path_buf();

        let mut stream = file.into_stream().await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert!(!first.is_empty());

        drop(stream);
        assert!(!path.exists());
    }
}
