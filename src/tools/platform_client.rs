use super::video_catalog::VideoRecord;
use std::path::Path;
use thiserror::Error;

/// 設定縮圖失敗的分類
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// 暫時性錯誤（限流、網路中斷等），可重試
    #[error("暫時性錯誤: {0}")]
    Retryable(String),

    /// 重試也不會成功（無效的影片 ID、權限不足、檔案損壞等）
    #[error("無法重試的錯誤: {0}")]
    Fatal(String),
}

impl UploadError {
    pub fn retryable(msg: impl Into<String>) -> Self {
        Self::Retryable(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }
}

/// 影片平台的操作介面
///
/// 授權由實作自行處理；上傳階段會在多個 worker 間共用同一個實例
pub trait PlatformClient: Sync {
    fn list_playlist_items(&self, playlist_id: &str) -> anyhow::Result<Vec<VideoRecord>>;

    fn set_thumbnail(&self, video_id: &str, thumbnail_path: &Path) -> Result<(), UploadError>;
}
