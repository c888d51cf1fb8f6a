use crate::tools::TextStyle;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::thread;

/// 最近使用路徑的保留數量
pub const MAX_RECENT_PATHS: usize = 5;

/// 設定檔名稱（位於目前工作目錄）
pub const SETTINGS_FILE: &str = "settings.json";

/// 縮圖產生設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailSettings {
    pub font: String,
    pub font_size: u32,
    pub color: String,
    /// 輸出格式（不含前導點）
    pub extension: String,
    pub output_dir: PathBuf,
    pub worker_count: usize,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            font: "DejaVu-Sans-Bold".to_string(),
            font_size: 60,
            color: "white".to_string(),
            extension: "png".to_string(),
            output_dir: PathBuf::from("thumbnails"),
            worker_count: default_worker_count(),
        }
    }
}

impl ThumbnailSettings {
    #[must_use]
    pub fn text_style(&self) -> TextStyle {
        TextStyle::new(&self.font, self.font_size, &self.color)
    }
}

/// 縮圖上傳設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// 暫時性錯誤的額外重試次數
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub worker_count: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_base_delay_ms: 2_000,
            retry_max_delay_ms: 60_000,
            worker_count: 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub thumbnail: ThumbnailSettings,
    pub upload: UploadSettings,
    /// 最近使用的路徑，最新的在最前面
    pub recent_paths: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: UserSettings,
}

fn default_worker_count() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}
