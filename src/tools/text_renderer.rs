//! 文字繪製介面
//!
//! 實際繪圖交給外部工具，批次產生器只透過 [`TextRenderer`] 取得圖片位元組

use super::thumbnail_scanner::thumbnail_file_name;
use std::path::Path;
use thiserror::Error;

/// 文字樣式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub font: String,
    pub size: u32,
    pub color: String,
}

impl TextStyle {
    #[must_use]
    pub fn new(font: &str, size: u32, color: &str) -> Self {
        Self {
            font: font.to_string(),
            size,
            color: color.to_string(),
        }
    }
}

/// 集數標示文字，例如 `PART 3`
#[must_use]
pub fn part_indicator(part_number: u32) -> String {
    format!("PART {part_number}")
}

/// 單張縮圖的繪製工作，建立後不可變更
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    part_number: Option<u32>,
    title: String,
    label: String,
    style: TextStyle,
}

impl RenderJob {
    #[must_use]
    pub fn new(title: &str, part_number: Option<u32>, style: TextStyle) -> Self {
        let label = match part_number {
            Some(part) => format!("{title} {}", part_indicator(part)),
            None => title.to_string(),
        };

        Self {
            part_number,
            title: title.to_string(),
            label,
            style,
        }
    }

    #[must_use]
    pub const fn part_number(&self) -> Option<u32> {
        self.part_number
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 完整標籤：標題加上集數標示（若有）
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn style(&self) -> &TextStyle {
        &self.style
    }

    #[must_use]
    pub fn part_indicator(&self) -> Option<String> {
        self.part_number.map(part_indicator)
    }

    #[must_use]
    pub fn file_name(&self, extension: &str) -> String {
        thumbnail_file_name(self.part_number, extension)
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("無法讀取底圖 {0}")]
    BaseImage(String),

    #[error("找不到字型 {0}")]
    MissingFont(String),

    #[error("繪圖失敗: {0}")]
    Drawing(String),
}

/// 繪圖介面：底圖 + 文字 + 樣式 → 圖片位元組
///
/// 實作必須是無狀態的，會同時被多個 worker 呼叫
pub trait TextRenderer: Sync {
    fn render(&self, base_image: &Path, job: &RenderJob) -> Result<Vec<u8>, RenderError>;

    /// 輸出圖片格式的副檔名（不含前導點）
    fn extension(&self) -> &str {
        "png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle::new("DejaVu-Sans-Bold", 60, "white")
    }

    #[test]
    fn test_numbered_job_label() {
        let job = RenderJob::new("Road Trip", Some(3), style());
        assert_eq!(job.label(), "Road Trip PART 3");
        assert_eq!(job.title(), "Road Trip");
        assert_eq!(job.part_indicator().as_deref(), Some("PART 3"));
        assert_eq!(job.file_name("png"), "thumbnail_part_3.png");
    }

    #[test]
    fn test_unlabeled_job() {
        let job = RenderJob::new("Road Trip", None, style());
        assert_eq!(job.label(), "Road Trip");
        assert_eq!(job.part_indicator(), None);
        assert_eq!(job.file_name("jpg"), "thumbnail.jpg");
    }

    #[test]
    fn test_render_error_messages() {
        assert!(
            RenderError::MissingFont("Comic".to_string())
                .to_string()
                .contains("Comic")
        );
        assert!(
            RenderError::Drawing("boom".to_string())
                .to_string()
                .starts_with("繪圖失敗")
        );
    }
}
