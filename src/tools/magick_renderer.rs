use super::text_renderer::{RenderError, RenderJob, TextRenderer};
use super::thumbnail_scanner::normalize_extension;
use anyhow::Result;
use log::debug;
use std::path::Path;
use std::process::Command;

/// 縮圖輸出尺寸
pub const THUMBNAIL_WIDTH: u32 = 1280;
pub const THUMBNAIL_HEIGHT: u32 = 720;

/// 黑色外框與白色內框的線寬
const OUTER_BORDER: u32 = 20;
const INNER_BORDER: u32 = 4;

/// 使用 ImageMagick (`magick`) 繪製縮圖
///
/// 版面：底圖裁切成 1280x720、黑白雙層外框、標題置頂、
/// 集數標示放在右下角。圖片輸出到 stdout 後直接回傳位元組。
pub struct MagickRenderer {
    program: String,
    extension: String,
}

impl MagickRenderer {
    /// `extension` 必須是縮圖掃描認得的格式（png、jpg、jpeg）
    pub fn new(extension: &str) -> Result<Self> {
        Ok(Self {
            program: "magick".to_string(),
            extension: normalize_extension(extension)?,
        })
    }

    /// 指定 ImageMagick 執行檔（例如舊版的 `convert`）
    #[must_use]
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    fn build_args(&self, base_image: &Path, job: &RenderJob) -> Vec<String> {
        let style = job.style();
        let outer = f64::from(OUTER_BORDER);
        let width = f64::from(THUMBNAIL_WIDTH);
        let height = f64::from(THUMBNAIL_HEIGHT);

        let mut args = vec![
            base_image.to_string_lossy().to_string(),
            "-resize".to_string(),
            format!("{THUMBNAIL_WIDTH}x{THUMBNAIL_HEIGHT}^"),
            "-gravity".to_string(),
            "center".to_string(),
            "-extent".to_string(),
            format!("{THUMBNAIL_WIDTH}x{THUMBNAIL_HEIGHT}"),
            "-bordercolor".to_string(),
            "none".to_string(),
            "-border".to_string(),
            OUTER_BORDER.to_string(),
            // 外層黑框
            "-stroke".to_string(),
            "black".to_string(),
            "-strokewidth".to_string(),
            OUTER_BORDER.to_string(),
            "-fill".to_string(),
            "none".to_string(),
            "-draw".to_string(),
            format!(
                "rectangle {},{} {},{}",
                outer / 2.0,
                outer / 2.0,
                width + outer * 1.5,
                height + outer * 1.5
            ),
            // 內層白框
            "-stroke".to_string(),
            "white".to_string(),
            "-strokewidth".to_string(),
            INNER_BORDER.to_string(),
            "-fill".to_string(),
            "none".to_string(),
            "-draw".to_string(),
            format!(
                "rectangle {OUTER_BORDER},{OUTER_BORDER} {},{}",
                THUMBNAIL_WIDTH + OUTER_BORDER,
                THUMBNAIL_HEIGHT + OUTER_BORDER
            ),
            // 標題（置頂）
            "(".to_string(),
            "-background".to_string(),
            "none".to_string(),
            "-font".to_string(),
            style.font.clone(),
            "-pointsize".to_string(),
            style.size.to_string(),
            "-fill".to_string(),
            style.color.clone(),
            "-stroke".to_string(),
            "black".to_string(),
            "-strokewidth".to_string(),
            "3".to_string(),
            "-size".to_string(),
            "1200x200".to_string(),
            "-gravity".to_string(),
            "center".to_string(),
            format!("caption:{}", escape_text(job.title())),
            ")".to_string(),
            "-gravity".to_string(),
            "north".to_string(),
            "-geometry".to_string(),
            "+0+40".to_string(),
            "-composite".to_string(),
        ];

        // 集數（右下角）
        if let Some(indicator) = job.part_indicator() {
            args.extend([
                "-font".to_string(),
                style.font.clone(),
                "-pointsize".to_string(),
                style.size.to_string(),
                "-fill".to_string(),
                style.color.clone(),
                "-stroke".to_string(),
                "black".to_string(),
                "-strokewidth".to_string(),
                "3".to_string(),
                "-gravity".to_string(),
                "southeast".to_string(),
                "-annotate".to_string(),
                "+40+30".to_string(),
                indicator,
            ]);
        }

        args.push(format!("{}:-", self.extension));
        args
    }
}

impl TextRenderer for MagickRenderer {
    fn render(&self, base_image: &Path, job: &RenderJob) -> Result<Vec<u8>, RenderError> {
        if !base_image.is_file() {
            return Err(RenderError::BaseImage(base_image.display().to_string()));
        }

        let args = self.build_args(base_image, job);
        debug!("執行繪圖: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| RenderError::Drawing(format!("無法執行 {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(base_image, job, stderr.trim()));
        }

        if output.stdout.is_empty() {
            return Err(RenderError::Drawing(format!(
                "{} 沒有輸出任何圖片資料",
                self.program
            )));
        }

        Ok(output.stdout)
    }

    fn extension(&self) -> &str {
        &self.extension
    }
}

/// 讓 ImageMagick 照字面繪製文字：開頭的 `@` 會被當成讀檔，`%` 與 `\` 是跳脫字元
fn escape_text(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('%', "%%");
    match escaped.strip_prefix('@') {
        Some(rest) => format!("\\@{rest}"),
        None => escaped,
    }
}

fn classify_failure(base_image: &Path, job: &RenderJob, stderr: &str) -> RenderError {
    let lowered = stderr.to_lowercase();
    if lowered.contains("unable to read font") {
        RenderError::MissingFont(job.style().font.clone())
    } else if lowered.contains("unable to open image") || lowered.contains("no decode delegate") {
        RenderError::BaseImage(format!("{}: {stderr}", base_image.display()))
    } else {
        RenderError::Drawing(stderr.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::TextStyle;

    fn job(part: Option<u32>) -> RenderJob {
        RenderJob::new("Road Trip", part, TextStyle::new("DejaVu-Sans-Bold", 60, "white"))
    }

    #[test]
    fn test_build_args_numbered() {
        let renderer = MagickRenderer::new("png").unwrap();
        let args = renderer.build_args(Path::new("/in/base.jpg"), &job(Some(3)));

        assert_eq!(args[0], "/in/base.jpg");
        assert!(args.contains(&"1280x720^".to_string()));
        assert!(args.contains(&"rectangle 10,10 1310,750".to_string()));
        assert!(args.contains(&"rectangle 20,20 1300,740".to_string()));
        assert!(args.contains(&"caption:Road Trip".to_string()));
        assert!(args.contains(&"PART 3".to_string()));
        assert_eq!(args.last().unwrap(), "png:-");
    }

    #[test]
    fn test_build_args_unlabeled_has_no_annotation() {
        let renderer = MagickRenderer::new(".JPG").unwrap();
        let args = renderer.build_args(Path::new("/in/base.jpg"), &job(None));

        assert!(!args.contains(&"-annotate".to_string()));
        assert_eq!(args.last().unwrap(), "jpg:-");
        assert_eq!(renderer.extension(), "jpg");
    }

    #[test]
    fn test_rejects_unscannable_extension() {
        assert!(MagickRenderer::new("webp").is_err());
        assert!(MagickRenderer::new("gif").is_err());
    }

    #[test]
    fn test_caption_is_literal_text() {
        let renderer = MagickRenderer::new("png").unwrap();
        let job = RenderJob::new(
            "@/etc/passwd 100%",
            Some(1),
            TextStyle::new("DejaVu-Sans-Bold", 60, "white"),
        );
        let args = renderer.build_args(Path::new("/in/base.jpg"), &job);

        assert!(args.contains(&"caption:\\@/etc/passwd 100%%".to_string()));
        assert!(!args.iter().any(|arg| arg.starts_with("caption:@")));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("Road Trip"), "Road Trip");
        assert_eq!(escape_text("a@b"), "a@b");
        assert_eq!(escape_text("C:\\dir"), "C:\\\\dir");
    }

    #[test]
    fn test_missing_base_image() {
        let renderer = MagickRenderer::new("png").unwrap();
        let result = renderer.render(Path::new("/nonexistent/base.png"), &job(Some(1)));
        assert!(matches!(result, Err(RenderError::BaseImage(_))));
    }

    #[test]
    fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.png");
        std::fs::write(&base, b"not really an image").unwrap();

        let renderer = MagickRenderer::new("png")
            .unwrap()
            .with_program("definitely-not-magick-binary");
        let result = renderer.render(&base, &job(Some(1)));
        assert!(matches!(result, Err(RenderError::Drawing(_))));
    }

    #[test]
    fn test_classify_failure() {
        let base = Path::new("/in/base.png");
        assert!(matches!(
            classify_failure(base, &job(None), "magick: unable to read font `Nope'"),
            RenderError::MissingFont(_)
        ));
        assert!(matches!(
            classify_failure(base, &job(None), "magick: unable to open image 'x'"),
            RenderError::BaseImage(_)
        ));
        assert!(matches!(
            classify_failure(base, &job(None), "something else"),
            RenderError::Drawing(_)
        ));
    }
}
