use super::part_extractor::extract_part_number;
use super::path_validator::validate_directory_exists;
use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

/// 產生與掃描共用的縮圖格式
pub const THUMBNAIL_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// `thumbnail.<ext>` 或 `thumbnail_part_<N>.<ext>`
static REGEX_THUMBNAIL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^thumbnail(_part_\d+)?\.([a-z0-9]+)$").expect("Invalid regex")
});

/// 去掉前導點並轉小寫，不在 [`THUMBNAIL_EXTENSIONS`] 內的格式回傳錯誤
pub fn normalize_extension(extension: &str) -> Result<String> {
    let normalized = extension.trim().trim_start_matches('.').to_lowercase();
    if !THUMBNAIL_EXTENSIONS.contains(&normalized.as_str()) {
        bail!(
            "不支援的縮圖格式 '{extension}'，可用格式: {}",
            THUMBNAIL_EXTENSIONS.join(", ")
        );
    }
    Ok(normalized)
}

fn is_thumbnail_extension(extension: &str) -> bool {
    THUMBNAIL_EXTENSIONS.contains(&extension.to_lowercase().as_str())
}

/// 磁碟上的縮圖檔
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThumbnailFile {
    pub path: PathBuf,
    /// `None` 代表無集數的 `thumbnail.<ext>`
    pub part_number: Option<u32>,
}

impl ThumbnailFile {
    /// 依檔名慣例辨識縮圖，不符合慣例的檔案回傳 `None`
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let caps = REGEX_THUMBNAIL_NAME.captures(file_name)?;
        if !is_thumbnail_extension(&caps[2]) {
            return None;
        }

        let part_number = match caps.get(1) {
            Some(suffix) => Some(extract_part_number(suffix.as_str())?),
            None => None,
        };

        Some(Self {
            path: path.to_path_buf(),
            part_number,
        })
    }
}

#[must_use]
pub fn thumbnail_file_name(part_number: Option<u32>, extension: &str) -> String {
    match part_number {
        Some(part) => format!("thumbnail_part_{part}.{extension}"),
        None => format!("thumbnail.{extension}"),
    }
}

/// 列出資料夾（不遞迴）中所有符合命名慣例的縮圖，依集數排序，無集數排最後
pub fn scan_thumbnail_files(directory: &Path) -> Result<Vec<ThumbnailFile>> {
    validate_directory_exists(directory)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry =
            entry.with_context(|| format!("無法讀取縮圖資料夾: {}", directory.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(file) = ThumbnailFile::from_path(entry.path()) {
            files.push(file);
        }
    }

    files.sort_by(|a, b| {
        (a.part_number.is_none(), a.part_number, &a.path)
            .cmp(&(b.part_number.is_none(), b.part_number, &b.path))
    });
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_thumbnail_file_name() {
        assert_eq!(thumbnail_file_name(Some(12), "png"), "thumbnail_part_12.png");
        assert_eq!(thumbnail_file_name(None, "jpg"), "thumbnail.jpg");
    }

    #[test]
    fn test_from_path() {
        let file = ThumbnailFile::from_path(Path::new("/out/thumbnail_part_12.png")).unwrap();
        assert_eq!(file.part_number, Some(12));

        let file = ThumbnailFile::from_path(Path::new("/out/Thumbnail_Part_4.JPEG")).unwrap();
        assert_eq!(file.part_number, Some(4));

        let file = ThumbnailFile::from_path(Path::new("/out/thumbnail.jpg")).unwrap();
        assert_eq!(file.part_number, None);
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".PNG").unwrap(), "png");
        assert_eq!(normalize_extension("jpeg").unwrap(), "jpeg");
        assert!(normalize_extension("webp").is_err());
        assert!(normalize_extension("").is_err());
    }

    #[test]
    fn test_every_supported_extension_is_recognised() {
        for extension in THUMBNAIL_EXTENSIONS {
            let name = thumbnail_file_name(Some(7), extension);
            let file = ThumbnailFile::from_path(&Path::new("/out").join(&name)).unwrap();
            assert_eq!(file.part_number, Some(7), "{name}");
        }
    }

    #[test]
    fn test_from_path_rejects_other_files() {
        assert!(ThumbnailFile::from_path(Path::new("/out/cover.png")).is_none());
        assert!(ThumbnailFile::from_path(Path::new("/out/thumbnail_part_1.gif")).is_none());
        assert!(ThumbnailFile::from_path(Path::new("/out/thumbnail_part_1.webp")).is_none());
        assert!(ThumbnailFile::from_path(Path::new("/out/.thumbnail_part_1.png.tmp")).is_none());
        assert!(ThumbnailFile::from_path(Path::new("/out/thumbnail_part_x.png")).is_none());
        assert!(
            ThumbnailFile::from_path(Path::new("/out/thumbnail_part_99999999999.png")).is_none()
        );
    }

    #[test]
    fn test_scan_thumbnail_files() {
        let dir = tempdir().unwrap();
        for name in [
            "thumbnail_part_10.png",
            "thumbnail_part_2.png",
            "thumbnail_part_1.png",
            "thumbnail.png",
            "notes.txt",
            ".thumbnail_part_3.png.tmp",
        ] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("thumbnail_part_9.png"), b"x").unwrap();

        let files = scan_thumbnail_files(dir.path()).unwrap();
        let parts: Vec<_> = files.iter().map(|f| f.part_number).collect();

        assert_eq!(parts, vec![Some(1), Some(2), Some(10), None]);
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        assert!(scan_thumbnail_files(Path::new("/nonexistent/thumbnails")).is_err());
    }
}
