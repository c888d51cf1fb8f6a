use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 平台上的一支影片
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
}

impl VideoRecord {
    #[must_use]
    pub fn new(video_id: &str, title: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            title: title.to_string(),
        }
    }
}

/// 讀取影片清單 JSON（`[{"video_id": ..., "title": ...}, ...]`）
pub fn load_video_records(path: &Path) -> Result<Vec<VideoRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("無法讀取影片清單: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("無法解析影片清單: {}", path.display()))
}

pub fn save_video_records(videos: &[VideoRecord], path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(videos).context("無法序列化影片清單")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("無法建立目錄: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("無法寫入影片清單: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_video_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lists").join("video_ids.json");
        let videos = vec![
            VideoRecord::new("abc", "Road Trip Part 1"),
            VideoRecord::new("def", "旅行 Part 2"),
        ];

        save_video_records(&videos, &path).unwrap();
        let loaded = load_video_records(&path).unwrap();

        assert_eq!(loaded, videos);
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("旅行"));
    }

    #[test]
    fn test_load_rejects_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("video_ids.json");
        fs::write(&path, r#"[{"video_id": "abc"}]"#).unwrap();

        assert!(load_video_records(&path).is_err());
    }

    #[test]
    fn test_load_ignores_extra_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("video_ids.json");
        fs::write(
            &path,
            r#"[{"video_id": "abc", "title": "Part 1", "thumbnail_path": null}]"#,
        )
        .unwrap();

        let loaded = load_video_records(&path).unwrap();
        assert_eq!(loaded, vec![VideoRecord::new("abc", "Part 1")]);
    }
}
