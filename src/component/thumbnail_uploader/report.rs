use super::matcher::MatchResult;
use super::upload_engine::{FinalState, UploadOutcome};
use crate::tools::extract_part_number;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Matched,
    /// 未配對，不會嘗試上傳
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub video_id: String,
    pub title: String,
    pub part_number: Option<u32>,
    pub thumbnail_path: Option<PathBuf>,
    pub status: EntryStatus,
    pub upload: Option<UploadOutcome>,
}

/// 配對與上傳報告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentReport {
    pub dry_run: bool,
    /// 先列出配對項目（依集數），再列出未配對的影片
    pub entries: Vec<ReportEntry>,
    pub unmatched_files: Vec<PathBuf>,
}

impl AssignmentReport {
    /// `outcomes` 必須與配對項目一一對應（同順序），尚未上傳時傳入空切片
    pub fn new(match_result: &MatchResult, outcomes: &[UploadOutcome], dry_run: bool) -> Result<Self> {
        let assignment = match_result.assignment.entries();
        if !outcomes.is_empty() && outcomes.len() != assignment.len() {
            bail!(
                "上傳結果數量 {} 與配對數量 {} 不符",
                outcomes.len(),
                assignment.len()
            );
        }

        let matched = assignment.iter().enumerate().map(|(i, entry)| ReportEntry {
            video_id: entry.video.video_id.clone(),
            title: entry.video.title.clone(),
            part_number: entry.part_number,
            thumbnail_path: Some(entry.thumbnail_path.clone()),
            status: EntryStatus::Matched,
            upload: outcomes.get(i).cloned(),
        });

        let unmatched = match_result
            .unmatched
            .unmatched_videos
            .iter()
            .map(|video| ReportEntry {
                video_id: video.video_id.clone(),
                title: video.title.clone(),
                part_number: extract_part_number(&video.title),
                thumbnail_path: None,
                status: EntryStatus::Unmatched,
                upload: None,
            });

        Ok(Self {
            dry_run,
            entries: matched.chain(unmatched).collect(),
            unmatched_files: match_result
                .unmatched
                .unmatched_files
                .iter()
                .map(|f| f.path.clone())
                .collect(),
        })
    }

    /// 預設報告路徑：`<影片清單檔名>_with_thumbnails.json`
    #[must_use]
    pub fn default_path(videos_json: &Path) -> PathBuf {
        let stem = videos_json
            .file_stem()
            .map_or_else(|| "videos".to_string(), |s| s.to_string_lossy().to_string());
        videos_json.with_file_name(format!("{stem}_with_thumbnails.json"))
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取報告: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("無法解析報告: {}", path.display()))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("無法序列化報告")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("無法建立目錄: {}", parent.display()))?;
        }

        fs::write(path, content)
            .with_context(|| format!("無法寫入報告: {}", path.display()))?;

        Ok(())
    }

    #[must_use]
    pub fn count_state(&self, predicate: impl Fn(&FinalState) -> bool) -> usize {
        self.entries
            .iter()
            .filter_map(|e| e.upload.as_ref())
            .filter(|o| predicate(&o.final_state))
            .count()
    }

    #[must_use]
    pub fn uploaded_count(&self) -> usize {
        self.count_state(|s| *s == FinalState::Uploaded)
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count_state(|s| *s == FinalState::Skipped)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count_state(|s| matches!(s, FinalState::Failed(_)))
    }

    #[must_use]
    pub fn unmatched_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Unmatched)
            .count()
    }
}
