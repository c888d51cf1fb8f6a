use super::matcher::{MatchResult, PartFilter, match_thumbnails};
use super::report::AssignmentReport;
use super::upload_engine::{RetryPolicy, UploadEngine, UploadOutcome};
use crate::config::save::{add_recent_path, save_settings};
use crate::config::Config;
use crate::tools::{
    PlatformClient, UploadError, VideoRecord, YouTubeClient, load_video_records,
    parse_part_range, scan_thumbnail_files, validate_directory_exists, validate_file_exists,
};
use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 互動式縮圖比對與上傳
pub struct ThumbnailUploader {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl ThumbnailUploader {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(mut self) -> Result<Config> {
        println!("{}", style("=== 比對並上傳縮圖 ===").cyan().bold());

        let policy = RetryPolicy::from_settings(&self.config.settings.upload)?;

        let videos_json = self.prompt_videos_json()?;
        validate_file_exists(&videos_json)?;

        let thumbnails_dir = self.prompt_thumbnails_dir()?;
        validate_directory_exists(&thumbnails_dir)?;

        let filter = self.prompt_filter()?;
        let dry_run = Confirm::new()
            .with_prompt("只模擬（dry-run，不實際上傳）？")
            .default(true)
            .interact()?;

        let videos = load_video_records(&videos_json)?;
        let files = scan_thumbnail_files(&thumbnails_dir)?;
        info!(
            "讀取 {} 支影片、{} 張縮圖",
            videos.len(),
            files.len()
        );

        let match_result = match_thumbnails(&files, &videos, &filter);
        print_match_summary(&match_result);

        let outcomes = if match_result.assignment.is_empty() {
            println!("{}", style("沒有可上傳的配對").yellow());
            Vec::new()
        } else if dry_run {
            self.upload_with(&NoopClient, policy, &match_result, true)?
        } else {
            let client = YouTubeClient::from_env()?;
            self.upload_with(&client, policy, &match_result, false)?
        };

        let report = AssignmentReport::new(&match_result, &outcomes, dry_run)?;
        let report_path = AssignmentReport::default_path(&videos_json);
        report.save_to_file(&report_path)?;
        print_report_summary(&report, &report_path);

        add_recent_path(&mut self.config.settings, &videos_json.to_string_lossy());
        if let Err(e) = save_settings(&self.config.settings) {
            warn!("無法儲存設定: {e:#}");
        }

        Ok(self.config)
    }

    fn upload_with<C: PlatformClient>(
        &self,
        client: &C,
        policy: RetryPolicy,
        match_result: &MatchResult,
        dry_run: bool,
    ) -> Result<Vec<UploadOutcome>> {
        let settings = &self.config.settings.upload;

        let progress_bar = ProgressBar::new(match_result.assignment.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        progress_bar.set_message("上傳縮圖中...");

        let engine = UploadEngine::new(client, policy, Arc::clone(&self.shutdown_signal))
            .with_worker_count(settings.worker_count)
            .with_progress(progress_bar);

        engine.upload(&match_result.assignment, dry_run)
    }

    fn prompt_videos_json(&self) -> Result<PathBuf> {
        let mut input = Input::<String>::new().with_prompt("請輸入影片清單 JSON 路徑");
        let recent_json = self
            .config
            .settings
            .recent_paths
            .iter()
            .find(|p| Path::new(p).extension().is_some_and(|e| e == "json"));
        input = input.default(
            recent_json.map_or_else(|| "video_ids.json".to_string(), Clone::clone),
        );
        let path = input.interact_text()?;
        Ok(PathBuf::from(path.trim()))
    }

    fn prompt_thumbnails_dir(&self) -> Result<PathBuf> {
        let default_dir = self
            .config
            .settings
            .thumbnail
            .output_dir
            .to_string_lossy()
            .to_string();
        let path: String = Input::new()
            .with_prompt("請輸入縮圖資料夾")
            .default(default_dir)
            .interact_text()?;
        Ok(PathBuf::from(path.trim()))
    }

    fn prompt_filter(&self) -> Result<PartFilter> {
        let options = ["全部影片", "指定最小集數", "指定集數範圍 (START-END)"];
        let selection = Select::new()
            .with_prompt("請選擇影片篩選方式")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => Ok(PartFilter::All),
            1 => {
                let min: u32 = Input::new()
                    .with_prompt("請輸入最小集數")
                    .interact_text()?;
                Ok(PartFilter::MinPart(min))
            }
            2 => {
                let raw: String = Input::new()
                    .with_prompt("請輸入集數範圍")
                    .interact_text()?;
                let (start, end) = parse_part_range(&raw)?;
                Ok(PartFilter::Range(start, end))
            }
            _ => unreachable!(),
        }
    }
}

/// dry-run 用，不會被呼叫
struct NoopClient;

impl PlatformClient for NoopClient {
    fn list_playlist_items(&self, _playlist_id: &str) -> Result<Vec<VideoRecord>> {
        Ok(Vec::new())
    }

    fn set_thumbnail(&self, video_id: &str, _path: &Path) -> Result<(), UploadError> {
        Err(UploadError::fatal(format!("dry-run 不應上傳: {video_id}")))
    }
}

fn print_match_summary(match_result: &MatchResult) {
    println!();
    println!("{}", style("=== 配對結果 ===").cyan().bold());
    for entry in match_result.assignment.entries() {
        println!(
            "  {} {} <- {}",
            style("✓").green(),
            entry.video.title,
            entry.thumbnail_path.display()
        );
    }
    for video in &match_result.unmatched.unmatched_videos {
        println!("  {} 影片未配對: {}", style("✗").yellow(), video.title);
    }
    for file in &match_result.unmatched.unmatched_files {
        println!("  {} 縮圖未配對: {}", style("✗").yellow(), file.path.display());
    }
    if match_result.filtered_out > 0 {
        println!(
            "  {}",
            style(format!("{} 支影片不在篩選範圍內", match_result.filtered_out)).dim()
        );
    }
}

fn print_report_summary(report: &AssignmentReport, report_path: &Path) {
    println!();
    println!("{}", style("=== 上傳摘要 ===").cyan().bold());
    if report.dry_run {
        println!("  模擬略過: {} 支", report.skipped_count());
    } else {
        println!("  成功: {} 支", style(report.uploaded_count()).green());
        if report.failed_count() > 0 {
            println!("  失敗: {} 支", style(report.failed_count()).red());
        }
    }
    println!("  未配對影片: {} 支", report.unmatched_count());
    println!("  未配對縮圖: {} 張", report.unmatched_files.len());
    println!("  報告: {}", report_path.display());

    info!(
        "上傳摘要 - 成功: {}, 失敗: {}, 略過: {}, 未配對: {}",
        report.uploaded_count(),
        report.failed_count(),
        report.skipped_count(),
        report.unmatched_count()
    );
}
