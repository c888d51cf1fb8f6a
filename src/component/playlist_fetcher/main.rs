use crate::tools::{PlatformClient, VideoRecord, YouTubeClient, save_video_records};
use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::Input;
use log::info;
use std::path::{Path, PathBuf};

pub const DEFAULT_VIDEO_LIST_FILE: &str = "video_ids.json";

/// 取得播放清單影片並寫入 JSON
pub fn fetch_playlist_videos<C: PlatformClient>(
    client: &C,
    playlist_id: &str,
    output_path: &Path,
) -> Result<Vec<VideoRecord>> {
    let videos = client
        .list_playlist_items(playlist_id)
        .with_context(|| format!("無法取得播放清單: {playlist_id}"))?;
    info!("取得 {} 支影片", videos.len());

    save_video_records(&videos, output_path)?;
    info!("影片清單已儲存至 {}", output_path.display());

    Ok(videos)
}

/// 互動式播放清單擷取
#[derive(Default)]
pub struct PlaylistFetcher;

impl PlaylistFetcher {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub fn run(&self) -> Result<()> {
        println!("{}", style("=== 取得播放清單影片 ===").cyan().bold());

        let playlist_id = self.prompt_playlist_id()?;
        let output_path = self.prompt_output_path()?;

        let client = YouTubeClient::from_env()?;

        println!("{}", style("讀取播放清單中...").dim());
        let videos = fetch_playlist_videos(&client, &playlist_id, &output_path)?;

        let untitled = videos.iter().filter(|v| v.title.is_empty()).count();

        println!();
        println!(
            "{}",
            style(format!(
                "共 {} 支影片，已儲存至 {}",
                videos.len(),
                output_path.display()
            ))
            .green()
        );
        if untitled > 0 {
            println!(
                "{}",
                style(format!("警告：{untitled} 支影片無法取得標題")).yellow()
            );
        }

        Ok(())
    }

    fn prompt_playlist_id(&self) -> Result<String> {
        let id: String = Input::new()
            .with_prompt("請輸入播放清單 ID")
            .interact_text()?;
        let id = id.trim().to_string();
        if id.is_empty() {
            bail!("播放清單 ID 不可為空");
        }
        Ok(id)
    }

    fn prompt_output_path(&self) -> Result<PathBuf> {
        let path: String = Input::new()
            .with_prompt("請輸入輸出 JSON 路徑")
            .default(DEFAULT_VIDEO_LIST_FILE.to_string())
            .interact_text()?;
        Ok(PathBuf::from(path.trim()))
    }
}
