use crate::component::{PlaylistFetcher, ThumbnailGenerator, ThumbnailUploader};
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use log::warn;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_thumbnail_generator(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let generator = ThumbnailGenerator::new(config.clone(), Arc::clone(shutdown_signal));

    match generator.run() {
        Ok(updated) => *config = updated,
        Err(e) => {
            warn!("縮圖產生失敗: {e:#}");
            eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
        }
    }

    pause(term)?;
    Ok(())
}

pub fn run_playlist_fetcher(term: &Term) -> Result<()> {
    let fetcher = PlaylistFetcher::new();

    if let Err(e) = fetcher.run() {
        warn!("取得播放清單失敗: {e:#}");
        eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

pub fn run_thumbnail_uploader(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let uploader = ThumbnailUploader::new(config.clone(), Arc::clone(shutdown_signal));

    match uploader.run() {
        Ok(updated) => *config = updated,
        Err(e) => {
            warn!("縮圖上傳失敗: {e:#}");
            eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
        }
    }

    pause(term)?;
    Ok(())
}
