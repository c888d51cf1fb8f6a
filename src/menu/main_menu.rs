use crate::component::thumbnail_uploader::RetryPolicy;
use crate::config::save::save_settings;
use crate::config::{Config, UserSettings};
use crate::menu::handlers::{
    run_playlist_fetcher, run_thumbnail_generator, run_thumbnail_uploader,
};
use crate::tools::{THUMBNAIL_EXTENSIONS, normalize_extension};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== 影片縮圖工具 ===").cyan().bold());
    println!("{}", style("按 ESC 離開").dim());

    let options = [
        "產生縮圖",
        "取得播放清單影片",
        "比對並上傳縮圖",
        "設定",
        "離開",
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_thumbnail_generator(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_playlist_fetcher(term)?;
            Ok(true)
        }
        Some(2) => {
            run_thumbnail_uploader(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(3) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(4) | None => Ok(false),
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style("=== 設定 ===").cyan().bold());
        println!("{}", style("按 ESC 返回").dim());

        let thumbnail = &config.settings.thumbnail;
        let upload = &config.settings.upload;
        let options = [
            format!("字型: {}", thumbnail.font),
            format!("字型大小: {}", thumbnail.font_size),
            format!("文字顏色: {}", thumbnail.color),
            format!("輸出格式: {}", thumbnail.extension),
            format!("產生縮圖 worker 數: {}", thumbnail.worker_count),
            format!("上傳 worker 數: {}", upload.worker_count),
            format!("上傳重試次數: {}", upload.max_retries),
            format!("重試基礎延遲 (ms): {}", upload.retry_base_delay_ms),
            format!("重試延遲上限 (ms): {}", upload.retry_max_delay_ms),
            "返回".to_string(),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇要修改的項目")
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        let mut updated = config.settings.clone();
        match selection {
            Some(0) => {
                updated.thumbnail.font = prompt_value("字型", updated.thumbnail.font.clone())?;
            }
            Some(1) => {
                updated.thumbnail.font_size =
                    prompt_value("字型大小", updated.thumbnail.font_size)?.max(1);
            }
            Some(2) => {
                updated.thumbnail.color =
                    prompt_value("文字顏色", updated.thumbnail.color.clone())?;
            }
            Some(3) => {
                let Some(extension) = prompt_extension(term, &updated.thumbnail.extension)? else {
                    continue;
                };
                updated.thumbnail.extension = extension;
            }
            Some(4) => {
                updated.thumbnail.worker_count =
                    prompt_value("產生縮圖 worker 數", updated.thumbnail.worker_count)?.max(1);
            }
            Some(5) => {
                updated.upload.worker_count =
                    prompt_value("上傳 worker 數", updated.upload.worker_count)?.max(1);
            }
            Some(6) => {
                updated.upload.max_retries =
                    prompt_value("上傳重試次數", updated.upload.max_retries)?;
            }
            Some(7) => {
                updated.upload.retry_base_delay_ms =
                    prompt_value("重試基礎延遲 (ms)", updated.upload.retry_base_delay_ms)?;
            }
            Some(8) => {
                updated.upload.retry_max_delay_ms =
                    prompt_value("重試延遲上限 (ms)", updated.upload.retry_max_delay_ms)?;
            }
            Some(9) | None => break,
            _ => unreachable!(),
        }

        if let Err(e) = validate_settings(&updated) {
            println!("\n{} {:#}", style("設定無效，未儲存:").red().bold(), e);
            std::thread::sleep(std::time::Duration::from_secs(2));
            continue;
        }

        config.settings = updated;
        save_settings(&config.settings)?;
        println!("\n{}", style("設定已儲存").green());
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

fn prompt_extension(term: &Term, current: &str) -> Result<Option<String>> {
    let default_index = THUMBNAIL_EXTENSIONS
        .iter()
        .position(|&e| e == current)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇輸出格式")
        .items(&THUMBNAIL_EXTENSIONS)
        .default(default_index)
        .interact_on_opt(term)?;

    Ok(selection.map(|index| THUMBNAIL_EXTENSIONS[index].to_string()))
}

/// 儲存前檢查：輸出格式要能被掃描辨識，重試延遲要能嚴格遞增
fn validate_settings(settings: &UserSettings) -> Result<()> {
    normalize_extension(&settings.thumbnail.extension)?;
    RetryPolicy::from_settings(&settings.upload)?;
    Ok(())
}

fn prompt_value<T>(prompt: &str, current: T) -> Result<T>
where
    T: Clone + ToString + std::str::FromStr,
    <T as std::str::FromStr>::Err: ToString,
{
    let value = Input::<T>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(current)
        .interact_text()?;
    Ok(value)
}
