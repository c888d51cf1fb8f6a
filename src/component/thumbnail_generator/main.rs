use super::batch_generator::{
    BatchGenerator, BatchSummary, GeneratorConfig, PartSpec, RenderOutcome, RenderResult,
};
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::tools::{MagickRenderer, parse_part_range, validate_file_exists};
use anyhow::{Result, bail};
use console::style;
use dialoguer::{Input, Select};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 互動式縮圖產生器
pub struct ThumbnailGenerator {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl ThumbnailGenerator {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    /// 執行並回傳更新後的設定（記錄最近使用的底圖）
    pub fn run(mut self) -> Result<Config> {
        println!("{}", style("=== 產生影片縮圖 ===").cyan().bold());

        let base_image = self.prompt_base_image()?;
        validate_file_exists(&base_image)?;

        let title = self.prompt_title()?;
        let part_spec = self.prompt_part_spec()?;
        let output_dir = self.prompt_output_dir()?;

        let thumbnail = &self.config.settings.thumbnail;
        let generator_config = GeneratorConfig {
            output_dir: output_dir.clone(),
            worker_count: thumbnail.worker_count,
        };
        let renderer = MagickRenderer::new(&thumbnail.extension)?;
        let generator = BatchGenerator::new(&renderer, Arc::clone(&self.shutdown_signal));

        println!(
            "{}",
            style(format!(
                "開始產生縮圖 -> {}（worker: {}）",
                output_dir.display(),
                generator_config.worker_count
            ))
            .cyan()
        );

        let results = generator.generate(
            &base_image,
            &title,
            &part_spec,
            &thumbnail.text_style(),
            &generator_config,
        )?;

        self.print_results(&results);

        add_recent_path(
            &mut self.config.settings,
            &base_image.to_string_lossy(),
        );
        if let Err(e) = save_settings(&self.config.settings) {
            warn!("無法儲存設定: {e:#}");
        }

        Ok(self.config)
    }

    fn prompt_base_image(&self) -> Result<PathBuf> {
        let mut input = Input::<String>::new().with_prompt("請輸入底圖路徑");
        let recent_image = self
            .config
            .settings
            .recent_paths
            .iter()
            .find(|p| !Path::new(p).extension().is_some_and(|e| e == "json"));
        if let Some(recent) = recent_image {
            input = input.default(recent.clone());
        }
        let path = input.interact_text()?;
        Ok(PathBuf::from(path.trim()))
    }

    fn prompt_title(&self) -> Result<String> {
        let title: String = Input::new()
            .with_prompt("請輸入標題文字")
            .interact_text()?;
        let title = title.trim().to_string();
        if title.is_empty() {
            bail!("標題不可為空");
        }
        Ok(title)
    }

    fn prompt_part_spec(&self) -> Result<PartSpec> {
        let options = ["單一集數", "集數範圍 (START-END)", "不標示集數"];
        let selection = Select::new()
            .with_prompt("請選擇集數模式")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                let part: u32 = Input::new().with_prompt("請輸入集數").interact_text()?;
                Ok(PartSpec::Single(part))
            }
            1 => {
                let raw: String = Input::new()
                    .with_prompt("請輸入集數範圍")
                    .interact_text()?;
                let (start, end) = parse_part_range(&raw)?;
                Ok(PartSpec::Range(start, end))
            }
            2 => Ok(PartSpec::NoLabel),
            _ => unreachable!(),
        }
    }

    fn prompt_output_dir(&self) -> Result<PathBuf> {
        let default_dir = self
            .config
            .settings
            .thumbnail
            .output_dir
            .to_string_lossy()
            .to_string();
        let path: String = Input::new()
            .with_prompt("請輸入輸出資料夾")
            .default(default_dir)
            .interact_text()?;
        Ok(PathBuf::from(path.trim()))
    }

    fn print_results(&self, results: &[RenderResult]) {
        println!();
        for result in results {
            match &result.outcome {
                RenderOutcome::Success(path) => {
                    println!("  {} {}", style("✓").green(), path.display());
                }
                RenderOutcome::Failure(reason) => {
                    println!(
                        "  {} {}: {}",
                        style("✗").red(),
                        result.job.label(),
                        reason
                    );
                }
            }
        }

        let summary = BatchSummary::from_results(results);
        println!();
        println!("{}", style("=== 縮圖產生摘要 ===").cyan().bold());
        println!("  總計: {} 張", summary.total);
        println!("  成功: {} 張", style(summary.succeeded).green());
        if summary.failed > 0 {
            println!("  失敗: {} 張", style(summary.failed).red());
        }

        info!(
            "縮圖產生摘要 - 總計: {}, 成功: {}, 失敗: {}",
            summary.total, summary.succeeded, summary.failed
        );
    }
}
