use crate::tools::{
    RenderJob, TaskPool, TextRenderer, TextStyle, ensure_directory_exists, normalize_extension,
    write_file_atomically,
};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 要產生哪些集數
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartSpec {
    Single(u32),
    /// 包含兩端，呼叫端需確保 `start <= end`
    Range(u32, u32),
    /// 一張不含集數標示的縮圖
    NoLabel,
}

impl PartSpec {
    /// 展開成集數列表（遞增；無集數排最後）
    #[must_use]
    pub fn part_numbers(&self) -> Vec<Option<u32>> {
        match *self {
            Self::Single(part) => vec![Some(part)],
            Self::Range(start, end) => (start..=end).map(Some).collect(),
            Self::NoLabel => vec![None],
        }
    }
}

/// 批次產生設定
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub output_dir: PathBuf,
    /// 同時繪製的數量，1 代表依序執行
    pub worker_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Success(PathBuf),
    Failure(String),
}

/// 單一繪製工作的結果
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub job: RenderJob,
    pub outcome: RenderOutcome,
}

impl RenderResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, RenderOutcome::Success(_))
    }

    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        match &self.outcome {
            RenderOutcome::Success(path) => Some(path),
            RenderOutcome::Failure(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    #[must_use]
    pub fn from_results(results: &[RenderResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}

/// 建立繪製工作列表，順序即回報順序
#[must_use]
pub fn create_render_jobs(title: &str, part_spec: &PartSpec, style: &TextStyle) -> Vec<RenderJob> {
    part_spec
        .part_numbers()
        .into_iter()
        .map(|part| RenderJob::new(title, part, style.clone()))
        .collect()
}

/// 批次縮圖產生器
pub struct BatchGenerator<'a, R: TextRenderer> {
    renderer: &'a R,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a, R: TextRenderer> BatchGenerator<'a, R> {
    pub const fn new(renderer: &'a R, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            renderer,
            shutdown_signal,
        }
    }

    /// 產生整批縮圖
    ///
    /// 單張失敗會記錄為 `Failure`，不影響其他工作；只有繪製器的輸出格式
    /// 無法被掃描辨識，或輸出資料夾無法建立時，整批才會回傳錯誤。
    pub fn generate(
        &self,
        base_image: &Path,
        title: &str,
        part_spec: &PartSpec,
        style: &TextStyle,
        config: &GeneratorConfig,
    ) -> Result<Vec<RenderResult>> {
        normalize_extension(self.renderer.extension())?;
        ensure_directory_exists(&config.output_dir)
            .with_context(|| format!("無法建立輸出資料夾: {}", config.output_dir.display()))?;

        let jobs = create_render_jobs(title, part_spec, style);
        let pool = TaskPool::new(config.worker_count)?;

        info!(
            "開始產生縮圖，共 {} 張，worker 數量 {}",
            jobs.len(),
            pool.worker_count()
        );

        let results = pool.run_ordered(&jobs, |job| {
            self.run_job(base_image, job, &config.output_dir)
        });

        let summary = BatchSummary::from_results(&results);
        info!(
            "縮圖產生完成 - 成功: {}, 失敗: {}",
            summary.succeeded, summary.failed
        );

        Ok(results)
    }

    fn run_job(&self, base_image: &Path, job: &RenderJob, output_dir: &Path) -> RenderResult {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            return RenderResult {
                job: job.clone(),
                outcome: RenderOutcome::Failure("操作已取消".to_string()),
            };
        }

        let outcome = match self.render_to_file(base_image, job, output_dir) {
            Ok(path) => {
                debug!("已產生縮圖: {}", path.display());
                RenderOutcome::Success(path)
            }
            Err(e) => {
                warn!("縮圖產生失敗 [{}]: {e:#}", job.label());
                RenderOutcome::Failure(format!("{e:#}"))
            }
        };

        RenderResult {
            job: job.clone(),
            outcome,
        }
    }

    fn render_to_file(&self, base_image: &Path, job: &RenderJob, output_dir: &Path) -> Result<PathBuf> {
        let bytes = self.renderer.render(base_image, job)?;
        let output_path = output_dir.join(job.file_name(self.renderer.extension()));
        write_file_atomically(&output_path, &bytes)?;
        Ok(output_path)
    }
}
