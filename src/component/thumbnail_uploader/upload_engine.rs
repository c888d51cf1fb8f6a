use super::matcher::{Assignment, AssignmentEntry};
use crate::tools::{PlatformClient, TaskPool, UploadError};
use crate::config::UploadSettings;
use anyhow::{Result, bail};
use indicatif::ProgressBar;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// 額外重試次數上限，延遲在此範圍內保證嚴格遞增
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// 重試策略
///
/// 第 k 次重試前等待 `max_delay - (max_delay - base_delay) / 2^(k-1)`：
/// 第一次為 `base_delay`，之後每次都更長，逐步逼近但不超過 `max_delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 暫時性錯誤時的額外重試次數
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// 建立並檢查重試策略
    ///
    /// `base_delay` 必須大於 0 且小於 `max_delay`，重試次數不可超過
    /// [`MAX_RETRIES_LIMIT`]
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Result<Self> {
        if base_delay.is_zero() {
            bail!("重試基礎延遲必須大於 0");
        }
        if base_delay >= max_delay {
            bail!(
                "重試基礎延遲 ({} ms) 必須小於延遲上限 ({} ms)",
                base_delay.as_millis(),
                max_delay.as_millis()
            );
        }
        if max_retries > MAX_RETRIES_LIMIT {
            bail!("重試次數 {max_retries} 超過上限 {MAX_RETRIES_LIMIT}");
        }

        Ok(Self {
            max_retries,
            base_delay,
            max_delay,
        })
    }

    pub fn from_settings(settings: &UploadSettings) -> Result<Self> {
        Self::new(
            settings.max_retries,
            Duration::from_millis(settings.retry_base_delay_ms),
            Duration::from_millis(settings.retry_max_delay_ms),
        )
    }

    /// 第 `retry` 次重試（從 1 開始）前的等待時間
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let gap = self.max_delay.saturating_sub(self.base_delay);
        let remaining = 2u32
            .checked_pow(retry.saturating_sub(1))
            .and_then(|factor| gap.checked_div(factor))
            .unwrap_or(Duration::ZERO);
        self.max_delay.saturating_sub(remaining)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "last_error", rename_all = "snake_case")]
pub enum FinalState {
    Uploaded,
    /// dry-run，未呼叫平台
    Skipped,
    Failed(String),
}

/// 單支影片的上傳結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub video_id: String,
    /// 實際呼叫次數（dry-run 記為 1）
    pub attempts: u32,
    pub final_state: FinalState,
}

/// 縮圖上傳引擎
///
/// 每個配對項目獨立處理：某支影片重試或失敗不會中止、也不會延遲其他影片
pub struct UploadEngine<'a, C: PlatformClient> {
    client: &'a C,
    policy: RetryPolicy,
    worker_count: usize,
    shutdown_signal: Arc<AtomicBool>,
    progress: ProgressBar,
}

impl<'a, C: PlatformClient> UploadEngine<'a, C> {
    #[must_use]
    pub fn new(client: &'a C, policy: RetryPolicy, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            client,
            policy,
            worker_count: 1,
            shutdown_signal,
            progress: ProgressBar::hidden(),
        }
    }

    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// 上傳所有配對項目，結果順序與配對順序相同
    pub fn upload(&self, assignment: &Assignment, dry_run: bool) -> Result<Vec<UploadOutcome>> {
        let entries = assignment.entries();

        if dry_run {
            info!("dry-run：略過 {} 支影片的縮圖上傳", entries.len());
            self.progress.finish_and_clear();
            return Ok(entries.iter().map(skipped_outcome).collect());
        }

        let pool = TaskPool::new(self.worker_count)?;
        info!(
            "開始上傳縮圖，共 {} 支影片，worker 數量 {}",
            entries.len(),
            pool.worker_count()
        );

        let outcomes = pool.run_ordered(entries, |entry| {
            let outcome = self.upload_entry(entry);
            self.progress.inc(1);
            outcome
        });
        self.progress.finish_with_message("完成");

        Ok(outcomes)
    }

    fn upload_entry(&self, entry: &AssignmentEntry) -> UploadOutcome {
        let video_id = &entry.video.video_id;
        let mut retries = 0;

        loop {
            let attempts = retries + 1;
            let err = match self.client.set_thumbnail(video_id, &entry.thumbnail_path) {
                Ok(()) => {
                    info!("已更新縮圖 '{}' ({attempts} 次)", entry.video.title);
                    return outcome(video_id, attempts, FinalState::Uploaded);
                }
                Err(err) => err,
            };

            if let UploadError::Fatal(_) = err {
                error!("縮圖上傳失敗 '{}': {err}", entry.video.title);
                return outcome(video_id, attempts, FinalState::Failed(err.to_string()));
            }

            if retries >= self.policy.max_retries {
                error!(
                    "縮圖上傳失敗 '{}'，已重試 {retries} 次: {err}",
                    entry.video.title
                );
                return outcome(video_id, attempts, FinalState::Failed(err.to_string()));
            }

            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷信號，停止重試 '{}'", entry.video.title);
                return outcome(video_id, attempts, FinalState::Failed(err.to_string()));
            }

            retries += 1;
            let delay = self.policy.delay_for_retry(retries);
            warn!(
                "縮圖上傳暫時失敗 '{}'，{:.1} 秒後重試 ({retries}/{}): {err}",
                entry.video.title,
                delay.as_secs_f64(),
                self.policy.max_retries
            );
            thread::sleep(delay);
        }
    }
}

fn outcome(video_id: &str, attempts: u32, final_state: FinalState) -> UploadOutcome {
    UploadOutcome {
        video_id: video_id.to_string(),
        attempts,
        final_state,
    }
}

fn skipped_outcome(entry: &AssignmentEntry) -> UploadOutcome {
    outcome(&entry.video.video_id, 1, FinalState::Skipped)
}
