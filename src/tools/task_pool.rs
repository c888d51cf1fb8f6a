use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// 固定大小的工作池
///
/// 送入一批任務、等待全部完成，並依輸入順序回傳結果。
/// `worker_count == 1` 時在呼叫端執行緒上依序執行。
pub struct TaskPool {
    /// 只有一個 worker 時不建立執行緒池
    pool: Option<ThreadPool>,
    worker_count: usize,
}

impl TaskPool {
    /// 建立工作池，`worker_count` 小於 1 時視為 1
    pub fn new(worker_count: usize) -> Result<Self> {
        let worker_count = worker_count.max(1);
        if worker_count == 1 {
            return Ok(Self {
                pool: None,
                worker_count,
            });
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|index| format!("worker-{index}"))
            .build()
            .context("無法建立工作執行緒池")?;

        Ok(Self {
            pool: Some(pool),
            worker_count,
        })
    }

    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// 執行所有任務，回傳結果的順序與 `tasks` 相同（與完成順序無關）
    pub fn run_ordered<T, R, F>(&self, tasks: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| tasks.par_iter().map(|task| f(task)).collect()),
            None => tasks.iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_zero_workers_clamped() {
        let pool = TaskPool::new(0).unwrap();
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn test_results_keep_input_order() {
        let pool = TaskPool::new(4).unwrap();
        let tasks: Vec<u64> = (0..16).collect();

        // 後面的任務先完成
        let results = pool.run_ordered(&tasks, |&n| {
            thread::sleep(Duration::from_millis(32 - n * 2));
            n * 10
        });

        assert_eq!(results, (0..16).map(|n| n * 10).collect::<Vec<_>>());
    }

    #[test]
    fn test_concurrency_is_bounded() {
        let pool = TaskPool::new(3).unwrap();
        let running = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let tasks: Vec<usize> = (0..24).collect();

        pool.run_ordered(&tasks, |_| {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            running.fetch_sub(1, Ordering::SeqCst);
        });

        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_single_worker_builds_no_threads() {
        let pool = TaskPool::new(1).unwrap();
        assert!(pool.pool.is_none());
        assert!(TaskPool::new(2).unwrap().pool.is_some());
    }

    #[test]
    fn test_single_worker_runs_on_calling_thread() {
        let pool = TaskPool::new(1).unwrap();
        let caller = thread::current().id();
        let ids = pool.run_ordered(&[1, 2, 3], |_| thread::current().id());
        assert!(ids.iter().all(|id| *id == caller));
    }

    #[test]
    fn test_single_worker_runs_sequentially_in_order() {
        let pool = TaskPool::new(1).unwrap();
        let order = std::sync::Mutex::new(Vec::new());
        let tasks = vec!["a", "b", "c"];

        pool.run_ordered(&tasks, |task| order.lock().unwrap().push(*task));

        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }
}
