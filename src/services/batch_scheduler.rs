//! Windowed concurrent execution of many resize jobs.
//!
//! Jobs run in fixed-size windows. Before each window the memory monitor
//! gets a chance to clear the pool; inside a window every job is raced
//! against its timeout. The first failure (error or timeout) fails the
//! whole call and drops the rest of the window, so no partial results are
//! returned. Work already moved to the blocking pool is abandoned, not
//! cancelled.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join_all;

use crate::error::ResizeError;
use crate::models::BatchConfig;
use crate::services::MemoryMonitor;

pub struct BatchScheduler {
    monitor: Arc<MemoryMonitor>,
    defaults: BatchConfig,
}

impl BatchScheduler {
    pub fn new(monitor: Arc<MemoryMonitor>, defaults: BatchConfig) -> Self {
        Self { monitor, defaults }
    }

    /// Run every job, `concurrency` at a time, each bounded by `timeout`.
    ///
    /// Results are index-aligned with `jobs`. `None` uses the configured
    /// defaults; a concurrency of zero is treated as one.
    pub async fn process_all<I, F, Fut, T>(
        &self,
        jobs: I,
        concurrency: Option<usize>,
        timeout: Option<Duration>,
    ) -> Result<Vec<T>, ResizeError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ResizeError>>,
    {
        let window = concurrency.unwrap_or(self.defaults.concurrency).max(1);
        let timeout = timeout.unwrap_or(Duration::from_millis(self.defaults.timeout_ms));

        let mut pending = jobs.into_iter().enumerate().peekable();
        let mut results = Vec::new();
        let mut window_index = 0;

        while pending.peek().is_some() {
            self.monitor.check_and_optimize();

            let batch: Vec<_> = pending
                .by_ref()
                .take(window)
                .map(|(index, job)| run_with_timeout(index, job, timeout))
                .collect();
            tracing::debug!(window = window_index, jobs = batch.len(), "Starting batch window");

            match try_join_all(batch).await {
                Ok(done) => results.extend(done),
                Err(e) => {
                    tracing::warn!(window = window_index, error = %e, "Batch failed");
                    return Err(e);
                }
            }
            window_index += 1;
        }

        tracing::info!(jobs = results.len(), windows = window_index, "Batch complete");
        Ok(results)
    }
}

async fn run_with_timeout<F, Fut, T>(
    index: usize,
    job: F,
    timeout: Duration,
) -> Result<T, ResizeError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ResizeError>>,
{
    match tokio::time::timeout(timeout, job()).await {
        Ok(result) => result,
        Err(_) => Err(ResizeError::Timeout {
            index,
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonitorConfig, PoolConfig};
    use crate::services::{SharedProbe, SurfacePool, UnavailableProbe};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scheduler() -> BatchScheduler {
        let pool = Arc::new(SurfacePool::new(4, PoolConfig::default()));
        let monitor = Arc::new(MemoryMonitor::new(
            MonitorConfig::default(),
            Arc::new(UnavailableProbe),
            pool,
        ));
        BatchScheduler::new(monitor, BatchConfig::default())
    }

    #[tokio::test]
    async fn test_results_are_index_aligned() {
        let scheduler = scheduler();
        let jobs = (0..7u64).map(|i| {
            move || async move {
                // later jobs finish first inside each window
                tokio::time::sleep(Duration::from_millis(30 - i * 4)).await;
                Ok::<_, ResizeError>(i * 10)
            }
        });

        let results = scheduler.process_all(jobs, Some(3), None).await.unwrap();
        assert_eq!(results, vec![0, 10, 20, 30, 40, 50, 60]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let scheduler = scheduler();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs = (0..6).map(|_| {
            let running = running.clone();
            let peak = peak.clone();
            move || async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, ResizeError>(())
            }
        });

        scheduler.process_all(jobs, Some(2), None).await.unwrap();
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_one_failure_rejects_batch() {
        let scheduler = scheduler();
        let jobs = (0..5).map(|i| {
            move || async move {
                if i == 3 {
                    Err(ResizeError::Task("boom".to_string()))
                } else {
                    Ok(i)
                }
            }
        });

        let err = scheduler.process_all(jobs, Some(2), None).await.unwrap_err();
        assert!(matches!(err, ResizeError::Task(ref m) if m == "boom"));
    }

    #[tokio::test]
    async fn test_timeout_rejects_batch() {
        let scheduler = scheduler();
        let jobs = (0..3u64).map(|i| {
            move || async move {
                let delay = if i == 1 { 500 } else { 1 };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok::<_, ResizeError>(i)
            }
        });

        let err = scheduler
            .process_all(jobs, Some(3), Some(Duration::from_millis(50)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResizeError::Timeout {
                index: 1,
                timeout_ms: 50
            }
        ));
    }

    #[tokio::test]
    async fn test_later_windows_never_start_after_failure() {
        let scheduler = scheduler();
        let started = Arc::new(AtomicUsize::new(0));

        let jobs = (0..6).map(|i| {
            let started = started.clone();
            move || async move {
                started.fetch_add(1, Ordering::SeqCst);
                if i == 0 {
                    Err(ResizeError::Task("first".to_string()))
                } else {
                    Ok(i)
                }
            }
        });

        assert!(scheduler.process_all(jobs, Some(2), None).await.is_err());
        assert!(started.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_zero_concurrency_runs_serially() {
        let scheduler = scheduler();
        let jobs = (0..3).map(|i| move || async move { Ok::<_, ResizeError>(i) });
        let results = scheduler.process_all(jobs, Some(0), None).await.unwrap();
        assert_eq!(results, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_monitor_checked_before_each_window() {
        let pool = Arc::new(SurfacePool::new(4, PoolConfig::default()));
        let monitor = Arc::new(MemoryMonitor::new(
            MonitorConfig::default(),
            Arc::new(SharedProbe::new(10, 100)),
            pool,
        ));
        let scheduler = BatchScheduler::new(monitor.clone(), BatchConfig::default());

        let jobs = (0..5).map(|i| move || async move { Ok::<_, ResizeError>(i) });
        scheduler.process_all(jobs, Some(2), None).await.unwrap();
        assert_eq!(monitor.stats().checks, 3);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let scheduler = scheduler();
        let jobs: Vec<fn() -> std::future::Ready<Result<u8, ResizeError>>> = Vec::new();
        let results = scheduler.process_all(jobs, None, None).await.unwrap();
        assert!(results.is_empty());
    }
}
