//! BoundedScheduler: run a stream of async tasks under a fixed concurrency window

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

/// Progress counters surfaced to the logging collaborator at a fixed cadence.
#[derive(Default)]
pub struct SchedulerMetrics {
    pub completed: AtomicUsize,
    pub total: AtomicUsize,
}

impl SchedulerMetrics {
    fn report_if_due(&self, label: &str) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        if completed % 250 == 0 || completed == total {
            info!("{label}: {completed}/{total}");
        }
    }
}

/// Run every item in `items` through `task`, at most `window` in flight at
/// once, yielding results in completion order. Panicking/erroring tasks do
/// not halt the stream; `task` should return `None` for a failed/absent
/// outcome rather than propagate.
pub async fn run<T, F, Fut, R>(items: Vec<T>, window: usize, label: &str, task: F) -> Vec<R>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send,
    R: Send + 'static,
{
    let metrics = Arc::new(SchedulerMetrics::default());
    metrics.total.store(items.len(), Ordering::Relaxed);
    let task = Arc::new(task);

    stream::iter(items)
        .map(|item| {
            let task = Arc::clone(&task);
            let metrics = Arc::clone(&metrics);
            let label = label.to_string();
            async move {
                let result = task(item).await;
                metrics.report_if_due(&label);
                result
            }
        })
        .buffer_unordered(window.max(1))
        .collect::<Vec<_>>()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_all_items_under_small_window() {
        let items: Vec<u32> = (0..50).collect();
        let results = run(items, 4, "test", |i| async move { i * 2 }).await;
        let mut sorted = results;
        sorted.sort();
        assert_eq!(sorted, (0..50).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn window_of_one_still_completes() {
        let items = vec![1, 2, 3];
        let results = run(items, 1, "test", |i| async move { i }).await;
        assert_eq!(results.len(), 3);
    }
}
