use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// 定期実行タスクのハンドル。drop で必ずタスクを止める。
#[derive(Debug)]
pub struct PollGuard {
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl PollGuard {
    /// 即時に1回 tick を実行し、以降 interval ごとに実行する
    /// （Tokioランタイム内で呼ぶこと）。
    ///
    /// tick は前回の完了を待ってから次を実行する。処理が interval より
    /// 長引いた場合、次の tick は完了時点から数え直す。
    pub fn spawn<F, Fut>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                tick().await;
            }
        });

        log::debug!("Poll timer armed ({interval:?})");
        Self {
            handle: Some(handle),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// タイマーを止める
    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::debug!("Poll timer canceled");
        }
    }
}

impl Drop for PollGuard {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_guard(interval: Duration) -> (PollGuard, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let guard = PollGuard::spawn(interval, move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        (guard, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate() {
        let (_guard, count) = counting_guard(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let (guard, count) = counting_guard(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(25)).await;
        // 0s, 10s, 20s
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(guard.is_running());
        assert_eq!(guard.interval(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let (guard, count) = counting_guard(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(15)).await;
        guard.cancel();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticks() {
        let (guard, count) = counting_guard(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(guard);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
