use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::domain::error::AppError;
use crate::domain::narration::NarrationScript;
use crate::infra::speech::SpeechEngine;

/// 読み上げキュー: 単一ワーカーが台本を1件ずつ順番に読み上げる。
///
/// 台本内の各発話は、ワーカーがその台本を取り出した時刻からの
/// オフセットで発話される。発話は完了を待ってから次へ進むため、
/// 発話同士・台本同士が重なることはない。
pub struct NarrationQueue {
    tx: mpsc::UnboundedSender<NarrationJob>,
    shared: Arc<QueueShared>,
    worker: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

struct NarrationJob {
    job_id: String,
    generation: u64,
    script: NarrationScript,
}

struct QueueShared {
    /// cancel() のたびに進む。古い世代のジョブは読み上げない。
    generation: AtomicU64,
    interrupt: Notify,
    pending: AtomicUsize,
    stopped: AtomicBool,
}

impl QueueShared {
    fn is_stale(&self, job: &NarrationJob) -> bool {
        job.generation != self.generation.load(Ordering::SeqCst)
    }
}

impl NarrationQueue {
    /// ワーカーを起動する（Tokioランタイム内で呼ぶこと）
    pub fn start(engine: Arc<dyn SpeechEngine>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(QueueShared {
            generation: AtomicU64::new(0),
            interrupt: Notify::new(),
            pending: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
        });

        let handle = tokio::spawn(run_worker(rx, engine, shared.clone()));

        Self {
            tx,
            shared,
            worker: parking_lot::Mutex::new(Some(handle)),
        }
    }

    /// 台本を末尾に積む。空の台本は積まない。
    pub fn enqueue(&self, script: NarrationScript) -> Option<String> {
        if script.is_empty() {
            return None;
        }
        if self.shared.stopped.load(Ordering::SeqCst) {
            log::warn!("Narration worker is stopped; dropping narration");
            return None;
        }

        let job_id = uuid::Uuid::new_v4().to_string();
        let job = NarrationJob {
            job_id: job_id.clone(),
            generation: self.shared.generation.load(Ordering::SeqCst),
            script,
        };

        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(job).is_err() {
            self.shared.pending.fetch_sub(1, Ordering::SeqCst);
            log::warn!("Narration worker is stopped; dropping narration");
            return None;
        }

        log::debug!("Narration queued: {job_id}");
        Some(job_id)
    }

    /// 待機中の台本をすべて破棄し、読み上げ中の台本を中断する
    pub fn cancel(&self) {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.interrupt.notify_waiters();
        log::debug!("Narration canceled (generation {generation})");
    }

    /// 未完了（待機中 + 読み上げ中）の台本数
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// ワーカーを停止する。以降の enqueue は捨てられる。
    pub fn shutdown(&self) {
        self.shared.stopped.store(true, Ordering::SeqCst);
        self.cancel();
        if let Some(handle) = self.worker.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for NarrationQueue {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.get_mut().take() {
            handle.abort();
        }
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<NarrationJob>,
    engine: Arc<dyn SpeechEngine>,
    shared: Arc<QueueShared>,
) {
    while let Some(job) = rx.recv().await {
        if shared.is_stale(&job) {
            log::debug!("Narration dropped: {}", job.job_id);
        } else {
            narrate_job(&job, engine.as_ref(), &shared).await;
        }
        shared.pending.fetch_sub(1, Ordering::SeqCst);
    }
    log::debug!("Narration worker stopped");
}

async fn narrate_job(job: &NarrationJob, engine: &dyn SpeechEngine, shared: &QueueShared) {
    let started = Instant::now();

    for utterance in &job.script.utterances {
        let notified = shared.interrupt.notified();
        tokio::pin!(notified);
        // 世代チェックより先に登録して通知の取りこぼしを防ぐ
        notified.as_mut().enable();

        if shared.is_stale(job) {
            break;
        }

        tokio::select! {
            _ = sleep_until(started + utterance.offset) => {}
            _ = &mut notified => {}
        }

        if shared.is_stale(job) {
            log::debug!("Narration interrupted: {}", job.job_id);
            break;
        }

        // 発話の完了を待つ。中断されたら発話ごと破棄する。
        tokio::select! {
            result = engine.speak(&utterance.text) => {
                if let Err(e) = result {
                    let err = AppError::from(e);
                    log::warn!("Narration failed: {err}");
                }
            }
            _ = &mut notified => {
                log::debug!("Narration interrupted while speaking: {}", job.job_id);
                break;
            }
        }
    }
}
