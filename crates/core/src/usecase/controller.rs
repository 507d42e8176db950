use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::activation::{Activation, ActivationState, StateTransition};
use crate::domain::error::AppError;
use crate::domain::item::{static_recommendations, Item, ItemList};
use crate::domain::narration::NarrationScript;
use crate::domain::selection::DetailView;
use crate::domain::settings::{AppSettings, ContentMode};
use crate::infra::quote::QuoteSource;
use crate::infra::speech::{SpeechEngine, SpeechParams};
use crate::usecase::narration_queue::NarrationQueue;
use crate::usecase::poller::PollGuard;

const RECOMMENDATIONS_ACTIVATED: &str =
    "Recommendation system activated. Here are your recommendations.";
const RECOMMENDATIONS_DEACTIVATED: &str = "Recommendation system deactivated.";
const QUOTES_ACTIVATED: &str = "Quote system activated.";
const QUOTES_DEACTIVATED: &str = "Quote system deactivated.";

const EMPTY_RECOMMENDATIONS: &str = "Activate the system to see recommendations.";
const EMPTY_QUOTES_INACTIVE: &str = "Activate the system to start receiving quotes.";
const EMPTY_QUOTES_WAITING: &str = "Waiting for the first quote...";

/// コントローラが所有する状態（有効化フラグ・表示リスト・詳細表示）
#[derive(Debug, Default)]
pub struct ControllerState {
    pub activation: Activation,
    pub items: ItemList,
    pub detail: DetailView,
}

/// toggle() の結果
#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub transition: StateTransition,
    /// 確認アラート（おすすめモードのみ）
    pub alert: Option<String>,
    pub announcement: String,
}

/// 描画用スナップショット
#[derive(Debug, Clone, Serialize)]
pub struct ControllerSnapshot {
    pub state: ActivationState,
    pub content_mode: ContentMode,
    pub toggle_label: String,
    pub items: Vec<Item>,
    pub selected: Option<Item>,
    pub empty_message: Option<String>,
    pub narrating: bool,
}

/// 有効化コントローラ
///
/// 有効化トグル、名言ポーリング、読み上げキュー、詳細表示をまとめる。
/// 読み上げワーカーとポーリングタスクを `tokio::spawn` で起動するため、
/// 生成・toggle は Tokio ランタイム内で呼ぶこと。
pub struct ActivationController {
    shared: Arc<Shared>,
    poller: parking_lot::Mutex<Option<PollGuard>>,
}

struct Shared {
    settings: AppSettings,
    state: parking_lot::Mutex<ControllerState>,
    quotes: Arc<dyn QuoteSource>,
    narrator: NarrationQueue,
    changes: watch::Sender<u64>,
}

impl Shared {
    fn script(&self, text: &str, author: Option<&str>) -> NarrationScript {
        NarrationScript::build(
            text,
            author,
            &self.settings.sentence_delimiter,
            self.settings.chunk_offset(),
        )
    }

    fn script_for(&self, item: &Item) -> NarrationScript {
        self.script(&item.text, item.author.as_deref())
    }

    fn publish(&self) {
        self.changes.send_modify(|revision| *revision += 1);
    }

    /// 名言を1件取得して先頭に追加し、読み上げる。
    ///
    /// 取得完了時点で epoch の有効化期間が続いていなければ結果を捨てる。
    async fn fetch_and_display(&self, epoch: u64) -> Result<Option<Item>, AppError> {
        let quote = self.quotes.fetch().await?;
        let item = Item::quote(quote.text, quote.author, now());

        {
            let mut state = self.state.lock();
            if !state.activation.is_current(epoch) {
                log::info!("Discarding quote fetched after deactivation");
                return Ok(None);
            }
            state.items.prepend(item.clone());
            self.narrator.enqueue(self.script_for(&item));
        }

        log::info!("Quote added: {}", item.id);
        self.publish();
        Ok(Some(item))
    }
}

impl ActivationController {
    /// 設定を検証し、読み上げパラメータを適用してワーカーを起動する。
    ///
    /// # Panics
    ///
    /// Tokio ランタイムの外で呼ぶと panic する。
    pub fn new(
        settings: AppSettings,
        quotes: Arc<dyn QuoteSource>,
        speech: Arc<dyn SpeechEngine>,
    ) -> Result<Self, AppError> {
        settings.validate()?;

        // 読み上げパラメータはセッション開始時に一度だけ適用する
        if let Err(e) = speech.configure(SpeechParams::from_settings(&settings)) {
            log::warn!("Failed to configure speech engine: {}", AppError::from(e));
        }

        log::info!(
            "Controller ready (mode: {:?}, quotes: {}, speech: {})",
            settings.content_mode,
            quotes.name(),
            speech.name()
        );

        let (changes, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            settings,
            state: parking_lot::Mutex::new(ControllerState::default()),
            quotes,
            narrator: NarrationQueue::start(speech),
            changes,
        });

        Ok(Self {
            shared,
            poller: parking_lot::Mutex::new(None),
        })
    }

    pub fn settings(&self) -> &AppSettings {
        &self.shared.settings
    }

    fn mode(&self) -> ContentMode {
        self.shared.settings.content_mode
    }

    // ==================== Toggle ====================

    /// 有効/無効を反転し、状態変化をアナウンスする。エラーは返さない。
    ///
    /// # Panics
    ///
    /// 名言モードで有効化するとポーリングタスクを起動するため、
    /// Tokio ランタイムの外で呼ぶと panic する。
    pub fn toggle(&self) -> ToggleOutcome {
        let mut poller = self.poller.lock();
        let mode = self.mode();

        let transition = {
            let mut state = self.shared.state.lock();
            let transition = state.activation.toggle(now());

            if mode == ContentMode::Recommendations {
                if transition.activated() {
                    state.items.replace(static_recommendations());
                } else {
                    state.items.clear();
                    state.detail.dismiss();
                }
            }

            let announcement = announcement_for(mode, transition.activated());
            if !transition.activated() {
                self.shared.narrator.cancel();
            }
            self.shared
                .narrator
                .enqueue(NarrationScript::announcement(announcement));

            transition
        };

        if mode == ContentMode::Quotes {
            if transition.activated() {
                *poller = Some(self.spawn_poller(transition.epoch));
            } else if let Some(guard) = poller.take() {
                guard.cancel();
            }
        }
        drop(poller);

        log::info!(
            "Activation: {} -> {}",
            transition.prev_state.as_str(),
            transition.new_state.as_str()
        );
        self.shared.publish();

        let alert = (mode == ContentMode::Recommendations).then(|| {
            if transition.activated() {
                "System activated".to_string()
            } else {
                "System deactivated".to_string()
            }
        });

        ToggleOutcome {
            announcement: announcement_for(mode, transition.activated()).to_string(),
            transition,
            alert,
        }
    }

    fn spawn_poller(&self, epoch: u64) -> PollGuard {
        let shared = self.shared.clone();
        PollGuard::spawn(self.shared.settings.poll_interval(), move || {
            let shared = shared.clone();
            async move {
                if let Err(e) = shared.fetch_and_display(epoch).await {
                    log::warn!("Quote fetch failed: {e}");
                }
            }
        })
    }

    // ==================== Fetch ====================

    /// 名言を今すぐ1件取得する（名言モードかつ有効時のみ）。
    ///
    /// 取得失敗時はリストを変更せずにエラーを返す。
    pub async fn fetch_and_display(&self) -> Result<Option<Item>, AppError> {
        if self.mode() != ContentMode::Quotes {
            return Err(AppError::invalid_state(
                "fetch is only available in quotes mode",
            ));
        }
        let epoch = {
            let state = self.shared.state.lock();
            if !state.activation.is_active() {
                return Err(AppError::invalid_state("system is not active"));
            }
            state.activation.epoch()
        };
        self.shared.fetch_and_display(epoch).await
    }

    // ==================== Selection ====================

    /// 表示中のアイテムを選択して詳細を開き、全文を読み上げる
    pub fn select(&self, item_id: &str) -> Result<Item, AppError> {
        let item = {
            let mut state = self.shared.state.lock();
            let item = visible_items(&state, self.mode())
                .iter()
                .find(|i| i.id == item_id)
                .cloned()
                .ok_or_else(|| AppError::invalid_state(format!("Item not visible: {item_id}")))?;

            state.detail.select(item.clone());
            self.shared.narrator.cancel();
            self.shared.narrator.enqueue(self.shared.script_for(&item));
            item
        };

        log::info!("Item selected: {}", item.id);
        self.shared.publish();
        Ok(item)
    }

    /// 詳細を閉じる。閉じていれば何もしない。
    pub fn dismiss(&self) -> Option<Item> {
        let closed = self.shared.state.lock().detail.dismiss();
        if closed.is_some() {
            self.shared.publish();
        }
        closed
    }

    /// 文ごとに区切って読み上げキューに積む。最後に著者名を読む。
    pub fn narrate(&self, text: &str, author: Option<&str>) -> Option<String> {
        self.shared.narrator.enqueue(self.shared.script(text, author))
    }

    /// 読み上げ待ち・読み上げ中の台本をすべて止める
    pub fn cancel_narration(&self) {
        self.shared.narrator.cancel();
    }

    // ==================== Queries ====================

    pub fn is_active(&self) -> bool {
        self.shared.state.lock().activation.is_active()
    }

    pub fn activation_state(&self) -> ActivationState {
        self.shared.state.lock().activation.state()
    }

    /// 描画に使うリスト
    pub fn visible_items(&self) -> Vec<Item> {
        let state = self.shared.state.lock();
        visible_items(&state, self.mode()).to_vec()
    }

    pub fn selected(&self) -> Option<Item> {
        self.shared.state.lock().detail.selected().cloned()
    }

    pub fn toggle_label(&self) -> &'static str {
        self.activation_state().toggle_label()
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        let state = self.shared.state.lock();
        empty_message(&state, self.mode())
    }

    pub fn is_polling(&self) -> bool {
        self.poller.lock().as_ref().is_some_and(PollGuard::is_running)
    }

    pub fn is_narrating(&self) -> bool {
        !self.shared.narrator.is_idle()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let mode = self.mode();
        let state = self.shared.state.lock();
        let activation = state.activation.state();
        ControllerSnapshot {
            state: activation,
            content_mode: mode,
            toggle_label: activation.toggle_label().to_string(),
            items: visible_items(&state, mode).to_vec(),
            selected: state.detail.selected().cloned(),
            empty_message: empty_message(&state, mode).map(str::to_string),
            narrating: !self.shared.narrator.is_idle(),
        }
    }

    /// 状態変化の通知を購読する（値は更新回数）
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.changes.subscribe()
    }

    // ==================== Lifecycle ====================

    /// ポーリングと読み上げを止める
    pub fn shutdown(&self) {
        if let Some(guard) = self.poller.lock().take() {
            guard.cancel();
        }
        self.shared.narrator.shutdown();
        log::info!("Controller shut down");
    }
}

impl Drop for ActivationController {
    fn drop(&mut self) {
        if let Some(guard) = self.poller.get_mut().take() {
            guard.cancel();
        }
        self.shared.narrator.shutdown();
    }
}

fn announcement_for(mode: ContentMode, activated: bool) -> &'static str {
    match (mode, activated) {
        (ContentMode::Recommendations, true) => RECOMMENDATIONS_ACTIVATED,
        (ContentMode::Recommendations, false) => RECOMMENDATIONS_DEACTIVATED,
        (ContentMode::Quotes, true) => QUOTES_ACTIVATED,
        (ContentMode::Quotes, false) => QUOTES_DEACTIVATED,
    }
}

fn visible_items(state: &ControllerState, mode: ContentMode) -> &[Item] {
    match mode {
        ContentMode::Recommendations if !state.activation.is_active() => &[],
        _ => state.items.as_slice(),
    }
}

fn empty_message(state: &ControllerState, mode: ContentMode) -> Option<&'static str> {
    if !visible_items(state, mode).is_empty() {
        return None;
    }
    match (mode, state.activation.is_active()) {
        (ContentMode::Recommendations, false) => Some(EMPTY_RECOMMENDATIONS),
        (ContentMode::Recommendations, true) => None,
        (ContentMode::Quotes, false) => Some(EMPTY_QUOTES_INACTIVE),
        (ContentMode::Quotes, true) => Some(EMPTY_QUOTES_WAITING),
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
