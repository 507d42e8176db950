//! ActivationController の結合テスト。
//!
//! フェイクの名言ソースと、発話時刻を記録する読み上げエンジンを使い、
//! Tokio の停止時間上で時刻を決定的に検証する。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;

use qn_core::domain::activation::ActivationState;
use qn_core::domain::item::ItemKind;
use qn_core::domain::settings::{AppSettings, ContentMode};
use qn_core::infra::quote::{Quote, QuoteError, QuoteSource};
use qn_core::infra::speech::{SpeechEngine, SpeechError, SpeechParams};
use qn_core::usecase::controller::ActivationController;

// ==================== Fakes ====================

struct FakeQuotes {
    responses: parking_lot::Mutex<VecDeque<Result<Quote, QuoteError>>>,
    /// Some の場合、notify されるまで応答を返さない
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl FakeQuotes {
    fn new(responses: Vec<Result<Quote, QuoteError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: parking_lot::Mutex::new(responses.into()),
            gate: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn gated(responses: Vec<Result<Quote, QuoteError>>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            responses: parking_lot::Mutex::new(responses.into()),
            gate: Some(gate),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for FakeQuotes {
    async fn fetch(&self) -> Result<Quote, QuoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .pop_front()
            .unwrap_or(Err(QuoteError::Empty))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

struct RecordingSpeech {
    origin: Instant,
    spoken: parking_lot::Mutex<Vec<(u128, String)>>,
    params: parking_lot::Mutex<Vec<SpeechParams>>,
}

impl RecordingSpeech {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            origin: Instant::now(),
            spoken: parking_lot::Mutex::new(Vec::new()),
            params: parking_lot::Mutex::new(Vec::new()),
        })
    }

    fn spoken(&self) -> Vec<(u128, String)> {
        self.spoken.lock().clone()
    }

    fn texts(&self) -> Vec<String> {
        self.spoken().into_iter().map(|(_, t)| t).collect()
    }
}

#[async_trait]
impl SpeechEngine for RecordingSpeech {
    fn configure(&self, params: SpeechParams) -> Result<(), SpeechError> {
        self.params.lock().push(params);
        Ok(())
    }

    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let at = self.origin.elapsed().as_millis();
        self.spoken.lock().push((at, text.to_string()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn quote(text: &str, author: &str) -> Result<Quote, QuoteError> {
    Ok(Quote {
        text: text.to_string(),
        author: Some(author.to_string()),
    })
}

fn quotes_controller(quotes: Arc<FakeQuotes>) -> (ActivationController, Arc<RecordingSpeech>) {
    let speech = RecordingSpeech::new();
    let ctrl = ActivationController::new(AppSettings::default(), quotes, speech.clone()).unwrap();
    (ctrl, speech)
}

// ==================== Quotes mode ====================

#[tokio::test(start_paused = true)]
async fn quote_is_fetched_displayed_and_narrated() {
    let quotes = FakeQuotes::new(vec![quote(
        "Be yourself. Everyone else is taken.",
        "Oscar Wilde",
    )]);
    let (ctrl, speech) = quotes_controller(quotes.clone());
    assert!(ctrl.visible_items().is_empty());

    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(7)).await;

    let items = ctrl.visible_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, ItemKind::Quote);
    assert_eq!(items[0].text, "Be yourself. Everyone else is taken.");
    assert_eq!(items[0].author.as_deref(), Some("Oscar Wilde"));
    assert!(items[0].fetched_at.is_some());

    assert_eq!(
        speech.spoken(),
        vec![
            (0, "Quote system activated.".to_string()),
            (0, "Be yourself".to_string()),
            (3000, "Everyone else is taken".to_string()),
            (6000, "By Oscar Wilde".to_string()),
        ]
    );

    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(quotes.calls(), 1);
    assert_eq!(ctrl.visible_items().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn single_sentence_quote_keeps_inner_punctuation() {
    let quotes = FakeQuotes::new(vec![quote(
        "Be yourself; everyone else is already taken.",
        "Oscar Wilde",
    )]);
    let (ctrl, speech) = quotes_controller(quotes.clone());

    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(
        speech.texts(),
        vec![
            "Quote system activated.",
            "Be yourself; everyone else is already taken",
            "By Oscar Wilde",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn speech_params_applied_once() {
    let (ctrl, speech) = quotes_controller(FakeQuotes::new(vec![]));
    ctrl.toggle();
    ctrl.toggle();
    assert_eq!(*speech.params.lock(), vec![SpeechParams { rate: 0.5, pitch: 1.0 }]);
}

#[tokio::test(start_paused = true)]
async fn newest_quote_is_first() {
    let quotes = FakeQuotes::new(vec![quote("First", "A"), quote("Second", "B")]);
    let (ctrl, _) = quotes_controller(quotes.clone());

    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(15)).await;

    let texts: Vec<String> = ctrl.visible_items().into_iter().map(|i| i.text).collect();
    assert_eq!(texts, vec!["Second", "First"]);
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_does_not_stop_polling() {
    let quotes = FakeQuotes::new(vec![
        Err(QuoteError::Network("connection refused".to_string())),
        quote("Later", "C"),
    ]);
    let (ctrl, _) = quotes_controller(quotes.clone());

    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(ctrl.visible_items().is_empty());
    assert!(ctrl.is_active());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(quotes.calls(), 2);
    assert_eq!(ctrl.visible_items().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn no_fetch_after_deactivation() {
    let quotes = FakeQuotes::new(vec![quote("Only", "D")]);
    let (ctrl, _) = quotes_controller(quotes.clone());

    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(1)).await;
    ctrl.toggle();
    assert!(!ctrl.is_polling());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(quotes.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_controller_stops_polling() {
    let quotes = FakeQuotes::new(vec![quote("Only", "D")]);
    let (ctrl, _) = quotes_controller(quotes.clone());

    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(ctrl.is_polling());
    drop(ctrl);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(quotes.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn reactivation_fetches_immediately() {
    let quotes = FakeQuotes::new(vec![quote("One", "E"), quote("Two", "F")]);
    let (ctrl, _) = quotes_controller(quotes.clone());

    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(1)).await;
    ctrl.toggle();
    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(quotes.calls(), 2);
    assert_eq!(ctrl.visible_items().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn fetch_completing_after_deactivation_is_discarded() {
    let gate = Arc::new(Notify::new());
    let quotes = FakeQuotes::gated(vec![quote("Too late", "G")], gate.clone());
    let speech = RecordingSpeech::new();
    let ctrl = Arc::new(
        ActivationController::new(AppSettings::default(), quotes.clone(), speech.clone()).unwrap(),
    );

    ctrl.toggle();
    let manual = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.fetch_and_display().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    // ポーリング分と手動分の2件が応答待ち
    assert_eq!(quotes.calls(), 2);

    ctrl.toggle();
    tokio::time::sleep(Duration::from_millis(1)).await;
    gate.notify_one();
    let result = manual.await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(result.unwrap(), None);
    assert!(ctrl.visible_items().is_empty());
    assert!(!speech.texts().iter().any(|t| t.contains("Too late")));
}

#[tokio::test(start_paused = true)]
async fn deactivation_interrupts_narration() {
    let quotes = FakeQuotes::new(vec![quote("A. B. C", "H")]);
    let (ctrl, speech) = quotes_controller(quotes.clone());

    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(4)).await;
    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(20)).await;

    assert_eq!(
        speech.texts(),
        vec![
            "Quote system activated.",
            "A",
            "B",
            "Quote system deactivated.",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn selecting_a_quote_narrates_it_again() {
    let quotes = FakeQuotes::new(vec![quote("Simple. Clear.", "I")]);
    let (ctrl, speech) = quotes_controller(quotes.clone());

    ctrl.toggle();
    tokio::time::sleep(Duration::from_secs(10)).await;
    ctrl.toggle();

    let id = ctrl.visible_items()[0].id.clone();
    let selected = ctrl.select(&id).unwrap();
    assert_eq!(ctrl.selected(), Some(selected));
    tokio::time::sleep(Duration::from_secs(10)).await;

    let texts = speech.texts();
    assert_eq!(&texts[texts.len() - 3..], &["Simple", "Clear", "By I"]);

    ctrl.dismiss();
    ctrl.dismiss();
    assert!(ctrl.selected().is_none());
}

// ==================== Recommendations mode ====================

#[tokio::test(start_paused = true)]
async fn recommendations_round_trip() {
    let speech = RecordingSpeech::new();
    let settings = AppSettings {
        content_mode: ContentMode::Recommendations,
        ..Default::default()
    };
    let quotes = FakeQuotes::new(vec![]);
    let ctrl = ActivationController::new(settings, quotes.clone(), speech.clone()).unwrap();

    assert_eq!(ctrl.activation_state(), ActivationState::Inactive);
    assert_eq!(
        ctrl.empty_message(),
        Some("Activate the system to see recommendations.")
    );

    let on = ctrl.toggle();
    assert_eq!(on.alert.as_deref(), Some("System activated"));
    let texts: Vec<String> = ctrl.visible_items().into_iter().map(|i| i.text).collect();
    assert_eq!(
        texts,
        vec![
            "Read React Native Docs",
            "Explore Firebase",
            "Learn about AI Recommendations",
        ]
    );

    let off = ctrl.toggle();
    assert_eq!(off.alert.as_deref(), Some("System deactivated"));
    assert_eq!(ctrl.activation_state(), ActivationState::Inactive);
    assert!(ctrl.visible_items().is_empty());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(quotes.calls(), 0);
    assert_eq!(
        speech.texts(),
        vec![
            "Recommendation system activated. Here are your recommendations.",
            "Recommendation system deactivated.",
        ]
    );
}
