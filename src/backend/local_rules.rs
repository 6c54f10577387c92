//! Rule-based backend over tracked hand landmarks.
//!
//! Runs at roughly frame rate: every tick it pulls one capture from the
//! pose source, classifies it, and feeds the smoothing window. A sign is
//! emitted when the smoothed label changes, or when the same label has
//! persisted long enough to count as a deliberate repeat.

use crate::backend::{BackendShared, BackendState, DetectionBackend};
use crate::classifier::{self, GestureLabel, GestureObservation};
use crate::defaults;
use crate::error::Result;
use crate::event::SignEvent;
use crate::smoothing::SmoothingWindow;
use crate::source::{HandPoseSource, PoseCapture};
use crate::vocab::Vocabulary;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Decides when a smoothed label becomes a fresh sign event.
#[derive(Debug, Default)]
pub(crate) struct EmissionGate {
    last: Option<(GestureLabel, u64)>,
    reconfirm_interval_ms: u64,
}

impl EmissionGate {
    pub(crate) fn new(reconfirm_interval_ms: u64) -> Self {
        Self {
            last: None,
            reconfirm_interval_ms,
        }
    }

    /// True when `label` should be emitted at `now_ms`: either the label
    /// changed, or it persisted past the reconfirm interval.
    pub(crate) fn should_emit(&mut self, label: &GestureLabel, now_ms: u64) -> bool {
        if let Some((last_label, last_ms)) = &self.last
            && last_label == label
            && now_ms.saturating_sub(*last_ms) < self.reconfirm_interval_ms
        {
            return false;
        }
        self.last = Some((label.clone(), now_ms));
        true
    }

    pub(crate) fn reset(&mut self) {
        self.last = None;
    }
}

/// Landmark-rule detection backend.
pub struct LocalRulesBackend {
    source: Arc<Mutex<Box<dyn HandPoseSource>>>,
    vocabulary: Arc<Vocabulary>,
    shared: Arc<BackendShared>,
    tick_ms: u64,
    task: Option<JoinHandle<()>>,
}

impl LocalRulesBackend {
    pub fn new(source: Box<dyn HandPoseSource>) -> Self {
        Self {
            source: Arc::new(Mutex::new(source)),
            vocabulary: Arc::new(Vocabulary::new()),
            shared: BackendShared::new(),
            tick_ms: defaults::LOCAL_RULES_TICK_MS,
            task: None,
        }
    }

    /// Overrides the capture interval; used by tests to run fast.
    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }
}

#[async_trait]
impl DetectionBackend for LocalRulesBackend {
    fn name(&self) -> &'static str {
        "local-rules"
    }

    async fn initialize(&mut self) -> Result<()> {
        self.shared.set_state(BackendState::Initializing);
        // No model to load; the rule table is compiled in.
        self.shared.set_state(BackendState::Ready);
        Ok(())
    }

    async fn start(&mut self, events: mpsc::Sender<SignEvent>) -> Result<()> {
        if !self.is_initialized() {
            eprintln!("[{}] start ignored: backend not initialized", self.name());
            return Ok(());
        }
        if self.shared.is_running() {
            eprintln!("[{}] start ignored: already detecting", self.name());
            return Ok(());
        }

        self.shared.set_running(true);
        self.shared.set_state(BackendState::Detecting);

        let source = Arc::clone(&self.source);
        let vocabulary = Arc::clone(&self.vocabulary);
        let shared = Arc::clone(&self.shared);
        let tick_ms = self.tick_ms;
        let name = self.name();

        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut window = SmoothingWindow::new();
            let mut gate = EmissionGate::new(defaults::RECONFIRM_INTERVAL_MS);

            loop {
                interval.tick().await;
                if !shared.is_running() {
                    break;
                }

                shared.set_processing(true);
                let capture = {
                    // Lock scope stays clear of await points.
                    let Ok(mut source) = source.lock() else {
                        eprintln!("[{name}] pose source lock poisoned");
                        shared.set_processing(false);
                        break;
                    };
                    source.next_capture()
                };

                let observation = match capture {
                    Ok(Some(PoseCapture::Hand(frame))) => classifier::classify(&frame),
                    Ok(Some(PoseCapture::NoHand { timestamp_ms })) => {
                        GestureObservation::no_hand(timestamp_ms)
                    }
                    Ok(None) => {
                        eprintln!("[{name}] pose stream ended");
                        shared.set_processing(false);
                        break;
                    }
                    Err(e) => {
                        eprintln!("[{name}] capture failed: {e}");
                        shared.set_processing(false);
                        continue;
                    }
                };

                // Frames without a hand bypass smoothing: they neither
                // vote nor flush the window.
                if observation.label == GestureLabel::NoHand {
                    shared.set_processing(false);
                    continue;
                }

                let smoothed = window.push(observation);
                shared.set_processing(false);
                if !shared.is_running() {
                    break;
                }

                if !smoothed.label.is_sign() {
                    continue;
                }
                if !gate.should_emit(&smoothed.label, smoothed.timestamp_ms) {
                    continue;
                }

                let sign = smoothed.label.as_str().to_string();
                let category = {
                    let normalized = Vocabulary::normalize_label(&sign);
                    let category = vocabulary.category_of(&normalized);
                    (category != "general").then(|| category.to_string())
                };
                let event = SignEvent {
                    id: shared.next_event_id(),
                    sign,
                    confidence: smoothed.confidence,
                    timestamp_ms: smoothed.timestamp_ms,
                    category,
                    is_sentence: false,
                    original_signs: None,
                };
                if events.send(event).await.is_err() {
                    eprintln!("[{name}] event channel closed");
                    break;
                }
            }

            gate.reset();
            shared.set_running(false);
            shared.set_state(BackendState::Stopped);
        }));

        Ok(())
    }

    fn stop(&mut self) {
        if self.shared.is_running() {
            self.shared.set_running(false);
            self.shared.set_state(BackendState::Stopped);
        }
        self.task = None;
    }

    fn state(&self) -> BackendState {
        self.shared.state()
    }

    fn is_processing(&self) -> bool {
        self.shared.is_processing()
    }
}
