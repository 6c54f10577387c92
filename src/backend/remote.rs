//! Remote-API detection backend.
//!
//! Ships captured frames to an image-classification endpoint and maps
//! the returned labels onto the word vocabulary. The tick is slow by
//! design and requests never queue: the loop awaits each classification
//! before the next tick, and missed ticks are skipped outright.

use crate::backend::{BackendShared, BackendState, DetectionBackend};
use crate::defaults;
use crate::error::Result;
use crate::event::SignEvent;
use crate::source::{FrameSource, ImageFrame};
use crate::vocab::Vocabulary;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// One raw prediction from the classification endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    pub label: String,
    pub score: f32,
}

/// Seam over the classification endpoint.
///
/// Allows swapping implementations (real HTTP vs mock).
#[async_trait]
pub trait RemoteClassifier: Send + Sync {
    /// Classifies one frame into labeled predictions.
    async fn classify(&self, frame: &ImageFrame) -> Result<Vec<RawPrediction>>;
}

/// Extracts predictions from the endpoint's response JSON.
///
/// Accepts either an array of `{label, score}` objects or a single
/// `{label, confidence}` object; unrecognized shapes yield no
/// predictions.
pub fn parse_predictions(value: &serde_json::Value) -> Vec<RawPrediction> {
    fn one(entry: &serde_json::Value) -> Option<RawPrediction> {
        let label = entry.get("label").and_then(|v| v.as_str())?;
        let score = entry
            .get("score")
            .or_else(|| entry.get("confidence"))
            .and_then(|v| v.as_f64())?;
        Some(RawPrediction {
            label: label.to_string(),
            score: score as f32,
        })
    }

    match value {
        serde_json::Value::Array(entries) => entries.iter().filter_map(one).collect(),
        obj @ serde_json::Value::Object(_) => one(obj).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// HTTP classifier against a hosted inference endpoint.
#[cfg(feature = "remote")]
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[cfg(feature = "remote")]
impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[cfg(feature = "remote")]
#[async_trait]
impl RemoteClassifier for HttpClassifier {
    async fn classify(&self, frame: &ImageFrame) -> Result<Vec<RawPrediction>> {
        use crate::error::SignsubError;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(frame.pixels.clone())
            .send()
            .await
            .map_err(|e| SignsubError::RemoteClassification {
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SignsubError::RemoteClassification {
                message: format!("endpoint returned status {}", response.status()),
            });
        }

        let value: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| SignsubError::RemoteClassification {
                    message: format!("invalid response body: {e}"),
                })?;
        Ok(parse_predictions(&value))
    }
}

/// Mock classifier for testing.
#[derive(Clone, Default)]
pub struct MockRemoteClassifier {
    predictions: Vec<RawPrediction>,
    should_fail: bool,
    delay_ms: u64,
    calls: Arc<std::sync::atomic::AtomicUsize>,
}

impl MockRemoteClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to return the given predictions on every call.
    pub fn with_predictions(mut self, predictions: Vec<RawPrediction>) -> Self {
        self.predictions = predictions;
        self
    }

    /// Configure the mock to fail on every call.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure a per-call artificial latency.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Number of classification calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteClassifier for MockRemoteClassifier {
    async fn classify(&self, _frame: &ImageFrame) -> Result<Vec<RawPrediction>> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if self.should_fail {
            return Err(crate::error::SignsubError::RemoteClassification {
                message: "mock classification failure".to_string(),
            });
        }
        Ok(self.predictions.clone())
    }
}

/// Remote-API detection backend.
pub struct RemoteBackend {
    classifier: Arc<dyn RemoteClassifier>,
    source: Arc<Mutex<Box<dyn FrameSource>>>,
    vocabulary: Arc<Vocabulary>,
    shared: Arc<BackendShared>,
    tick_ms: u64,
    task: Option<JoinHandle<()>>,
}

impl RemoteBackend {
    pub fn new(classifier: Arc<dyn RemoteClassifier>, source: Box<dyn FrameSource>) -> Self {
        Self {
            classifier,
            source: Arc::new(Mutex::new(source)),
            vocabulary: Arc::new(Vocabulary::new()),
            shared: BackendShared::new(),
            tick_ms: defaults::REMOTE_TICK_MS,
            task: None,
        }
    }

    /// Overrides the request interval; used by tests to run fast.
    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    /// Maps raw predictions onto the vocabulary and picks the best.
    ///
    /// Labels outside the vocabulary are dropped.
    fn best_vocabulary_match(
        vocabulary: &Vocabulary,
        predictions: &[RawPrediction],
    ) -> Option<(String, f32)> {
        predictions
            .iter()
            .filter_map(|p| {
                let word = Vocabulary::normalize_label(&p.label);
                vocabulary.contains(&word).then_some((word, p.score))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[async_trait]
impl DetectionBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn initialize(&mut self) -> Result<()> {
        self.shared.set_state(BackendState::Initializing);
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

        let classifier = Arc::clone(&self.classifier);
        let source = Arc::clone(&self.source);
        let vocabulary = Arc::clone(&self.vocabulary);
        let shared = Arc::clone(&self.shared);
        let tick_ms = self.tick_ms;
        let name = self.name();

        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if !shared.is_running() {
                    break;
                }

                let frame = {
                    let Ok(mut source) = source.lock() else {
                        eprintln!("[{name}] frame source lock poisoned");
                        break;
                    };
                    source.capture_frame(defaults::CAPTURE_WIDTH, defaults::CAPTURE_HEIGHT)
                };
                let frame = match frame {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        eprintln!("[{name}] frame stream ended");
                        break;
                    }
                    Err(e) => {
                        eprintln!("[{name}] frame capture failed: {e}");
                        continue;
                    }
                };

                // Sequential await: at most one request in flight, and a
                // slow response causes skipped ticks, not a queue.
                shared.set_processing(true);
                let result = classifier.classify(&frame).await;
                shared.set_processing(false);
                if !shared.is_running() {
                    // Stopped while the request was in flight.
                    break;
                }

                let predictions = match result {
                    Ok(predictions) => predictions,
                    Err(e) => {
                        eprintln!("[{name}] classification failed: {e}");
                        continue;
                    }
                };

                let Some((word, score)) =
                    Self::best_vocabulary_match(&vocabulary, &predictions)
                else {
                    continue;
                };

                let category = {
                    let category = vocabulary.category_of(&word);
                    (category != "general").then(|| category.to_string())
                };
                let event = SignEvent {
                    id: shared.next_event_id(),
                    sign: word,
                    confidence: score,
                    timestamp_ms: frame.timestamp_ms,
                    category,
                    is_sentence: false,
                    original_signs: None,
                };
                if events.send(event).await.is_err() {
                    eprintln!("[{name}] event channel closed");
                    break;
                }
            }

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockFrameSource;

    fn frames(n: usize) -> Vec<ImageFrame> {
        (0..n)
            .map(|i| MockFrameSource::solid_frame(4, 4, [0, 0, 0], i as u64 * 1000))
            .collect()
    }

    fn prediction(label: &str, score: f32) -> RawPrediction {
        RawPrediction {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn test_parse_predictions_array() {
        let value = serde_json::json!([
            {"label": "Hello!", "score": 0.91},
            {"label": "water", "score": 0.55}
        ]);
        let predictions = parse_predictions(&value);
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].label, "Hello!");
        assert!((predictions[0].score - 0.91).abs() < 1e-6);
    }

    #[test]
    fn test_parse_predictions_single_object() {
        let value = serde_json::json!({"label": "hello", "confidence": 0.8});
        let predictions = parse_predictions(&value);
        assert_eq!(predictions.len(), 1);
        assert!((predictions[0].score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_parse_predictions_tolerates_garbage() {
        assert!(parse_predictions(&serde_json::json!("nope")).is_empty());
        assert!(parse_predictions(&serde_json::json!([{"score": 0.5}])).is_empty());
    }

    #[test]
    fn test_best_vocabulary_match_filters_and_ranks() {
        let vocab = Vocabulary::new();
        let predictions = vec![
            prediction("Zebra crossing", 0.99),
            prediction("Hello!", 0.7),
            prediction("water, glass of", 0.8),
        ];
        let (word, score) = RemoteBackend::best_vocabulary_match(&vocab, &predictions).unwrap();
        assert_eq!(word, "water");
        assert!((score - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_emits_vocabulary_events() {
        let classifier =
            MockRemoteClassifier::new().with_predictions(vec![prediction("hello", 0.9)]);
        let source = MockFrameSource::new().with_frames(frames(3));

        let mut backend =
            RemoteBackend::new(Arc::new(classifier.clone()), Box::new(source)).with_tick_ms(1);
        backend.initialize().await.unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        backend.start(tx).await.unwrap();

        let event = rx.recv().await.expect("expected an event");
        assert_eq!(event.sign, "hello");
        assert_eq!(event.category.as_deref(), Some("greetings"));

        while rx.recv().await.is_some() {}
        assert_eq!(backend.state(), BackendState::Stopped);
        assert_eq!(classifier.calls(), 3);
    }

    #[tokio::test]
    async fn test_classification_failures_are_skipped() {
        let classifier = MockRemoteClassifier::new().with_failure();
        let source = MockFrameSource::new().with_frames(frames(3));

        let mut backend =
            RemoteBackend::new(Arc::new(classifier), Box::new(source)).with_tick_ms(1);
        backend.initialize().await.unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        backend.start(tx).await.unwrap();

        // Every tick fails, so the channel closes without an event.
        assert!(rx.recv().await.is_none());
        assert_eq!(backend.state(), BackendState::Stopped);
    }

    #[tokio::test]
    async fn test_stop_discards_in_flight_response() {
        let classifier = MockRemoteClassifier::new()
            .with_predictions(vec![prediction("hello", 0.9)])
            .with_delay_ms(200);
        let source = MockFrameSource::new().with_frames(frames(100));

        let mut backend =
            RemoteBackend::new(Arc::new(classifier), Box::new(source)).with_tick_ms(1);
        backend.initialize().await.unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        backend.start(tx).await.unwrap();

        // Stop while the first (slow) classification is in flight.
        tokio::time::sleep(Duration::from_millis(50)).await;
        backend.stop();

        assert!(rx.recv().await.is_none());
    }
}
