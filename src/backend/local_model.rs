//! Local image-model detection backend.
//!
//! Runs a small classification model over captured frames. The model
//! itself sits behind a trait; this module owns the preprocessing
//! (resize + normalize), the label list loaded from a metadata file,
//! and the capture loop.

use crate::backend::{BackendShared, BackendState, DetectionBackend};
use crate::defaults;
use crate::error::{Result, SignsubError};
use crate::event::SignEvent;
use crate::source::{FrameSource, ImageFrame};
use crate::vocab::Vocabulary;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Seam over the classification model.
///
/// Allows swapping implementations (real model vs mock).
pub trait InferenceModel: Send + Sync {
    /// Runs the model over a preprocessed input tensor and returns one
    /// score per class.
    fn infer(&self, input: &[f32]) -> Result<Vec<f32>>;

    /// Model name for logs.
    fn model_name(&self) -> &str;
}

/// Mock model for testing.
#[derive(Debug, Clone)]
pub struct MockInferenceModel {
    scores: Vec<f32>,
    should_fail: bool,
}

impl MockInferenceModel {
    /// Create a mock returning uniform scores over two classes.
    pub fn new() -> Self {
        Self {
            scores: vec![0.5, 0.5],
            should_fail: false,
        }
    }

    /// Configure the mock to return specific class scores.
    pub fn with_scores(mut self, scores: Vec<f32>) -> Self {
        self.scores = scores;
        self
    }

    /// Configure the mock to fail on infer.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockInferenceModel {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceModel for MockInferenceModel {
    fn infer(&self, _input: &[f32]) -> Result<Vec<f32>> {
        if self.should_fail {
            return Err(SignsubError::ModelInference {
                message: "mock inference failure".to_string(),
            });
        }
        Ok(self.scores.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// Resizes a frame to the model's square input and scales to [0,1].
///
/// Nearest-neighbor is enough here: the classifier was trained on webcam
/// frames and is insensitive to resampling quality. A frame with a zero
/// dimension has no pixels to sample and yields an empty tensor.
pub fn preprocess(frame: &ImageFrame, input_size: u32) -> Vec<f32> {
    if frame.width == 0 || frame.height == 0 {
        return Vec::new();
    }
    let mut input = Vec::with_capacity((input_size * input_size * 3) as usize);
    for y in 0..input_size {
        let src_y = (y * frame.height / input_size).min(frame.height - 1);
        for x in 0..input_size {
            let src_x = (x * frame.width / input_size).min(frame.width - 1);
            let [r, g, b] = frame.pixel(src_x, src_y);
            input.push(r as f32 / 255.0);
            input.push(g as f32 / 255.0);
            input.push(b as f32 / 255.0);
        }
    }
    input
}

/// Index and score of the best class.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

#[derive(Debug, Deserialize)]
struct ModelMetadata {
    labels: Vec<String>,
}

/// Loads the class label list from a model metadata JSON file.
pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(SignsubError::ModelNotFound {
            path: path.display().to_string(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    let metadata: ModelMetadata = serde_json::from_str(&text)?;
    Ok(metadata.labels)
}

/// Loads labels, falling back to the built-in list on any failure.
pub fn load_labels_or_fallback(path: Option<&Path>) -> Vec<String> {
    let fallback = || {
        defaults::FALLBACK_LABELS
            .iter()
            .map(|s| s.to_string())
            .collect()
    };
    let Some(path) = path else {
        return fallback();
    };
    match load_labels(path) {
        Ok(labels) if !labels.is_empty() => labels,
        Ok(_) => {
            eprintln!(
                "[local-model] metadata {} has no labels, using fallback list",
                path.display()
            );
            fallback()
        }
        Err(e) => {
            eprintln!(
                "[local-model] failed to load metadata {}: {e}, using fallback list",
                path.display()
            );
            fallback()
        }
    }
}

/// Local-model detection backend.
pub struct LocalModelBackend {
    model: Arc<dyn InferenceModel>,
    source: Arc<Mutex<Box<dyn FrameSource>>>,
    vocabulary: Arc<Vocabulary>,
    metadata_path: Option<PathBuf>,
    labels: Arc<Vec<String>>,
    shared: Arc<BackendShared>,
    tick_ms: u64,
    task: Option<JoinHandle<()>>,
}

impl LocalModelBackend {
    pub fn new(model: Arc<dyn InferenceModel>, source: Box<dyn FrameSource>) -> Self {
        Self {
            model,
            source: Arc::new(Mutex::new(source)),
            vocabulary: Arc::new(Vocabulary::new()),
            metadata_path: None,
            labels: Arc::new(Vec::new()),
            shared: BackendShared::new(),
            tick_ms: defaults::LOCAL_MODEL_TICK_MS,
            task: None,
        }
    }

    /// Sets the metadata file the label list is loaded from.
    pub fn with_metadata_path(mut self, path: PathBuf) -> Self {
        self.metadata_path = Some(path);
        self
    }

    /// Overrides the inference interval; used by tests to run fast.
    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    /// The loaded class labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[async_trait]
impl DetectionBackend for LocalModelBackend {
    fn name(&self) -> &'static str {
        "local-model"
    }

    async fn initialize(&mut self) -> Result<()> {
        self.shared.set_state(BackendState::Initializing);
        self.labels = Arc::new(load_labels_or_fallback(self.metadata_path.as_deref()));
        eprintln!(
            "[{}] model '{}' ready with {} labels",
            self.name(),
            self.model.model_name(),
            self.labels.len()
        );
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

        let model = Arc::clone(&self.model);
        let source = Arc::clone(&self.source);
        let vocabulary = Arc::clone(&self.vocabulary);
        let labels = Arc::clone(&self.labels);
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

                if frame.width == 0 || frame.height == 0 {
                    eprintln!(
                        "[{name}] skipping {}x{} frame",
                        frame.width, frame.height
                    );
                    continue;
                }

                shared.set_processing(true);
                let input = preprocess(&frame, defaults::MODEL_INPUT_SIZE);
                let result = model.infer(&input);
                shared.set_processing(false);
                if !shared.is_running() {
                    break;
                }

                let scores = match result {
                    Ok(scores) => scores,
                    Err(e) => {
                        eprintln!("[{name}] inference failed: {e}");
                        continue;
                    }
                };

                let Some((best, score)) = argmax(&scores) else {
                    continue;
                };
                let Some(label) = labels.get(best) else {
                    eprintln!(
                        "[{name}] model produced class {best} outside the {} known labels",
                        labels.len()
                    );
                    continue;
                };

                let category = {
                    let word = Vocabulary::normalize_label(label);
                    let category = vocabulary.category_of(&word);
                    (category != "general").then(|| category.to_string())
                };
                let event = SignEvent {
                    id: shared.next_event_id(),
                    sign: label.clone(),
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
    use std::io::Write;

    #[test]
    fn test_preprocess_dimensions_and_scale() {
        let frame = MockFrameSource::solid_frame(8, 6, [255, 0, 128], 0);
        let input = preprocess(&frame, 4);
        assert_eq!(input.len(), 4 * 4 * 3);
        assert!((input[0] - 1.0).abs() < 1e-6);
        assert_eq!(input[1], 0.0);
        assert!((input[2] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_upscales_small_frames() {
        let frame = MockFrameSource::solid_frame(2, 2, [10, 10, 10], 0);
        let input = preprocess(&frame, 8);
        assert_eq!(input.len(), 8 * 8 * 3);
    }

    #[test]
    fn test_preprocess_zero_dimension_frame_is_empty() {
        let frame = ImageFrame {
            width: 0,
            height: 0,
            pixels: Vec::new(),
            timestamp_ms: 0,
        };
        assert!(preprocess(&frame, 224).is_empty());
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_load_labels_from_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"labels": ["hello", "bye"]}}"#).unwrap();

        let labels = load_labels(&path).unwrap();
        assert_eq!(labels, vec!["hello".to_string(), "bye".to_string()]);
    }

    #[test]
    fn test_load_labels_missing_file() {
        let err = load_labels(Path::new("/nonexistent/metadata.json")).unwrap_err();
        assert!(matches!(err, SignsubError::ModelNotFound { .. }));
    }

    #[test]
    fn test_fallback_labels_on_bad_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, "not json").unwrap();

        let labels = load_labels_or_fallback(Some(&path));
        assert_eq!(labels.len(), defaults::FALLBACK_LABELS.len());
        assert_eq!(labels[0], "hello");
    }

    #[test]
    fn test_fallback_labels_without_path() {
        let labels = load_labels_or_fallback(None);
        assert_eq!(labels.len(), defaults::FALLBACK_LABELS.len());
    }

    #[tokio::test]
    async fn test_emits_argmax_label() {
        // Class 1 ("how are you") wins.
        let model = MockInferenceModel::new().with_scores(vec![0.1, 0.8, 0.1]);
        let frames = vec![
            MockFrameSource::solid_frame(4, 4, [0, 0, 0], 1000),
            MockFrameSource::solid_frame(4, 4, [0, 0, 0], 2000),
        ];
        let source = MockFrameSource::new().with_frames(frames);

        let mut backend =
            LocalModelBackend::new(Arc::new(model), Box::new(source)).with_tick_ms(1);
        backend.initialize().await.unwrap();
        assert_eq!(backend.labels().len(), defaults::FALLBACK_LABELS.len());

        let (tx, mut rx) = mpsc::channel(16);
        backend.start(tx).await.unwrap();

        let event = rx.recv().await.expect("expected an event");
        assert_eq!(event.sign, "how are you");
        assert!((event.confidence - 0.8).abs() < 1e-6);
        assert_eq!(event.timestamp_ms, 1000);

        while rx.recv().await.is_some() {}
        assert_eq!(backend.state(), BackendState::Stopped);
    }

    #[tokio::test]
    async fn test_zero_dimension_frames_are_skipped() {
        let model = MockInferenceModel::new().with_scores(vec![0.8, 0.1]);
        let empty = ImageFrame {
            width: 0,
            height: 0,
            pixels: Vec::new(),
            timestamp_ms: 500,
        };
        let frames = vec![empty, MockFrameSource::solid_frame(4, 4, [0, 0, 0], 1000)];
        let source = MockFrameSource::new().with_frames(frames);

        let mut backend =
            LocalModelBackend::new(Arc::new(model), Box::new(source)).with_tick_ms(1);
        backend.initialize().await.unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        backend.start(tx).await.unwrap();

        // The empty frame is logged and skipped; only the real frame
        // produces an event.
        let event = rx.recv().await.expect("expected an event");
        assert_eq!(event.timestamp_ms, 1000);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_inference_failures_are_skipped() {
        let model = MockInferenceModel::new().with_failure();
        let source = MockFrameSource::new()
            .with_frames(vec![MockFrameSource::solid_frame(4, 4, [0, 0, 0], 0)]);

        let mut backend =
            LocalModelBackend::new(Arc::new(model), Box::new(source)).with_tick_ms(1);
        backend.initialize().await.unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        backend.start(tx).await.unwrap();

        assert!(rx.recv().await.is_none());
        assert_eq!(backend.state(), BackendState::Stopped);
    }
}
