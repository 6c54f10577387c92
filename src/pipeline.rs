//! Detection pipeline: backend events in, subtitles out.
//!
//! The pipeline owns the single confidence gate, the display history,
//! phrase synthesis over the rolling event buffer, and the subtitle
//! assembler with its silence clock. Backends emit unfiltered events;
//! everything below the gate happens here.

use crate::backend::local_model::{InferenceModel, LocalModelBackend};
use crate::backend::local_rules::LocalRulesBackend;
use crate::backend::remote::{RemoteBackend, RemoteClassifier};
use crate::backend::{BackendState, DetectionBackend};
use crate::buffer::SignEventBuffer;
use crate::config::{BackendMode, Config};
use crate::defaults;
use crate::error::{Result, SignsubError};
use crate::event::{SignEvent, SubtitleEntry};
use crate::sentence;
use crate::source::{FrameSource, HandPoseSource};
use crate::subtitle::SubtitleAssembler;
use crate::vocab::Vocabulary;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Everything a finished pipeline run produced.
#[derive(Debug, Default)]
pub struct PipelineOutput {
    /// Accepted sign events and synthesized sentences, in arrival order.
    pub events: Vec<SignEvent>,
    /// Finalized subtitle entries, oldest first.
    pub subtitles: Vec<SubtitleEntry>,
}

/// Assembles a [`DetectionPipeline`] from a config plus whichever input
/// seams the chosen backend needs.
pub struct PipelineBuilder {
    config: Config,
    pose_source: Option<Box<dyn HandPoseSource>>,
    frame_source: Option<Box<dyn FrameSource>>,
    classifier: Option<Arc<dyn RemoteClassifier>>,
    model: Option<Arc<dyn InferenceModel>>,
}

impl PipelineBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            pose_source: None,
            frame_source: None,
            classifier: None,
            model: None,
        }
    }

    /// Landmark source for the local-rules backend.
    pub fn pose_source(mut self, source: Box<dyn HandPoseSource>) -> Self {
        self.pose_source = Some(source);
        self
    }

    /// Frame source for the remote and local-model backends.
    pub fn frame_source(mut self, source: Box<dyn FrameSource>) -> Self {
        self.frame_source = Some(source);
        self
    }

    /// Overrides the remote classifier (the default is built from the
    /// configured endpoint and API key).
    pub fn classifier(mut self, classifier: Arc<dyn RemoteClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Inference model for the local-model backend.
    pub fn model(mut self, model: Arc<dyn InferenceModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn build(self) -> Result<DetectionPipeline> {
        let backend: Box<dyn DetectionBackend> = match self.config.detection.backend {
            BackendMode::LocalRules => {
                let source = self.pose_source.ok_or_else(|| missing("a hand-pose source"))?;
                Box::new(LocalRulesBackend::new(source))
            }
            BackendMode::Remote => {
                let source = self.frame_source.ok_or_else(|| missing("a frame source"))?;
                let classifier: Arc<dyn RemoteClassifier> = match self.classifier {
                    Some(classifier) => classifier,
                    #[cfg(feature = "remote")]
                    None => Arc::new(http_classifier(&self.config)?),
                    #[cfg(not(feature = "remote"))]
                    None => {
                        return Err(SignsubError::ConfigInvalidValue {
                            key: "detection.backend".to_string(),
                            message: "this build has no remote support".to_string(),
                        });
                    }
                };
                Box::new(RemoteBackend::new(classifier, source))
            }
            BackendMode::LocalModel => {
                let source = self.frame_source.ok_or_else(|| missing("a frame source"))?;
                let model = self.model.ok_or_else(|| missing("an inference model"))?;
                let mut backend = LocalModelBackend::new(model, source);
                if let Some(path) = &self.config.detection.model.metadata_path {
                    backend = backend.with_metadata_path(PathBuf::from(path));
                }
                Box::new(backend)
            }
        };

        Ok(DetectionPipeline {
            backend,
            config: self.config,
            vocabulary: Arc::new(Vocabulary::new()),
        })
    }
}

fn missing(what: &str) -> SignsubError {
    SignsubError::ConfigInvalidValue {
        key: "detection.backend".to_string(),
        message: format!("the configured backend requires {what}"),
    }
}

#[cfg(feature = "remote")]
fn http_classifier(config: &Config) -> Result<crate::backend::remote::HttpClassifier> {
    let endpoint = config.detection.remote.endpoint.as_deref().ok_or_else(|| {
        SignsubError::ConfigInvalidValue {
            key: "detection.remote.endpoint".to_string(),
            message: "the remote backend requires an endpoint".to_string(),
        }
    })?;
    let api_key = config.detection.remote.api_key.as_deref().ok_or_else(|| {
        SignsubError::ConfigInvalidValue {
            key: "detection.remote.api_key".to_string(),
            message: "the remote backend requires an API key".to_string(),
        }
    })?;
    Ok(crate::backend::remote::HttpClassifier::new(endpoint, api_key))
}

/// The live detection pipeline.
pub struct DetectionPipeline {
    backend: Box<dyn DetectionBackend>,
    config: Config,
    vocabulary: Arc<Vocabulary>,
}

impl DetectionPipeline {
    /// Backend lifecycle state, for status display.
    pub fn backend_state(&self) -> BackendState {
        self.backend.state()
    }

    /// Stops the backend's capture loop.
    pub fn stop(&mut self) {
        self.backend.stop();
    }

    /// Runs detection until the backend's input stream ends.
    ///
    /// Initializes and starts the backend, then folds its events into
    /// subtitles. Silence is tracked on the wall clock while subtitle
    /// timestamps follow the event clock, so replayed captures produce
    /// the same entries as live ones.
    pub async fn run(&mut self) -> Result<PipelineOutput> {
        let (tx, mut rx) = mpsc::channel::<SignEvent>(64);
        self.backend.initialize().await?;
        self.backend.start(tx).await?;
        eprintln!(
            "pipeline running with the {} backend (min confidence {})",
            self.backend.name(),
            self.config.detection.min_confidence
        );

        let mut assembler = SubtitleAssembler::with_limits(
            self.config.subtitle.silence_timeout_ms,
            self.config.subtitle.history_capacity,
        );
        let mut buffer = SignEventBuffer::new();
        let mut output = PipelineOutput::default();
        let mut next_id: u64 = 1;
        // (wall-clock deadline, event-clock instant it maps to)
        let mut silence: Option<(tokio::time::Instant, u64)> = None;
        let language = self.config.detection.language;
        let min_confidence = self.config.detection.min_confidence;

        loop {
            let deadline = silence;
            tokio::select! {
                maybe = rx.recv() => {
                    let Some(event) = maybe else { break };
                    if event.confidence < min_confidence {
                        continue;
                    }

                    let mut event = event;
                    event.id = next_id;
                    next_id += 1;

                    let translated = self
                        .vocabulary
                        .translate(&event.sign, language)
                        .to_string();
                    if assembler.accept(&translated, event.confidence, event.timestamp_ms) {
                        silence = Some((
                            tokio::time::Instant::now()
                                + Duration::from_millis(self.config.subtitle.silence_timeout_ms),
                            event.timestamp_ms + self.config.subtitle.silence_timeout_ms,
                        ));
                    }

                    buffer.push(event.clone());
                    push_capped(&mut output.events, event);

                    if buffer.is_sentence_ready() {
                        let raw = buffer.drain();
                        if let Some(mut sentence) = sentence::synthesize_sentence(0, &raw) {
                            sentence.id = next_id;
                            next_id += 1;
                            eprintln!("synthesized phrase: {}", sentence.sign);
                            push_capped(&mut output.events, sentence);
                        }
                    }
                }
                _ = async {
                    match deadline {
                        Some((instant, _)) => tokio::time::sleep_until(instant).await,
                        None => std::future::pending().await,
                    }
                } => {
                    if let Some((_, event_clock_ms)) = deadline
                        && let Some(entry) = assembler.finalize(event_clock_ms)
                    {
                        eprintln!("subtitle finalized: {}", entry.text);
                    }
                    silence = None;
                }
            }
        }

        // The stream ended; flush whatever was still accumulating.
        if assembler.has_pending()
            && let Some((_, event_clock_ms)) = silence
            && let Some(entry) = assembler.finalize(event_clock_ms)
        {
            eprintln!("subtitle finalized at end of stream: {}", entry.text);
        }

        output.subtitles = assembler.history().cloned().collect();
        self.backend.stop();
        Ok(output)
    }
}

fn push_capped(events: &mut Vec<SignEvent>, event: SignEvent) {
    if events.len() == defaults::DISPLAY_HISTORY_CAPACITY {
        events.remove(0);
    }
    events.push(event);
}
