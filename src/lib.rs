//! signsub - Sign language detection to live subtitles
//!
//! Classifies hand gestures from tracked landmarks or captured frames
//! and assembles the recognized signs into timed subtitle entries.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod backend;
pub mod buffer;
pub mod classifier;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod event;
pub mod landmark;
pub mod pipeline;
pub mod sentence;
pub mod smoothing;
pub mod source;
pub mod subtitle;
pub mod vocab;

// Core seams (source → backend → pipeline)
pub use backend::local_model::InferenceModel;
pub use backend::remote::RemoteClassifier;
pub use backend::{BackendState, DetectionBackend};
pub use source::{FrameSource, HandPoseSource};

// Pipeline
pub use pipeline::{DetectionPipeline, PipelineBuilder, PipelineOutput};

// Records
pub use event::{SignEvent, SubtitleEntry};

// Error handling
pub use error::{Result, SignsubError};

// Config
pub use config::{BackendMode, Config};

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
