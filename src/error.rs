//! Error types for signsub.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignsubError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Frame acquisition errors
    #[error("Frame capture failed: {message}")]
    FrameCapture { message: String },

    #[error("Pose source error: {message}")]
    PoseSource { message: String },

    // Backend errors
    #[error("Detection backend not initialized: {message}")]
    BackendNotInitialized { message: String },

    #[error("Remote classification failed: {message}")]
    RemoteClassification { message: String },

    #[error("Model file not found at {path}")]
    ModelNotFound { path: String },

    #[error("Model inference failed: {message}")]
    ModelInference { message: String },

    // Serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SignsubError>;
