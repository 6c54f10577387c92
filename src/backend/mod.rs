//! Detection backends.
//!
//! A backend owns a capture loop: it paces an input source with a tokio
//! interval, classifies each capture, and pushes recognized signs into
//! the pipeline's event channel. Three implementations share the same
//! lifecycle: landmark rules, a remote classification API, and a local
//! image model.

pub mod local_model;
pub mod local_rules;
pub mod remote;

use crate::error::Result;
use crate::event::SignEvent;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tokio::sync::mpsc;

/// Lifecycle state of a detection backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    /// Constructed but `initialize` has not completed.
    Uninitialized,
    /// `initialize` is in progress.
    Initializing,
    /// Initialized and idle.
    Ready,
    /// Capture loop is running.
    Detecting,
    /// Stopped after running; can be started again.
    Stopped,
}

impl BackendState {
    fn as_u8(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Initializing => 1,
            Self::Ready => 2,
            Self::Detecting => 3,
            Self::Stopped => 4,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Initializing,
            2 => Self::Ready,
            3 => Self::Detecting,
            4 => Self::Stopped,
            _ => Self::Uninitialized,
        }
    }
}

/// State shared between a backend handle and its capture task.
#[derive(Debug)]
pub(crate) struct BackendShared {
    state: AtomicU8,
    running: AtomicBool,
    processing: AtomicBool,
    next_event_id: std::sync::atomic::AtomicU64,
}

impl BackendShared {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU8::new(BackendState::Uninitialized.as_u8()),
            running: AtomicBool::new(false),
            processing: AtomicBool::new(false),
            next_event_id: std::sync::atomic::AtomicU64::new(1),
        })
    }

    pub(crate) fn state(&self) -> BackendState {
        BackendState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub(crate) fn set_state(&self, state: BackendState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub(crate) fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_processing(&self, processing: bool) {
        self.processing.store(processing, Ordering::SeqCst);
    }

    pub(crate) fn next_event_id(&self) -> u64 {
        self.next_event_id.fetch_add(1, Ordering::SeqCst)
    }
}

/// A source of recognized sign events.
///
/// Lifecycle: `initialize` once, then `start`/`stop` any number of
/// times. `start` on a backend that is not initialized or is already
/// detecting logs a warning and does nothing. `stop` is synchronous:
/// it prevents further ticks immediately; a classification already in
/// flight finishes but its result is discarded.
#[async_trait]
pub trait DetectionBackend: Send {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Loads whatever the backend needs before it can detect.
    async fn initialize(&mut self) -> Result<()>;

    /// Spawns the capture loop, emitting events into `events`.
    async fn start(&mut self, events: mpsc::Sender<SignEvent>) -> Result<()>;

    /// Stops the capture loop.
    fn stop(&mut self);

    /// Current lifecycle state.
    fn state(&self) -> BackendState;

    /// True while a single classification is in flight.
    fn is_processing(&self) -> bool;

    /// True once `initialize` has completed.
    fn is_initialized(&self) -> bool {
        !matches!(
            self.state(),
            BackendState::Uninitialized | BackendState::Initializing
        )
    }
}
