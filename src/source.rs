//! Input sources for the detection backends.
//!
//! Two seams: [`HandPoseSource`] feeds tracked hand landmarks to the
//! rule-based backend, [`FrameSource`] feeds raw RGB frames to the
//! remote and local-model backends. Both have mock implementations so
//! backends are testable without a camera, and a JSONL file source for
//! offline replay.

use crate::error::{Result, SignsubError};
use crate::landmark::{LANDMARK_COUNT, LandmarkFrame};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// One capture step from a hand-pose source.
#[derive(Debug, Clone, PartialEq)]
pub enum PoseCapture {
    /// A hand was tracked in the frame.
    Hand(LandmarkFrame),
    /// The frame was captured but no hand was present.
    NoHand { timestamp_ms: u64 },
}

/// Source of tracked hand landmarks.
///
/// Implementations block per call at most for one frame; the backend
/// supplies the pacing.
pub trait HandPoseSource: Send {
    /// Next capture, or `None` when the stream has ended.
    fn next_capture(&mut self) -> Result<Option<PoseCapture>>;
}

/// A raw RGB frame handed to image-classification backends.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB, 3 bytes per pixel.
    pub pixels: Vec<u8>,
    pub timestamp_ms: u64,
}

impl ImageFrame {
    /// Creates a frame, validating the dimensions and pixel buffer length.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, timestamp_ms: u64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SignsubError::FrameCapture {
                message: format!("invalid frame dimensions {width}x{height}"),
            });
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(SignsubError::FrameCapture {
                message: format!(
                    "pixel buffer length {} does not match {}x{} RGB",
                    pixels.len(),
                    width,
                    height
                ),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            timestamp_ms,
        })
    }

    /// RGB value at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ]
    }
}

/// Source of raw video frames.
pub trait FrameSource: Send {
    /// Captures one frame at the requested dimensions, or `None` when
    /// the stream has ended.
    fn capture_frame(&mut self, width: u32, height: u32) -> Result<Option<ImageFrame>>;
}

/// Mock hand-pose source for testing.
#[derive(Debug, Clone, Default)]
pub struct MockPoseSource {
    captures: Vec<PoseCapture>,
    cursor: usize,
    should_fail: bool,
    error_message: String,
}

impl MockPoseSource {
    /// Create a mock source that immediately reports end of stream.
    pub fn new() -> Self {
        Self {
            captures: Vec::new(),
            cursor: 0,
            should_fail: false,
            error_message: "mock pose error".to_string(),
        }
    }

    /// Configure the mock to replay the given captures in order.
    pub fn with_captures(mut self, captures: Vec<PoseCapture>) -> Self {
        self.captures = captures;
        self
    }

    /// Configure the mock to fail on every capture.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }
}

impl HandPoseSource for MockPoseSource {
    fn next_capture(&mut self) -> Result<Option<PoseCapture>> {
        if self.should_fail {
            return Err(SignsubError::PoseSource {
                message: self.error_message.clone(),
            });
        }
        let capture = self.captures.get(self.cursor).cloned();
        if capture.is_some() {
            self.cursor += 1;
        }
        Ok(capture)
    }
}

/// Mock frame source for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFrameSource {
    frames: Vec<ImageFrame>,
    cursor: usize,
    should_fail: bool,
}

impl MockFrameSource {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            cursor: 0,
            should_fail: false,
        }
    }

    /// Configure the mock to replay the given frames in order.
    pub fn with_frames(mut self, frames: Vec<ImageFrame>) -> Self {
        self.frames = frames;
        self
    }

    /// Configure the mock to fail on every capture.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// A uniformly colored test frame.
    pub fn solid_frame(width: u32, height: u32, rgb: [u8; 3], timestamp_ms: u64) -> ImageFrame {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgb);
        }
        ImageFrame {
            width,
            height,
            pixels,
            timestamp_ms,
        }
    }
}

impl FrameSource for MockFrameSource {
    fn capture_frame(&mut self, _width: u32, _height: u32) -> Result<Option<ImageFrame>> {
        if self.should_fail {
            return Err(SignsubError::FrameCapture {
                message: "mock frame error".to_string(),
            });
        }
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }
}

/// One line of a landmark replay file.
///
/// `points` absent means the frame had no tracked hand.
#[derive(Debug, Serialize, Deserialize)]
pub struct PoseRecord {
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<[f32; 3]>>,
}

/// Replays landmark captures from a JSON-lines reader.
///
/// Each line is one [`PoseRecord`]. Blank lines are skipped.
pub struct JsonlPoseSource<R: BufRead + Send> {
    reader: R,
}

impl<R: BufRead + Send> JsonlPoseSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead + Send> HandPoseSource for JsonlPoseSource<R> {
    fn next_capture(&mut self) -> Result<Option<PoseCapture>> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self.reader.read_line(&mut line)?;
            if read == 0 {
                return Ok(None);
            }
            if line.trim().is_empty() {
                continue;
            }
            let record: PoseRecord = serde_json::from_str(line.trim())?;
            let Some(points) = record.points else {
                return Ok(Some(PoseCapture::NoHand {
                    timestamp_ms: record.timestamp_ms,
                }));
            };
            if points.len() != LANDMARK_COUNT {
                return Err(SignsubError::PoseSource {
                    message: format!(
                        "expected {} landmarks per frame, got {}",
                        LANDMARK_COUNT,
                        points.len()
                    ),
                });
            }
            let mut array = [[0.0f32; 3]; LANDMARK_COUNT];
            array.copy_from_slice(&points);
            return Ok(Some(PoseCapture::Hand(LandmarkFrame::new(
                array,
                record.timestamp_ms,
            ))));
        }
    }
}
