//! Subtitle assembly and export.

pub mod assembler;
pub mod exporter;

pub use assembler::SubtitleAssembler;
pub use exporter::to_srt;
