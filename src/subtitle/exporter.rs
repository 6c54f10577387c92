//! SRT export of finalized subtitle entries.

use crate::event::SubtitleEntry;
use std::fmt::Write;

/// Formats an epoch-millisecond instant as an SRT wall-clock timestamp,
/// `HH:MM:SS,mmm` with the hour wrapped to the day.
fn format_timestamp(epoch_ms: u64) -> String {
    let hours = (epoch_ms / 3_600_000) % 24;
    let minutes = (epoch_ms / 60_000) % 60;
    let seconds = (epoch_ms / 1000) % 60;
    let millis = epoch_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Renders subtitle entries as an SRT document.
///
/// Entries are numbered from 1 in the given order. An empty history
/// renders as an empty string.
pub fn to_srt(entries: &[SubtitleEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n",
            i + 1,
            format_timestamp(entry.start_ms),
            format_timestamp(entry.end_ms),
            entry.text
        );
    }
    out
}
