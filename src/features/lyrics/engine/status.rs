//! Playback position mapping
//!
//! Classifies each line relative to the playback time:
//! - previous: already started and not the current line
//! - current: the line whose `[start, start + duration)` contains the time
//! - upcoming: starts after the playback time
//!
//! At most one line is current. When ranges overlap, the most recently
//! started containing line wins.

use serde::Serialize;

use crate::features::lyrics::{LrcLine, Millis};

/// Line state relative to the playback position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    Previous,
    Current,
    Upcoming,
}

/// Index of the line containing `time`
pub fn current_index(lines: &[LrcLine], time: Millis) -> Option<usize> {
    lines.iter().rposition(|line| line.contains(time))
}

/// Classify a single line given the already-resolved current index
pub fn classify(lines: &[LrcLine], index: usize, current: Option<usize>, time: Millis) -> LineStatus {
    if current == Some(index) {
        return LineStatus::Current;
    }
    match lines.get(index) {
        Some(line) if line.time_in_ms > time => LineStatus::Upcoming,
        _ => LineStatus::Previous,
    }
}

/// Statuses for every line at `time`
pub fn line_statuses(lines: &[LrcLine], time: Millis) -> Vec<LineStatus> {
    let current = current_index(lines, time);
    (0..lines.len())
        .map(|i| classify(lines, i, current, time))
        .collect()
}

/// Fractional progress through a line, clamped to `[0, 1]`
///
/// Unbounded and zero-length lines report 0.
pub fn line_progress(line: &LrcLine, time: Millis) -> f64 {
    match line.duration {
        Some(duration) if duration > 0 => {
            (time.saturating_sub(line.time_in_ms) as f64 / duration as f64).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

/// Index of the next line to start after `time`, used while nothing is current
pub fn next_line_index(lines: &[LrcLine], time: Millis) -> Option<usize> {
    lines.iter().position(|line| line.time_in_ms > time)
}
