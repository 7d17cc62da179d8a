//! Line repair pipeline
//!
//! Post-processing applied to a parsed line sequence before display:
//! - Consecutive blank lines collapse into one covering the whole run
//! - A leading blank line covers silence before the first lyric
//! - A trailing blank line covers silence after the last lyric

use super::types::{LrcLine, Millis, is_blank};
use crate::utils::format_lrc_time;

/// Core fields shared by every synced line type
pub trait SyncedLine: Clone {
    fn text(&self) -> &str;
    fn set_text(&mut self, text: String);
    fn time_in_ms(&self) -> Millis;
    fn set_time_in_ms(&mut self, time: Millis);
    fn duration(&self) -> Option<Millis>;
    fn set_duration(&mut self, duration: Option<Millis>);

    fn is_blank(&self) -> bool {
        is_blank(self.text())
    }
}

impl SyncedLine for LrcLine {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }

    fn time_in_ms(&self) -> Millis {
        self.time_in_ms
    }

    fn set_time_in_ms(&mut self, time: Millis) {
        self.time_in_ms = time;
        self.time = format_lrc_time(time);
    }

    fn duration(&self) -> Option<Millis> {
        self.duration
    }

    fn set_duration(&mut self, duration: Option<Millis>) {
        self.duration = duration;
    }
}

/// How the synthetic leading line spans the initial silence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingMode {
    /// Duration equals the first line's start time
    #[default]
    Span,
    /// Zero-duration marker at time 0
    #[allow(dead_code)]
    Zero,
}

/// Where the synthetic trailing line is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingStrategy {
    /// Zero-duration line at the last line's end
    #[allow(dead_code)]
    LastEnd,
    /// Split the remaining silence at its midpoint
    Midpoint,
}

/// Default threshold before a leading padding line is added
pub const LEADING_PADDING_THRESHOLD_MS: Millis = 300;

fn end_of<T: SyncedLine>(line: &T) -> Option<Millis> {
    line.duration().map(|d| line.time_in_ms() + d)
}

/// Clone `template` into a blank line at `time` with the given duration
fn blank_from<T: SyncedLine>(template: &T, time: Millis, duration: Option<Millis>) -> T {
    let mut line = template.clone();
    line.set_text(String::new());
    line.set_time_in_ms(time);
    line.set_duration(duration);
    line
}

/// Merge runs of blank lines into the first line of each run
///
/// The merged line ends where the latest line of the run ends, so total
/// coverage of the run is preserved.
pub fn merge_consecutive_empty_lines<T: SyncedLine>(input: Vec<T>) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(input.len());

    for line in input {
        if line.is_blank() {
            if let Some(prev) = merged.last_mut() {
                if prev.is_blank() {
                    let new_end = match (end_of(prev), end_of(&line)) {
                        (Some(a), Some(b)) => Some(a.max(b)),
                        _ => None,
                    };
                    let start = prev.time_in_ms();
                    prev.set_duration(new_end.map(|end| end - start));
                    continue;
                }
            }
        }
        merged.push(line);
    }

    merged
}

/// Prepend a blank line at 0 when the first line starts after `threshold_ms`
pub fn ensure_leading_padding_empty_line<T: SyncedLine>(
    mut input: Vec<T>,
    threshold_ms: Millis,
    mode: PaddingMode,
) -> Vec<T> {
    let Some(first) = input.first() else {
        return input;
    };
    if first.time_in_ms() <= threshold_ms {
        return input;
    }

    let duration = match mode {
        PaddingMode::Span => first.time_in_ms(),
        PaddingMode::Zero => 0,
    };
    let leading = blank_from(first, 0, Some(duration));
    input.insert(0, leading);
    input
}

/// Append a blank line covering silence after the last lyric
///
/// No-op when the last line is already blank. `Midpoint` needs the song
/// length and does nothing when the last line already reaches it.
pub fn ensure_trailing_empty_line<T: SyncedLine>(
    mut input: Vec<T>,
    strategy: TrailingStrategy,
    song_end_ms: Option<Millis>,
) -> Vec<T> {
    let Some(last) = input.last_mut() else {
        return input;
    };
    if last.is_blank() {
        return input;
    }

    let last_end = end_of(last).unwrap_or(last.time_in_ms());

    let trailing = match strategy {
        TrailingStrategy::LastEnd => blank_from(last, last_end, Some(0)),
        TrailingStrategy::Midpoint => {
            let Some(song_end) = song_end_ms else {
                return input;
            };
            if last_end >= song_end {
                return input;
            }

            let midpoint = ((last_end as i128 + song_end as i128).div_euclid(2)) as Millis;
            last.set_duration(Some(midpoint - last.time_in_ms()));
            blank_from(last, midpoint, Some(song_end - midpoint))
        }
    };

    input.push(trailing);
    input
}
