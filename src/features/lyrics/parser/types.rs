//! Lyrics data types
//!
//! Times are signed milliseconds so an `[offset: ...]` tag can move lines
//! before the start of the track.

use serde::{Deserialize, Serialize};

use crate::utils::format_lrc_time;

/// Milliseconds on the playback timeline
pub type Millis = i64;

/// Metadata tag from a `[key: value]` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LrcTag {
    pub tag: String,
    pub value: String,
}

/// A single timed line of lyrics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LrcLine {
    /// Formatted timestamp (`mm:ss.xx`), kept in sync with `time_in_ms`
    pub time: String,
    /// Absolute start offset in milliseconds
    pub time_in_ms: Millis,
    /// Milliseconds until the next line starts; `None` is unbounded
    pub duration: Option<Millis>,
    /// Lyric text, empty for instrumental gaps
    pub text: String,
}

impl LrcLine {
    /// Build a line with its `time` string derived from `time_in_ms`
    #[allow(dead_code)]
    pub fn new(time_in_ms: Millis, duration: Option<Millis>, text: impl Into<String>) -> Self {
        Self {
            time: format_lrc_time(time_in_ms),
            time_in_ms,
            duration,
            text: text.into(),
        }
    }

    /// Check if the line is blank (empty or whitespace only)
    pub fn is_blank(&self) -> bool {
        is_blank(&self.text)
    }

    /// End of the line, `None` when the duration is unbounded
    pub fn end_ms(&self) -> Option<Millis> {
        self.duration.map(|d| self.time_in_ms + d)
    }

    /// Whether `time` falls within `[start, start + duration)`
    pub fn contains(&self, time: Millis) -> bool {
        time >= self.time_in_ms && self.end_ms().is_none_or(|end| time < end)
    }
}

/// Parsed lyrics document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Lrc {
    pub tags: Vec<LrcTag>,
    pub lines: Vec<LrcLine>,
}

impl Lrc {
    /// First value of the named tag
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.tag == name)
            .map(|t| t.value.as_str())
    }

    /// Whether any timed line was found
    pub fn is_synced(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// Blank text represents an instrumental or silent passage
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
