//! Synced lyrics engine
//!
//! Drives the per-tick display state of a track's lyrics from the playback
//! position.
//!
//! ## Key Components
//!
//! - `LyricsEngine`: Owns the repaired line sequence and derives line status,
//!   placeholder steps, word reveals and the scroll target on every tick
//! - `status`: Previous/current/upcoming classification
//! - `InterludeDots`: Placeholder steps for blank lines
//! - `word_splitter`: Staggered word reveal
//! - `scroll`: Auto-scroll timing
//!
//! Every computation is synchronous and idempotent: the same lines, settings
//! and playback time always produce the same state.

pub mod interlude_dots;
pub mod scroll;
pub mod status;
pub mod word_splitter;

// Re-exports for convenience
pub use interlude_dots::{Fade, InterludeDots, LinePosition, PlaceholderView};
pub use scroll::{ScrollKind, ScrollMove};
pub use status::LineStatus;
pub use word_splitter::WordReveal;

use serde::Serialize;

use super::romanize::{RomanizationCache, visible_romanization};
use super::{Lrc, LrcLine, LrcTag, Millis, TrailingStrategy, ensure_trailing_empty_line};
use crate::features::settings::Settings;
use crate::utils::{seek_time_ms, time_code_text};

/// Render state of one line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub index: usize,
    pub status: LineStatus,
    pub time_in_ms: Millis,
    /// Playback target when the line is clicked
    pub seek_ms: u64,
    /// Empty when time codes are hidden
    pub time_code: String,
    pub text: String,
    /// Line duration in seconds, `None` when unbounded
    pub duration_secs: Option<f64>,
    /// Word reveals for non-blank lines
    pub words: Vec<WordReveal>,
    /// Placeholder state for blank lines
    pub placeholder: Option<PlaceholderView>,
    pub romanized: Option<String>,
}

/// What changed during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickUpdate {
    pub current_changed: bool,
    pub step_changed: bool,
    pub scroll: Option<ScrollMove>,
}

impl TickUpdate {
    pub fn is_empty(&self) -> bool {
        !self.current_changed && !self.step_changed && self.scroll.is_none()
    }
}

/// Main lyrics engine - manages line state for the current track
pub struct LyricsEngine {
    settings: Settings,
    interlude_dots: InterludeDots,
    tags: Vec<LrcTag>,
    lines: Vec<LrcLine>,
    song_duration_ms: Option<Millis>,
    /// Current time in milliseconds
    current_time_ms: Millis,
    current_index: Option<usize>,
    /// Placeholder step of the current blank line
    current_step: Option<usize>,
    statuses: Vec<LineStatus>,
    /// Current scroll target index (for auto-scroll)
    scroll_to_index: Option<usize>,
    first_empty_index: Option<usize>,
    romanization: RomanizationCache,
}

impl LyricsEngine {
    pub fn new(settings: Settings) -> Self {
        let interlude_dots = placeholder_dots(&settings);
        Self {
            settings,
            interlude_dots,
            tags: Vec::new(),
            lines: Vec::new(),
            song_duration_ms: None,
            current_time_ms: 0,
            current_index: None,
            current_step: None,
            statuses: Vec::new(),
            scroll_to_index: None,
            first_empty_index: None,
            romanization: RomanizationCache::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Update settings at runtime
    #[allow(dead_code)]
    pub fn set_settings(&mut self, settings: Settings) {
        self.interlude_dots = placeholder_dots(&settings);
        self.settings = settings;
        self.recompute();
    }

    /// Replace the lyrics with a new track's; the old sequence is discarded
    pub fn set_lyrics(&mut self, lrc: Lrc) {
        self.tags = lrc.tags;
        self.lines = lrc.lines;
        self.song_duration_ms = None;
        self.current_index = None;
        self.current_step = None;
        self.scroll_to_index = None;
        self.romanization.reset();
        self.refresh_first_empty();
        self.recompute();
        tracing::debug!("Lyrics engine loaded {} lines", self.lines.len());
    }

    /// Drop the current track's lyrics
    pub fn clear(&mut self) {
        self.set_lyrics(Lrc::default());
    }

    /// Cover silence after the last lyric once the song length is known
    pub fn set_song_duration(&mut self, duration_ms: Millis) {
        self.song_duration_ms = Some(duration_ms);
        let lines = std::mem::take(&mut self.lines);
        let before = lines.len();
        self.lines = ensure_trailing_empty_line(lines, TrailingStrategy::Midpoint, Some(duration_ms));
        if self.lines.len() != before {
            tracing::debug!("Added trailing blank line for song end at {}ms", duration_ms);
            self.refresh_first_empty();
            self.recompute();
        }
    }

    pub fn song_duration_ms(&self) -> Option<Millis> {
        self.song_duration_ms
    }

    pub fn lines(&self) -> &[LrcLine] {
        &self.lines
    }

    pub fn tags(&self) -> &[LrcTag] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get current time in milliseconds
    pub fn current_time(&self) -> Millis {
        self.current_time_ms
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_line(&self) -> Option<&LrcLine> {
        self.current_index.and_then(|i| self.lines.get(i))
    }

    /// Fractional progress through the current line
    pub fn progress(&self) -> f64 {
        self.current_line()
            .map(|line| status::line_progress(line, self.current_time_ms))
            .unwrap_or(0.0)
    }

    #[allow(dead_code)]
    pub fn statuses(&self) -> &[LineStatus] {
        &self.statuses
    }

    pub fn status(&self, index: usize) -> Option<LineStatus> {
        self.statuses.get(index).copied()
    }

    /// Get scroll target index
    pub fn scroll_to_index(&self) -> Option<usize> {
        self.scroll_to_index
    }

    /// Shared romanization results, for spawning romanization tasks
    pub fn romanization_cache(&self) -> &RomanizationCache {
        &self.romanization
    }

    /// Set the playback time and update line state
    ///
    /// Main entry point for playback sync, called on every tick.
    pub fn set_current_time(&mut self, time_ms: Millis) -> TickUpdate {
        self.current_time_ms = time_ms;

        let previous_index = self.current_index;
        let previous_step = self.current_step;
        let previous_scroll = self.scroll_to_index;

        self.recompute();

        let scroll = match (previous_scroll, self.scroll_to_index) {
            (Some(from), Some(to)) => scroll::plan_scroll(&self.lines, from, to),
            _ => None,
        };

        TickUpdate {
            current_changed: previous_index != self.current_index,
            step_changed: previous_step != self.current_step,
            scroll,
        }
    }

    fn recompute(&mut self) {
        let time = self.current_time_ms;
        self.current_index = status::current_index(&self.lines, time);
        self.statuses = status::line_statuses(&self.lines, time);
        self.current_step = self
            .current_line()
            .filter(|line| line.is_blank())
            .map(|line| {
                self.interlude_dots
                    .step(line, time, self.settings.precise_timing)
            });
        self.scroll_to_index = scroll::scroll_target(&self.lines, time);
    }

    fn refresh_first_empty(&mut self) {
        self.first_empty_index = self.lines.iter().position(|line| line.is_blank());
    }

    /// Playback target for a click on line `index`
    pub fn seek_target(&self, index: usize) -> Option<u64> {
        self.lines
            .get(index)
            .map(|line| seek_time_ms(line.time_in_ms, self.settings.precise_timing))
    }

    /// Render state for line `index`
    pub fn line_view(&self, index: usize) -> Option<LineView> {
        let line = self.lines.get(index)?;
        let status = self.status(index)?;
        let seek_ms = self.seek_target(index)?;
        let text = line.text.trim().to_string();
        let precise = self.settings.precise_timing;

        let (words, placeholder, romanized) = if text.is_empty() {
            let position = LinePosition {
                is_final_line: index + 1 == self.lines.len(),
                is_first_empty_line: self.first_empty_index == Some(index),
            };
            let view =
                self.interlude_dots
                    .view(line, status, self.current_time_ms, precise, position);
            (Vec::new(), Some(view), None)
        } else {
            let romanized = if self.settings.romanization {
                self.romanization.get(index).and_then(|roman| {
                    visible_romanization(&text, &roman).map(str::to_string)
                })
            } else {
                None
            };
            (word_splitter::schedule_words(&text), None, romanized)
        };

        Some(LineView {
            index,
            status,
            time_in_ms: line.time_in_ms,
            seek_ms,
            time_code: time_code_text(line.time_in_ms, precise, self.settings.show_time_codes),
            text,
            duration_secs: line.duration.map(|d| d as f64 / 1000.0),
            words,
            placeholder,
            romanized,
        })
    }

    /// Render state for every line
    pub fn snapshot(&self) -> Vec<LineView> {
        (0..self.lines.len())
            .filter_map(|i| self.line_view(i))
            .collect()
    }
}

fn placeholder_dots(settings: &Settings) -> InterludeDots {
    let dots = InterludeDots::new(settings.placeholder_states(), settings.show_empty_line_symbols);
    tracing::debug!(
        "Placeholder states: {} (cumulative: {})",
        dots.states().len(),
        dots.is_cumulative()
    );
    dots
}

impl Default for LyricsEngine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
