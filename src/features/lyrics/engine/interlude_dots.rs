//! InterludeDots placeholder for blank lyric lines
//!
//! Blank lines (instrumental gaps) step through a configured sequence of
//! placeholder strings as the gap plays. An end delay keeps the final step
//! from being reached right at the line's end. When every placeholder is the
//! same string the sequence is cumulative: markers light up one after another
//! instead of replacing each other.

use serde::Serialize;

use super::status::LineStatus;
use crate::features::lyrics::{LrcLine, Millis};
use crate::utils::{round_half_up, round_to_second};

/// End delay in seconds for gaps longer than `LONG_GAP_MS`
const END_DELAY_SECS: f64 = 1.0;
/// End delay in seconds at exactly `SHORT_GAP_MS`
const SHORT_END_DELAY_SECS: f64 = 0.5;
const LONG_GAP_MS: Millis = 3000;
const SHORT_GAP_MS: Millis = 1000;
/// Fraction of a sub-second gap used as end delay
const SHORT_FRACTION: f64 = 0.8;
/// Share of a sub-second gap that always stays before the end
const SHORT_MIN_GAP_FRACTION: f64 = 0.15;

const NBSP: &str = "\u{00A0}";

/// End delay in milliseconds for a blank line lasting `total_ms`
///
/// - over 3s: a fixed second
/// - 1s to 3s: interpolated from 500ms to 1000ms
/// - under 1s: 80% of the gap, leaving at least 15% of it
pub fn end_delay_ms(total_ms: Millis) -> Millis {
    if total_ms > LONG_GAP_MS {
        return round_half_up(END_DELAY_SECS * 1000.0) as Millis;
    }
    if total_ms >= SHORT_GAP_MS {
        // Interpolated in seconds, then scaled
        let ratio = (total_ms - SHORT_GAP_MS) as f64 / (LONG_GAP_MS - SHORT_GAP_MS) as f64;
        let delay_secs = SHORT_END_DELAY_SECS + (END_DELAY_SECS - SHORT_END_DELAY_SECS) * ratio;
        return round_half_up(delay_secs * 1000.0) as Millis;
    }

    let total = total_ms as f64;
    let fraction = round_half_up(total * SHORT_FRACTION) as Millis;
    let min_gap = round_half_up(total * SHORT_MIN_GAP_FRACTION) as Millis;
    fraction.min(total_ms - min_gap)
}

/// Step index for a blank line at `progress_ms` into a line of `duration`
///
/// Coarse mode (`precise == false`) rounds both the effective total and the
/// progress to whole seconds; gaps of a second or less are never rounded.
pub fn placeholder_step(
    progress_ms: Millis,
    duration: Option<Millis>,
    step_count: usize,
    precise: bool,
) -> usize {
    if step_count <= 1 {
        return 0;
    }
    let Some(total) = duration else {
        return 0;
    };

    let raw_total = (total - end_delay_ms(total)) as f64;
    let effective_total = if total <= SHORT_GAP_MS || precise {
        raw_total
    } else {
        round_to_second(raw_total)
    };
    if effective_total <= 0.0 {
        return 0;
    }

    let progress = progress_ms as f64;
    let effective_progress = if precise {
        progress
    } else {
        round_to_second(progress)
    };
    let percentage = (effective_progress / effective_total).clamp(0.0, 1.0);

    (((step_count - 1) as f64 * percentage).floor() as usize).min(step_count - 1)
}

/// Visibility class of a placeholder segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fade {
    /// Not rendered
    Hidden,
    /// Highlighted on the current line
    Show,
    /// Rendered dimmed on a non-current line
    Placeholder,
    /// Cumulative marker not reached yet
    Dim,
}

/// One rendered placeholder string
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderSegment {
    pub text: String,
    pub fade: Fade,
}

/// Render state of a blank line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderView {
    pub step: usize,
    pub segments: Vec<PlaceholderSegment>,
    /// Last line of the track; renders an empty marker only
    pub final_empty: bool,
    /// First blank line with an empty label renders without padding
    pub no_padding: bool,
}

/// Position of a blank line within the track
#[derive(Debug, Clone, Copy, Default)]
pub struct LinePosition {
    pub is_final_line: bool,
    pub is_first_empty_line: bool,
}

/// Placeholder states for blank lines
#[derive(Debug, Clone)]
pub struct InterludeDots {
    states: Vec<String>,
    cumulative: bool,
    /// Render placeholders on non-current blank lines too
    show_on_inactive: bool,
}

impl InterludeDots {
    pub fn new(states: Vec<String>, show_on_inactive: bool) -> Self {
        let states = if states.is_empty() {
            vec![String::new()]
        } else {
            states
        };
        let cumulative = states.len() > 1 && states.iter().all(|s| *s == states[0]);
        Self {
            states,
            cumulative,
            show_on_inactive,
        }
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn is_cumulative(&self) -> bool {
        self.cumulative
    }

    /// Current step for `line` at playback `time`
    pub fn step(&self, line: &LrcLine, time: Millis, precise: bool) -> usize {
        placeholder_step(
            time.saturating_sub(line.time_in_ms),
            line.duration,
            self.states.len(),
            precise,
        )
    }

    /// Build the render state of a blank line
    pub fn view(
        &self,
        line: &LrcLine,
        status: LineStatus,
        time: Millis,
        precise: bool,
        position: LinePosition,
    ) -> PlaceholderView {
        let highlighted = status == LineStatus::Current;
        let render = self.show_on_inactive || highlighted;
        let step = self.step(line, time, precise);

        let active_fade = match (render, highlighted) {
            (false, _) => Fade::Hidden,
            (true, true) => Fade::Show,
            (true, false) => Fade::Placeholder,
        };

        let final_empty = position.is_final_line && line.is_blank();
        let first_label = self.states[0].as_str();
        let no_padding =
            position.is_first_empty_line && (first_label.is_empty() || first_label == NBSP);

        let segments = if final_empty {
            vec![PlaceholderSegment {
                text: String::new(),
                fade: if highlighted { Fade::Show } else { Fade::Hidden },
            }]
        } else if self.cumulative {
            self.states
                .iter()
                .enumerate()
                .map(|(i, text)| PlaceholderSegment {
                    text: text.clone(),
                    fade: match (render, i <= step) {
                        (false, _) => Fade::Hidden,
                        (true, true) => active_fade,
                        (true, false) => Fade::Dim,
                    },
                })
                .collect()
        } else {
            vec![PlaceholderSegment {
                text: self.states.get(step).cloned().unwrap_or_default(),
                fade: active_fade,
            }]
        };

        PlaceholderView {
            step,
            segments,
            final_empty,
            no_padding,
        }
    }
}

impl Default for InterludeDots {
    fn default() -> Self {
        Self::new(vec!["♪".to_string()], false)
    }
}
