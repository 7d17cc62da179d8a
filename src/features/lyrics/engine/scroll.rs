//! Auto-scroll timing
//!
//! Picks how long the view takes to follow the current line. Short hops between
//! fast lines move quickly, longer jumps (seeks, skipped lines) use slower
//! curves. Durations grow with the pixel distance and are clamped per class.

use serde::Serialize;

use crate::features::lyrics::{LrcLine, Millis};

/// Scroll evaluates the target this far ahead of playback
pub const LEAD_IN_TIME_MS: Millis = 130;

/// Gaps shorter than this make a one-line hop "fast"
const FAST_LINE_GAP_MS: Millis = 1000;

/// Scroll animation class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollKind {
    /// One line ahead, the line is short
    Fast,
    /// One line ahead
    Normal,
    /// Two to four lines
    Jump1,
    /// More than four lines
    Jump4,
}

/// Duration curve parameters in milliseconds
#[derive(Debug, Clone, Copy)]
struct Curve {
    base: f64,
    mult: f64,
    min: f64,
    max: f64,
}

impl ScrollKind {
    fn curve(self) -> Curve {
        match self {
            ScrollKind::Fast => Curve {
                base: 260.0,
                mult: 0.28,
                min: 240.0,
                max: 680.0,
            },
            ScrollKind::Normal => Curve {
                base: 550.0,
                mult: 0.7,
                min: 850.0,
                max: 1650.0,
            },
            ScrollKind::Jump1 => Curve {
                base: 700.0,
                mult: 0.8,
                min: 1000.0,
                max: 1800.0,
            },
            ScrollKind::Jump4 => Curve {
                base: 400.0,
                mult: 0.6,
                min: 600.0,
                max: 1400.0,
            },
        }
    }

    /// Animation duration for a scroll of `distance_px`
    pub fn duration_ms(self, distance_px: f64) -> u64 {
        let c = self.curve();
        (c.base + c.mult * distance_px.abs())
            .clamp(c.min, c.max)
            .round() as u64
    }

    /// Class for a hop from line `from` to line `to`; `None` when not moving
    pub fn classify(from: usize, to: usize, line_gap_ms: Option<Millis>) -> Option<Self> {
        match from.abs_diff(to) {
            0 => None,
            1 if line_gap_ms.is_some_and(|gap| gap < FAST_LINE_GAP_MS) => Some(ScrollKind::Fast),
            1 => Some(ScrollKind::Normal),
            2..=4 => Some(ScrollKind::Jump1),
            _ => Some(ScrollKind::Jump4),
        }
    }
}

/// A pending scroll from one line to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMove {
    pub from: usize,
    pub to: usize,
    pub kind: ScrollKind,
}

impl ScrollMove {
    pub fn duration_ms(&self, distance_px: f64) -> u64 {
        self.kind.duration_ms(distance_px)
    }
}

/// Scroll target at playback `time`, looking `LEAD_IN_TIME_MS` ahead
///
/// Falls back to the next upcoming line, then to the last line.
pub fn scroll_target(lines: &[LrcLine], time: Millis) -> Option<usize> {
    if lines.is_empty() {
        return None;
    }
    let ahead = time.saturating_add(LEAD_IN_TIME_MS);
    super::status::current_index(lines, ahead)
        .or_else(|| super::status::next_line_index(lines, ahead))
        .or(Some(lines.len() - 1))
}

/// Plan the scroll from `from` to the line at `to`
pub fn plan_scroll(lines: &[LrcLine], from: usize, to: usize) -> Option<ScrollMove> {
    let gap = lines.get(to).and_then(|line| line.duration);
    ScrollKind::classify(from, to, gap).map(|kind| ScrollMove { from, to, kind })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations_clamped() {
        assert_eq!(ScrollKind::Fast.duration_ms(0.0), 260);
        assert_eq!(ScrollKind::Fast.duration_ms(10_000.0), 680);
        assert_eq!(ScrollKind::Normal.duration_ms(0.0), 850);
        assert_eq!(ScrollKind::Normal.duration_ms(500.0), 900);
        assert_eq!(ScrollKind::Jump1.duration_ms(-500.0), 1100);
        assert_eq!(ScrollKind::Jump4.duration_ms(0.0), 600);
        assert_eq!(ScrollKind::Jump4.duration_ms(5000.0), 1400);
    }

    #[test]
    fn test_classify() {
        assert_eq!(ScrollKind::classify(3, 3, None), None);
        assert_eq!(ScrollKind::classify(3, 4, Some(400)), Some(ScrollKind::Fast));
        assert_eq!(ScrollKind::classify(3, 4, Some(4000)), Some(ScrollKind::Normal));
        assert_eq!(ScrollKind::classify(3, 4, None), Some(ScrollKind::Normal));
        assert_eq!(ScrollKind::classify(6, 3, None), Some(ScrollKind::Jump1));
        assert_eq!(ScrollKind::classify(0, 9, None), Some(ScrollKind::Jump4));
    }

    #[test]
    fn test_scroll_target_leads_playback() {
        let lines = vec![
            LrcLine::new(0, Some(1000), "a"),
            LrcLine::new(1000, None, "b"),
        ];
        assert_eq!(scroll_target(&lines, 800), Some(0));
        assert_eq!(scroll_target(&lines, 900), Some(1));
        assert_eq!(scroll_target(&[], 0), None);

        assert_eq!(scroll_target(&lines, Millis::MAX), Some(1));

        let late = vec![LrcLine::new(5000, Some(1000), "a")];
        assert_eq!(scroll_target(&late, 0), Some(0));
        assert_eq!(scroll_target(&late, 9000), Some(0));
    }

    #[test]
    fn test_plan_scroll() {
        let lines = vec![
            LrcLine::new(0, Some(1000), "a"),
            LrcLine::new(1000, Some(500), "b"),
            LrcLine::new(1500, None, "c"),
        ];
        let plan = plan_scroll(&lines, 0, 1).unwrap();
        assert_eq!(plan.kind, ScrollKind::Fast);
        assert_eq!(plan_scroll(&lines, 1, 2).unwrap().kind, ScrollKind::Normal);
        assert!(plan_scroll(&lines, 2, 2).is_none());
    }
}
