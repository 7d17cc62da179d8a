//! Utility functions

use crate::features::lyrics::Millis;

// ============================================================================
// Rounding
// ============================================================================

/// Round half up, matching the timing curves' rounding of `x.5` towards +inf
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round milliseconds to the nearest whole second (in milliseconds)
pub fn round_to_second(ms: f64) -> f64 {
    round_half_up(ms / 1000.0) * 1000.0
}

// ============================================================================
// Time Formatting
// ============================================================================

/// Format milliseconds as an LRC timestamp body: `mm:ss.xx`
///
/// Negative values clamp to zero.
pub fn format_lrc_time(ms: Millis) -> String {
    let ms = ms.max(0);
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let centiseconds = (ms % 1000) / 10;
    format!("{:02}:{:02}.{:02}", minutes, seconds, centiseconds)
}

/// Time code shown next to a lyric line
///
/// Empty when time codes are hidden, `mm:ss.xx` in precise mode and `mm:ss`
/// otherwise.
pub fn time_code_text(ms: Millis, precise: bool, show: bool) -> String {
    if !show {
        return String::new();
    }
    if precise {
        return format_lrc_time(ms);
    }
    let ms = ms.max(0);
    format!("{:02}:{:02}", ms / 60_000, (ms % 60_000) / 1000)
}

// ============================================================================
// Seeking
// ============================================================================

/// Playback target for a click on a line starting at `ms`
///
/// Precise mode keeps the exact millisecond value, otherwise the target is
/// floored to whole seconds.
pub fn seek_time_ms(ms: Millis, precise: bool) -> u64 {
    let ms = ms.max(0) as u64;
    if precise { ms } else { ms / 1000 * 1000 }
}
