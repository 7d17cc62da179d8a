//! Standard LRC format parser
//!
//! Supports the common [mm:ss.xx]text format with line-level synchronization,
//! `[key: value]` metadata tags and the `[offset: ms]` tag.

use once_cell::sync::Lazy;
use regex::Regex;

use super::lines::{
    LEADING_PADDING_THRESHOLD_MS, PaddingMode, ensure_leading_padding_empty_line,
    merge_consecutive_empty_lines,
};
use super::types::{Lrc, LrcLine, LrcTag, Millis};

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(?P<tag>(?-u:\w)+):\s*(?P<value>.+?)\s*\]$").expect("valid tag regex")
});

static LYRIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(?P<minutes>[0-9]+):(?P<seconds>[0-9]+)\.(?P<fraction>[0-9]{1,3})\](?P<text>.*)$")
        .expect("valid lyric regex")
});

static LEADING_INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+").expect("valid integer regex"));

/// Normalize the fractional field to two digits
///
/// One digit is right-padded with `0`, three digits are truncated (not
/// rounded): `.5` -> `50`, `.123` -> `12`.
fn normalize_fraction(fraction: &str) -> String {
    let mut centis: String = fraction.chars().take(2).collect();
    while centis.len() < 2 {
        centis.push('0');
    }
    centis
}

fn pad2(digits: &str) -> String {
    format!("{:0>2}", digits)
}

/// Parse a leading signed integer, ignoring trailing garbage (`"-250ms"` -> -250)
fn parse_offset(value: &str) -> Option<Millis> {
    LEADING_INT_RE.find(value.trim())?.as_str().parse().ok()
}

/// Parse a timed lyric line into its line (duration still unbounded)
fn parse_lyric_line(line: &str) -> Option<LrcLine> {
    let caps = LYRIC_RE.captures(line)?;
    let minutes = &caps["minutes"];
    let seconds = &caps["seconds"];
    let centis = normalize_fraction(&caps["fraction"]);

    let time_in_ms = minutes
        .parse::<Millis>()
        .ok()?
        .checked_mul(60_000)?
        .checked_add(seconds.parse::<Millis>().ok()?.checked_mul(1000)?)?
        .checked_add(centis.parse::<Millis>().ok()? * 10)?;

    Some(LrcLine {
        time: format!("{}:{}.{}", pad2(minutes), pad2(seconds), centis),
        time_in_ms,
        duration: None,
        text: caps["text"].trim().to_string(),
    })
}

/// Parse LRC content
///
/// Best effort: unrecognized bracketed content is dropped and never fails.
pub fn parse_lrc(src: &str) -> Lrc {
    let mut lrc = Lrc::default();
    let mut offset: Millis = 0;

    for raw in src.split('\n') {
        let line = raw.trim();
        if !line.starts_with('[') {
            continue;
        }

        if let Some(current) = parse_lyric_line(line) {
            if let Some(previous) = lrc.lines.last_mut() {
                let gap = current.time_in_ms - previous.time_in_ms;
                if gap < 0 {
                    tracing::debug!(
                        "Out-of-order LRC timestamp {} after {}, clamping duration",
                        current.time,
                        previous.time
                    );
                }
                previous.duration = Some(gap.max(0));
            }
            lrc.lines.push(current);
            continue;
        }

        let Some(caps) = TAG_RE.captures(line) else {
            tracing::debug!("Dropping unrecognized LRC line: {}", line);
            continue;
        };

        let tag = &caps["tag"];
        let value = caps["value"].trim();
        if tag == "offset" {
            match parse_offset(value) {
                Some(parsed) => offset = parsed,
                None => tracing::debug!("Ignoring malformed LRC offset: {}", value),
            }
            continue;
        }

        lrc.tags.push(LrcTag {
            tag: tag.to_string(),
            value: value.to_string(),
        });
    }

    if offset != 0 {
        let shifted: Option<Vec<Millis>> = lrc
            .lines
            .iter()
            .map(|line| line.time_in_ms.checked_add(offset))
            .collect();
        match shifted {
            Some(times) => {
                for (line, time) in lrc.lines.iter_mut().zip(times) {
                    line.time_in_ms = time;
                }
            }
            None => tracing::debug!("Ignoring LRC offset {} that overflows line times", offset),
        }
    }

    let lines = std::mem::take(&mut lrc.lines);
    let lines =
        ensure_leading_padding_empty_line(lines, LEADING_PADDING_THRESHOLD_MS, PaddingMode::Span);
    lrc.lines = merge_consecutive_empty_lines(lines);

    lrc
}

/// Convert lyrics back to LRC format string
#[allow(dead_code)]
pub fn stringify_lrc(lrc: &Lrc) -> String {
    let capacity: usize = lrc.tags.iter().map(|t| t.tag.len() + t.value.len() + 5).sum::<usize>()
        + lrc.lines.iter().map(|l| l.text.len() + 11).sum::<usize>();
    let mut result = String::with_capacity(capacity);

    for tag in &lrc.tags {
        result.push_str(&format!("[{}: {}]\n", tag.tag, tag.value));
    }
    for line in &lrc.lines {
        result.push('[');
        result.push_str(&line.time);
        result.push(']');
        result.push_str(&line.text);
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fraction() {
        assert_eq!(normalize_fraction("5"), "50");
        assert_eq!(normalize_fraction("12"), "12");
        assert_eq!(normalize_fraction("123"), "12");
    }

    #[test]
    fn test_parse_lyric_line() {
        let line = parse_lyric_line("[00:01.12] test LyRiC ").unwrap();
        assert_eq!(line.time_in_ms, 1120);
        assert_eq!(line.text, "test LyRiC");
        assert_eq!(line.time, "00:01.12");

        let line = parse_lyric_line("[1:02.5]x").unwrap();
        assert_eq!(line.time_in_ms, 62_500);
        assert_eq!(line.time, "01:02.50");

        assert!(parse_lyric_line("[00:01]x").is_none());
        assert!(parse_lyric_line("[ar: Someone]").is_none());
    }

    #[test]
    fn test_fraction_normalization() {
        let lrc = parse_lrc("[00:01.5]x");
        assert_eq!(lrc.lines.last().unwrap().time_in_ms, 1500);

        // Truncated, not rounded
        let lrc = parse_lrc("[00:01.123]x");
        assert_eq!(lrc.lines.last().unwrap().time_in_ms, 1120);
    }

    #[test]
    fn test_offset_applied() {
        let lrc = parse_lrc("[offset: -100]\n[00:01.00]Hello");
        // 900ms start exceeds the padding threshold
        assert_eq!(lrc.lines.len(), 2);
        let hello = &lrc.lines[1];
        assert_eq!(hello.text, "Hello");
        assert_eq!(hello.time_in_ms, 900);
        assert!(lrc.tags.is_empty());
    }

    #[test]
    fn test_offset_after_lines_applies_everywhere() {
        let lrc = parse_lrc("[00:00.20]a\n[00:00.25]b\n[offset: +50]");
        assert_eq!(lrc.lines[0].time_in_ms, 250);
        assert_eq!(lrc.lines[1].time_in_ms, 300);
        assert_eq!(lrc.lines[0].duration, Some(50));
    }

    #[test]
    fn test_overflowing_offset_ignored() {
        let lrc = parse_lrc("[offset: 9223372036854775807]\n[00:01.00]x");
        let x = lrc.lines.last().unwrap();
        assert_eq!(x.text, "x");
        assert_eq!(x.time_in_ms, 1000);

        let lrc = parse_lrc("[offset: -9223372036854775808]\n[00:00.00]a\n[00:01.00]b");
        assert_eq!(lrc.lines[0].time_in_ms, -9_223_372_036_854_775_808);
        assert_eq!(lrc.lines[1].time_in_ms, -9_223_372_036_854_774_808);
    }

    #[test]
    fn test_malformed_offset_ignored() {
        let lrc = parse_lrc("[offset: soon]\n[00:00.10]a");
        assert_eq!(lrc.lines[0].time_in_ms, 100);
        assert!(lrc.tags.is_empty());
    }

    #[test]
    fn test_scenario_leading_blank() {
        let lrc = parse_lrc("[00:00.00]\n[00:02.00]Hello world");
        assert_eq!(lrc.lines.len(), 2);
        assert_eq!(lrc.lines[0].text, "");
        assert_eq!(lrc.lines[0].time_in_ms, 0);
        assert_eq!(lrc.lines[0].duration, Some(2000));
        assert_eq!(lrc.lines[1].text, "Hello world");
        assert_eq!(lrc.lines[1].time_in_ms, 2000);
        assert_eq!(lrc.lines[1].duration, None);
    }

    #[test]
    fn test_parse_lrc_tags_and_durations() {
        let content = "[ti: Test Song ]\n[ar:Test Artist]\n[00:00.00]First line\n[00:05.00]Second line\r\n[00:10.00]Third line";
        let lrc = parse_lrc(content);
        assert_eq!(lrc.tag("ti"), Some("Test Song"));
        assert_eq!(lrc.tag("ar"), Some("Test Artist"));
        assert_eq!(lrc.lines.len(), 3);
        assert_eq!(lrc.lines[0].duration, Some(5000));
        assert_eq!(lrc.lines[1].text, "Second line");
        assert_eq!(lrc.lines[1].duration, Some(5000));
        assert_eq!(lrc.lines[2].duration, None);
    }

    #[test]
    fn test_leading_padding_and_merge() {
        let content = "[00:03.00]\n[00:04.00]\n[00:06.00]Sing";
        let lrc = parse_lrc(content);
        // padding [0, 3000) + blank [3000, 6000) merge into one blank line
        assert_eq!(lrc.lines.len(), 2);
        assert_eq!(lrc.lines[0].time_in_ms, 0);
        assert_eq!(lrc.lines[0].duration, Some(6000));
        assert_eq!(lrc.lines[1].text, "Sing");
    }

    #[test]
    fn test_malformed_input_degrades() {
        let content = "no brackets\n[broken\n[00.01]bad\n[]\n[:novalue]\n[00:01.00]ok";
        let lrc = parse_lrc(content);
        assert_eq!(lrc.lines.iter().filter(|l| !l.is_blank()).count(), 1);
        assert!(lrc.tags.is_empty());
        assert!(parse_lrc("").lines.is_empty());
    }

    #[test]
    fn test_ascii_only_patterns() {
        let lrc = parse_lrc("[título: x]\n[ti: ok]\n[0١:01.00]digits\n[00:01.00]a");
        assert_eq!(lrc.tags.len(), 1);
        assert_eq!(lrc.tag("ti"), Some("ok"));
        assert_eq!(lrc.lines.iter().filter(|l| !l.is_blank()).count(), 1);
        assert_eq!(lrc.lines.last().unwrap().text, "a");
    }

    #[test]
    fn test_monotonic_times() {
        let lrc = parse_lrc("[00:01.00]a\n[00:02.00]b\n[00:02.50]c\n[01:00.00]d");
        assert!(lrc.lines.windows(2).all(|w| w[0].time_in_ms <= w[1].time_in_ms));
    }

    #[test]
    fn test_out_of_order_clamped() {
        let lrc = parse_lrc("[00:00.10]a\n[00:05.00]b\n[00:02.00]c");
        assert_eq!(lrc.lines[1].duration, Some(0));
    }

    #[test]
    fn test_stringify_lrc() {
        let lrc = parse_lrc("[ar: Someone]\n[00:01.12] test LyRiC\n[00:10.254] sssxxx");
        let output = stringify_lrc(&lrc);
        assert!(output.starts_with("[ar: Someone]\n"));
        assert!(output.contains("[00:00.00]\n"));
        assert!(output.contains("[00:01.12]test LyRiC\n"));
        assert!(output.contains("[00:10.25]sssxxx\n"));
    }
}
