//! Word splitting and staggered reveal
//!
//! A non-blank line is split on whitespace and each word's reveal is delayed
//! by `index * WORD_ANIM_DELAY_STEP` seconds from the line start. The delays
//! are presentation only and never touch timing data or seeking.
//!
//! ## Example
//!
//! Input: `"Life is a sugar"`
//! Output: `[("Life", 0.00), ("is", 0.05), ("a", 0.10), ("sugar", 0.15)]`

use serde::Serialize;

/// Seconds of delay per word index
pub const WORD_ANIM_DELAY_STEP: f64 = 0.05;

/// A word with its reveal delay
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordReveal {
    pub text: String,
    /// Seconds after line start
    pub delay_secs: f64,
}

/// Split `text` into words with staggered reveal delays
pub fn schedule_words(text: &str) -> Vec<WordReveal> {
    text.split_whitespace()
        .enumerate()
        .map(|(index, word)| WordReveal {
            text: word.to_string(),
            delay_secs: index as f64 * WORD_ANIM_DELAY_STEP,
        })
        .collect()
}

/// Number of words already revealed `elapsed_secs` after line start
pub fn revealed_count(words: &[WordReveal], elapsed_secs: f64) -> usize {
    if elapsed_secs < 0.0 {
        return 0;
    }
    words.partition_point(|w| w.delay_secs <= elapsed_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_words() {
        let words = schedule_words("  Life is   a sugar ");
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Life", "is", "a", "sugar"]);
        assert_eq!(words[0].delay_secs, 0.0);
        assert!((words[3].delay_secs - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_cjk_line_is_one_word() {
        let words = schedule_words("夜に駆ける");
        assert_eq!(words.len(), 1);
    }

    #[test]
    fn test_blank_has_no_words() {
        assert!(schedule_words(" \t ").is_empty());
    }

    #[test]
    fn test_revealed_count() {
        let words = schedule_words("a b c d");
        assert_eq!(revealed_count(&words, -1.0), 0);
        assert_eq!(revealed_count(&words, 0.0), 1);
        assert_eq!(revealed_count(&words, 0.06), 2);
        assert_eq!(revealed_count(&words, 10.0), 4);
    }
}
