//! Lyrics module - parsing and playback timing
//!
//! - `parser`: LRC parsing and the line repair pipeline
//! - `engine`: Per-tick line status, placeholder steps, word reveal and scroll timing
//! - `romanize`: Romanized companion text for lyric lines

pub mod engine;
pub mod parser;
pub mod romanize;

// Re-export commonly used items
pub use parser::*;
