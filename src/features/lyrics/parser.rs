//! Lyrics parsing module
//!
//! - `lrc`: Line-synchronized `[mm:ss.xx]text` lyrics with tags and offset
//! - `lines`: Repair pipeline (blank-line merging, leading/trailing padding)
//! - `types`: Owned line and document types

mod lines;
mod lrc;
mod types;

pub use lines::*;
pub use lrc::{parse_lrc, stringify_lrc};
pub use types::*;

use std::path::Path;

use anyhow::Context;

/// Parse lyrics from string content
pub fn parse_lyrics(content: &str) -> Lrc {
    let lrc = parse_lrc(content);
    tracing::debug!(
        "Parsed {} lyric lines and {} tags",
        lrc.lines.len(),
        lrc.tags.len()
    );
    lrc
}

/// Parse lyrics from file
///
/// Only reading the file can fail; malformed content yields fewer lines.
pub fn parse_lyrics_file(path: &Path) -> anyhow::Result<Lrc> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read lyrics file {:?}", path))?;
    Ok(parse_lyrics(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lyrics() {
        let content = "[00:01.12]First line\n[00:05.00]Second line";
        let lrc = parse_lyrics(content);
        assert_eq!(lrc.lines.len(), 3);
        assert_eq!(lrc.lines[1].time_in_ms, 1120);
    }

    #[test]
    fn test_parse_lyrics_file() {
        let path = std::env::temp_dir().join(format!("lyricsync-parse-{}.lrc", std::process::id()));
        std::fs::write(&path, "[ti: Demo]\n[00:00.00]Hi").unwrap();
        let lrc = parse_lyrics_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(lrc.tag("ti"), Some("Demo"));
        assert_eq!(lrc.lines.len(), 1);

        assert!(parse_lyrics_file(Path::new("/definitely/not/here.lrc")).is_err());
    }
}
