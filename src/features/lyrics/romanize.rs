//! Romanized companion text for lyric lines
//!
//! Romanization runs asynchronously per line. Results land in a shared cache
//! and the last write for a line wins; results for a previous track are
//! dropped by generation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::LrcLine;

/// External text transform producing a romanized form of a line
pub trait Romanizer: Send + Sync + 'static {
    fn romanize(&self, text: &str) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// ASCII transliteration via `deunicode`
#[derive(Debug, Clone, Copy, Default)]
pub struct DeunicodeRomanizer;

impl Romanizer for DeunicodeRomanizer {
    async fn romanize(&self, text: &str) -> anyhow::Result<String> {
        Ok(deunicode::deunicode(text))
    }
}

/// Trim and collapse internal whitespace
pub fn canonicalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased alphanumeric skeleton used to compare text with its romanization
pub fn simplify_unicode(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Romanized text worth showing next to `text`
pub fn visible_romanization<'a>(text: &str, romanized: &'a str) -> Option<&'a str> {
    if romanized.trim().is_empty() || simplify_unicode(text) == simplify_unicode(romanized) {
        None
    } else {
        Some(romanized)
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    generation: u64,
    entries: HashMap<usize, String>,
}

/// Shared per-line romanization results for the current track
#[derive(Debug, Clone, Default)]
pub struct RomanizationCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl RomanizationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all results and start a new generation (new track)
    pub fn reset(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.entries.clear();
        inner.generation
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Store a result; ignored when it belongs to an older generation
    pub fn store(&self, generation: u64, index: usize, text: String) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            tracing::debug!(
                "Dropping romanization for line {} from generation {}",
                index,
                generation
            );
            return false;
        }
        inner.entries.insert(index, text);
        true
    }

    pub fn get(&self, index: usize) -> Option<String> {
        self.inner.lock().entries.get(&index).cloned()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

/// Spawn romanization for every non-blank line into `cache`
pub fn spawn_romanization<R: Romanizer>(
    romanizer: Arc<R>,
    lines: &[LrcLine],
    cache: &RomanizationCache,
) -> Vec<JoinHandle<()>> {
    let generation = cache.generation();

    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.is_blank())
        .map(|(index, line)| {
            let input = canonicalize(&line.text);
            let romanizer = romanizer.clone();
            let cache = cache.clone();
            tokio::spawn(async move {
                match romanizer.romanize(&input).await {
                    Ok(result) => {
                        cache.store(generation, index, canonicalize(&result));
                    }
                    Err(e) => tracing::warn!("Romanization failed for line {}: {}", index, e),
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingRomanizer;

    impl Romanizer for FailingRomanizer {
        async fn romanize(&self, _text: &str) -> anyhow::Result<String> {
            anyhow::bail!("service unavailable")
        }
    }

    #[test]
    fn test_canonicalize_and_simplify() {
        assert_eq!(canonicalize("  a   b \n c "), "a b c");
        assert_eq!(simplify_unicode("Hello, World!"), "helloworld");
    }

    #[test]
    fn test_visible_romanization() {
        assert_eq!(visible_romanization("Hello world", "hello, world"), None);
        assert_eq!(visible_romanization("こんにちは", "konnichiha"), Some("konnichiha"));
        assert_eq!(visible_romanization("こんにちは", "  "), None);
    }

    #[test]
    fn test_cache_generations() {
        let cache = RomanizationCache::new();
        let old = cache.generation();
        let current = cache.reset();
        assert!(!cache.store(old, 0, "stale".to_string()));
        assert!(cache.store(current, 0, "first".to_string()));
        assert!(cache.store(current, 0, "second".to_string()));
        assert_eq!(cache.get(0).as_deref(), Some("second"));
        cache.reset();
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_spawn_romanization() {
        let lines = vec![
            LrcLine::new(0, Some(1000), ""),
            LrcLine::new(1000, None, "Straße  café"),
        ];
        let cache = RomanizationCache::new();
        for handle in spawn_romanization(Arc::new(DeunicodeRomanizer), &lines, &cache) {
            handle.await.unwrap();
        }
        assert_eq!(cache.get(0), None);
        assert_eq!(cache.get(1).as_deref(), Some("Strasse cafe"));
    }

    #[tokio::test]
    async fn test_failed_romanization_leaves_line_empty() {
        let lines = vec![LrcLine::new(0, None, "text")];
        let cache = RomanizationCache::new();
        for handle in spawn_romanization(Arc::new(FailingRomanizer), &lines, &cache) {
            handle.await.unwrap();
        }
        assert_eq!(cache.len(), 0);
    }
}
