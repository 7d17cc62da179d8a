//! Command line front end
//!
//! Drives the lyrics engine from a simulated playback clock and renders the
//! visible window of lines to the terminal.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;

use crate::features::Settings;
use crate::features::lyrics::engine::word_splitter::revealed_count;
use crate::features::lyrics::engine::{Fade, LineStatus, LineView, LyricsEngine};
use crate::features::lyrics::romanize::{DeunicodeRomanizer, spawn_romanization};
use crate::features::lyrics::{LrcTag, Millis, parse_lyrics_file};
use crate::features::settings::{SettingKey, SettingsStore};

/// Lines rendered on each side of the scroll target
const WINDOW_RADIUS: usize = 3;

/// Nominal rendered line height used to size scroll distances
const LINE_HEIGHT_PX: f64 = 48.0;

/// Playback is simulated this long past the last line when the song length is unknown
const TAIL_MS: Millis = 5000;

/// Options for `play`
#[derive(Debug, Clone)]
pub struct PlayOptions {
    pub song_duration_ms: Option<Millis>,
    pub start_ms: Millis,
    pub tick_ms: u64,
    /// Simulated milliseconds per real millisecond
    pub speed: f64,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            song_duration_ms: None,
            start_ms: 0,
            tick_ms: 100,
            speed: 1.0,
        }
    }
}

/// Load a lyrics file into a fresh engine
async fn load_engine(
    path: &Path,
    settings: Settings,
    song_duration_ms: Option<Millis>,
) -> anyhow::Result<LyricsEngine> {
    let lrc = parse_lyrics_file(path)?;
    if !lrc.is_synced() {
        tracing::warn!("{:?} contains no timed lines", path);
    }
    if let Some(title) = lrc.tag("ti") {
        tracing::info!("Lyrics for {}", title);
    }

    let mut engine = LyricsEngine::new(settings);
    engine.set_lyrics(lrc);
    if let Some(duration) = song_duration_ms {
        engine.set_song_duration(duration);
    }

    if engine.settings().romanization {
        let handles = spawn_romanization(
            Arc::new(DeunicodeRomanizer),
            engine.lines(),
            engine.romanization_cache(),
        );
        for handle in handles {
            handle.await.context("Romanization task panicked")?;
        }
    }

    Ok(engine)
}

/// Simulate playback of `path`, printing the lyrics window whenever it changes
pub async fn play(path: &Path, settings: Settings, options: PlayOptions) -> anyhow::Result<()> {
    let mut engine = load_engine(path, settings, options.song_duration_ms).await?;
    if engine.is_empty() {
        anyhow::bail!("No lyrics found in {:?}", path);
    }

    let end_ms = options.song_duration_ms.unwrap_or_else(|| {
        engine
            .lines()
            .last()
            .map(|line| line.end_ms().unwrap_or(line.time_in_ms).saturating_add(TAIL_MS))
            .unwrap_or(TAIL_MS)
    });
    let step_ms = ((options.tick_ms as f64) * options.speed.max(0.0)).round() as Millis;
    if step_ms <= 0 {
        anyhow::bail!("Playback speed and tick must be positive");
    }

    tracing::info!(
        "Playing {:?}: {} lines, {}ms to {}ms",
        path,
        engine.lines().len(),
        options.start_ms,
        end_ms
    );

    let mut interval = tokio::time::interval(Duration::from_millis(options.tick_ms.max(1)));
    let mut clock = options.start_ms;
    let mut first = true;

    loop {
        interval.tick().await;
        let update = engine.set_current_time(clock);

        if first || !update.is_empty() {
            if let Some(scroll) = update.scroll {
                let distance_px = (scroll.to as f64 - scroll.from as f64) * LINE_HEIGHT_PX;
                tracing::debug!(
                    "Scroll {} -> {} ({:?}, {}ms)",
                    scroll.from,
                    scroll.to,
                    scroll.kind,
                    scroll.duration_ms(distance_px)
                );
            }
            if first || update.current_changed || update.step_changed {
                println!("{}", render_window(&engine));
            }
            first = false;
        }

        if clock >= end_ms {
            break;
        }
        clock = clock.saturating_add(step_ms).min(end_ms);
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Dump<'a> {
    tags: &'a [LrcTag],
    song_duration_ms: Option<Millis>,
    time_ms: Millis,
    current_index: Option<usize>,
    lines: Vec<LineView>,
}

/// Render every line's state at `time_ms` as JSON
pub async fn dump(
    path: &Path,
    settings: Settings,
    song_duration_ms: Option<Millis>,
    time_ms: Millis,
) -> anyhow::Result<String> {
    let mut engine = load_engine(path, settings, song_duration_ms).await?;
    engine.set_current_time(time_ms);

    let dump = Dump {
        tags: engine.tags(),
        song_duration_ms: engine.song_duration_ms(),
        time_ms,
        current_index: engine.current_index(),
        lines: engine.snapshot(),
    };
    serde_json::to_string_pretty(&dump).context("Failed to serialize lyrics state")
}

/// Update one setting and write it out immediately
pub fn set_config(path: Option<PathBuf>, key: &str, value: &str) -> anyhow::Result<bool> {
    let key: SettingKey = key.parse()?;
    let settings = Settings::load_or_default(path.as_deref());
    let mut store = SettingsStore::new(settings, path);

    let now = std::time::Instant::now();
    let changed = store.set(key, value, now)?;
    store.flush_all(now)?;

    if changed {
        tracing::info!("{} = {}", key, value);
    } else {
        tracing::info!("{} unchanged", key);
    }
    Ok(changed)
}

/// Render the lines around the scroll target
pub fn render_window(engine: &LyricsEngine) -> String {
    let views = engine.snapshot();
    let center = engine.scroll_to_index().unwrap_or(0);
    let start = center.saturating_sub(WINDOW_RADIUS);
    let end = (center + WINDOW_RADIUS + 1).min(views.len());

    let mut out = format!(
        "── {} ── {:>3.0}%\n",
        crate::utils::format_lrc_time(engine.current_time()),
        engine.progress() * 100.0
    );
    for view in views.get(start..end).unwrap_or_default() {
        let elapsed_secs = engine.current_time().saturating_sub(view.time_in_ms) as f64 / 1000.0;
        out.push_str(&render_line(view, elapsed_secs));
        out.push('\n');
    }
    out
}

fn render_line(view: &LineView, elapsed_secs: f64) -> String {
    let marker = match view.status {
        LineStatus::Current => '>',
        LineStatus::Previous => ' ',
        LineStatus::Upcoming => '.',
    };
    let time_code = if view.time_code.is_empty() {
        String::new()
    } else {
        format!("[{}] ", view.time_code)
    };

    let body = match &view.placeholder {
        Some(placeholder) => placeholder
            .segments
            .iter()
            .map(|segment| match segment.fade {
                Fade::Hidden => String::new(),
                Fade::Dim => " ".repeat(segment.text.chars().count()),
                Fade::Show | Fade::Placeholder => segment.text.clone(),
            })
            .collect::<String>(),
        None if view.status == LineStatus::Current => {
            let shown = revealed_count(&view.words, elapsed_secs);
            view.words[..shown]
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        }
        None => view.text.clone(),
    };

    match &view.romanized {
        Some(roman) => format!("{} {}{}\n    ({})", marker, time_code, body, roman),
        None => format!("{} {}{}", marker, time_code, body),
    }
}
