//! lyricsync - line-synchronized lyrics timing engine
//! Parses LRC lyrics and plays them back against a simulated clock

mod app;
mod features;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use features::Settings;
use features::lyrics::Millis;

/// Synced lyrics timing engine
#[derive(Parser, Debug)]
#[command(name = "lyricsync")]
#[command(version)]
#[command(about = "Play back LRC lyrics with word reveal and instrumental placeholders")]
struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Path to the settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate playback and print the lyrics window as it changes
    Play {
        /// LRC file to play
        file: PathBuf,

        /// Song length, adds a trailing blank line after the last lyric
        #[arg(long)]
        song_duration_ms: Option<Millis>,

        /// Playback start position
        #[arg(long, default_value_t = 0)]
        start_ms: Millis,

        /// Tick interval
        #[arg(long, default_value_t = 100)]
        tick_ms: u64,

        /// Playback speed multiplier
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },

    /// Print every line's state at one position as JSON
    Dump {
        /// LRC file to inspect
        file: PathBuf,

        #[arg(long)]
        song_duration_ms: Option<Millis>,

        /// Playback position
        #[arg(long, default_value_t = 0)]
        time_ms: Millis,
    },

    /// Change a setting
    Config {
        /// Setting name, e.g. preciseTiming or show-time-codes
        key: String,
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    match args.command {
        Command::Play {
            file,
            song_duration_ms,
            start_ms,
            tick_ms,
            speed,
        } => {
            let settings = Settings::load_or_default(args.config.as_deref());
            let options = app::PlayOptions {
                song_duration_ms,
                start_ms,
                tick_ms,
                speed,
            };
            app::play(&file, settings, options).await
        }
        Command::Dump {
            file,
            song_duration_ms,
            time_ms,
        } => {
            let settings = Settings::load_or_default(args.config.as_deref());
            let json = app::dump(&file, settings, song_duration_ms, time_ms).await?;
            println!("{}", json);
            Ok(())
        }
        Command::Config { key, value } => {
            app::set_config(args.config, &key, &value)?;
            Ok(())
        }
    }
}
