//! Orb Game headless runner
//!
//! Plays the orb field with the computer player for a fixed amount of
//! simulated time, records finished games in the highscore table and
//! prints a summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use orb_core::{AiPlayer, FieldEvent, FitMode, HighscoreStore, HighscoreTable, OrbConfig, OrbField, Viewport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::store::JsonFileStore;

mod store;

/// Simulated frame rate of the runner loop.
const FRAME_RATE: f32 = 60.0;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Fit {
    Fit,
    Fill,
    Stretch,
}

impl From<Fit> for FitMode {
    fn from(fit: Fit) -> Self {
        match fit {
            Fit::Fit => FitMode::FitToScreen,
            Fit::Fill => FitMode::FillScreen,
            Fit::Stretch => FitMode::Stretch,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Run the orb game in attract mode without a window", version)]
struct Args {
    /// Seed for palette, spawning and scatter randomness.
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// JSON file overriding the default tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Highscore table location.
    #[arg(long, default_value = "highscores.json")]
    highscores: PathBuf,
    /// Player name recorded for new highscores.
    #[arg(long)]
    name: Option<String>,
    #[arg(long, default_value_t = 480.0)]
    screen_width: f32,
    #[arg(long, default_value_t = 800.0)]
    screen_height: f32,
    #[arg(long, value_enum, default_value_t = Fit::Fit)]
    fit: Fit,
}

#[derive(Debug, Default)]
struct Summary {
    games: u32,
    chains: u32,
    best_score: u64,
    new_highscores: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => OrbConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => OrbConfig::default(),
    };
    let viewport = Viewport::fit(
        config.play_area_size,
        config.play_area_size,
        args.screen_width,
        args.screen_height,
        args.fit.into(),
    );

    let store = JsonFileStore::new(&args.highscores);
    let mut highscores = HighscoreTable::load_or_default(&store, config.highscore_entries);
    if let Some(name) = &args.name {
        highscores.set_default_name(name);
    }

    let orb_diameter = config.orb_diameter;
    let play_area = config.play_area_size;
    let mut field = OrbField::new(config, args.seed).context("building orb field")?;
    field.resize(viewport);
    let mut ai = AiPlayer::new(play_area);
    ai.resize(&viewport, orb_diameter);

    field.new_game();
    ai.start();

    let dt = 1.0 / FRAME_RATE;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let frames = (args.seconds.max(0.0) * FRAME_RATE).round() as u64;
    let mut summary = Summary::default();

    for _ in 0..frames {
        ai.update(&mut field, dt);
        field.update(dt);

        for event in field.drain_events() {
            match event {
                FieldEvent::ChainScored { .. } => summary.chains += 1,
                FieldEvent::GameOver { score } => {
                    ai.end(&mut field);
                    summary.games += 1;
                    summary.best_score = summary.best_score.max(score);
                    if let Some(rank) = highscores.insert(score) {
                        summary.new_highscores += 1;
                        tracing::info!("[sim] new highscore {} at rank {}", score, rank + 1);
                        store
                            .save(&highscores)
                            .with_context(|| format!("saving highscores to {}", store.path().display()))?;
                    }
                }
                FieldEvent::FieldCleared => {
                    field.new_game();
                    ai.start();
                }
                FieldEvent::GameStarted | FieldEvent::OrbSpawned(_) | FieldEvent::OrbSelected(_) => {}
            }
        }
    }

    summary.best_score = summary.best_score.max(field.score());
    println!(
        "Simulated {:.0}s: games={} chains={} best={} current={} new_highscores={}",
        args.seconds, summary.games, summary.chains, summary.best_score, field.score(), summary.new_highscores
    );
    for (rank, entry) in highscores.entries().iter().enumerate() {
        println!("{:>2}. {:<10} {:>8}", rank + 1, entry.name, entry.score);
    }
    Ok(())
}
