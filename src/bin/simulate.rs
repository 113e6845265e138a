use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use collect_rush_server::constants::{
    DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH, MAX_WORLD_DIMENSION, PLAYER_SIZE,
};
use collect_rush_server::game::Game;
use collect_rush_server::rng::{RandomSource, Rng};
use collect_rush_server::types::{Direction, RankEntry, ServerMessage, Vec2, WorldBounds};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless run of greedy bots against the game core.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 4)]
    bots: usize,
    #[arg(long, default_value_t = 5_000)]
    steps: u64,
    #[arg(long)]
    seed: Option<u32>,
    /// Steps between two leaderboard snapshots.
    #[arg(long, default_value_t = 60)]
    rank_every: u64,
    /// Percentage of bot moves that pick a random direction.
    #[arg(long, default_value_t = 20)]
    jitter: u32,
    #[arg(long, default_value_t = DEFAULT_WORLD_WIDTH)]
    width: i32,
    #[arg(long, default_value_t = DEFAULT_WORLD_HEIGHT)]
    height: i32,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    seed: u32,
    bots: usize,
    steps: u64,
    pickups: u64,
    #[serde(rename = "messageCounts")]
    message_counts: BTreeMap<&'static str, u64>,
    #[serde(rename = "finalRanking")]
    final_ranking: Vec<RankEntry>,
    anomalies: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    if !world_fits(cli.width, cli.height) {
        tracing::error!(
            width = cli.width,
            height = cli.height,
            min = PLAYER_SIZE + 1,
            max = MAX_WORLD_DIMENSION,
            "world size out of range"
        );
        return ExitCode::from(2);
    }
    let seed = cli
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_subsec_nanos());

    tracing::info!(seed, bots = cli.bots, steps = cli.steps, "simulation started");
    let summary = run(&cli, seed);
    for anomaly in &summary.anomalies {
        tracing::warn!(%anomaly, "anomaly detected");
    }

    match serde_json::to_string(&summary) {
        Ok(line) => println!("{line}"),
        Err(error) => {
            tracing::error!(%error, "failed to serialize summary");
            return ExitCode::from(2);
        }
    }

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            tracing::error!(path = %path.display(), %error, "summary write failed");
            return ExitCode::from(2);
        }
    }

    tracing::info!(pickups = summary.pickups, "simulation finished");
    if summary.anomalies.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(cli: &Cli, seed: u32) -> RunSummary {
    let started_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let bounds = WorldBounds::new(cli.width, cli.height);
    let mut game = Game::new(bounds, Rng::new(seed));
    let mut driver = Rng::new(seed ^ 0x9e37_79b9);

    let bot_ids: Vec<String> = (0..cli.bots).map(|idx| format!("bot_{}", idx + 1)).collect();
    let mut message_counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    let mut pickups = 0u64;
    let mut anomalies = Vec::new();

    for id in &bot_ids {
        for delivery in game.connect(id) {
            *message_counts.entry(kind_of(&delivery.message)).or_insert(0) += 1;
        }
    }

    let mut last_scores: BTreeMap<String, u32> = BTreeMap::new();
    for step in 1..=cli.steps {
        for id in &bot_ids {
            let Some(pos) = game.world().get(id).map(|player| player.pos) else {
                continue;
            };
            let dir = choose_direction(pos, game.world().collectible(), cli.jitter, &mut driver);
            for delivery in game.apply_move(id, Some(dir)) {
                if matches!(delivery.message, ServerMessage::ScoreUpdate(_)) {
                    pickups += 1;
                }
                *message_counts.entry(kind_of(&delivery.message)).or_insert(0) += 1;
            }
        }

        for player in game.world().all_entities() {
            let max_x = bounds.width - PLAYER_SIZE;
            let max_y = bounds.height - PLAYER_SIZE;
            if !(0..=max_x).contains(&player.pos.x) || !(0..=max_y).contains(&player.pos.y) {
                anomalies.push(format!("step {step}: {} out of bounds at {:?}", player.id, player.pos));
            }
            let previous = last_scores.insert(player.id.clone(), player.score).unwrap_or(0);
            if player.score < previous {
                anomalies.push(format!("step {step}: {} score went down", player.id));
            }
        }

        if cli.rank_every > 0 && step % cli.rank_every == 0 {
            let delivery = game.rank_tick();
            if let ServerMessage::RankUpdate(entries) = &delivery.message {
                if entries.windows(2).any(|pair| pair[0].score < pair[1].score) {
                    anomalies.push(format!("step {step}: leaderboard out of order"));
                }
            }
            *message_counts.entry(kind_of(&delivery.message)).or_insert(0) += 1;
        }
    }

    let final_ranking = match game.rank_tick().message {
        ServerMessage::RankUpdate(entries) => entries,
        _ => Vec::new(),
    };

    RunSummary {
        started_at,
        finished_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        seed,
        bots: cli.bots,
        steps: cli.steps,
        pickups,
        message_counts,
        final_ranking,
        anomalies,
    }
}

fn world_fits(width: i32, height: i32) -> bool {
    let sides = PLAYER_SIZE + 1..=MAX_WORLD_DIMENSION;
    sides.contains(&width) && sides.contains(&height)
}

/// Steps along the axis with the larger gap to the collectible, with some noise.
fn choose_direction(pos: Vec2, target: Vec2, jitter: u32, rng: &mut Rng) -> Direction {
    if rng.below(100) < jitter {
        return Direction::ALL[rng.below(4) as usize];
    }
    let dx = target.x - pos.x;
    let dy = target.y - pos.y;
    if dx.abs() >= dy.abs() {
        if dx >= 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy >= 0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

fn kind_of(message: &ServerMessage) -> &'static str {
    match message {
        ServerMessage::CurrentPlayers(_) => "currentPlayers",
        ServerMessage::CollectibleUpdate(_) => "collectibleUpdate",
        ServerMessage::NewPlayer(_) => "newPlayer",
        ServerMessage::PlayerMoved(_) => "playerMoved",
        ServerMessage::ScoreUpdate(_) => "scoreUpdate",
        ServerMessage::PlayerDisconnected(_) => "playerDisconnected",
        ServerMessage::RankUpdate(_) => "rankUpdate",
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_bot_heads_for_the_collectible() {
        let mut rng = Rng::new(1);
        let pos = Vec2 { x: 100, y: 100 };
        assert_eq!(choose_direction(pos, Vec2 { x: 300, y: 120 }, 0, &mut rng), Direction::Right);
        assert_eq!(choose_direction(pos, Vec2 { x: 90, y: 10 }, 0, &mut rng), Direction::Up);
        assert_eq!(choose_direction(pos, Vec2 { x: 10, y: 90 }, 0, &mut rng), Direction::Left);
        assert_eq!(choose_direction(pos, Vec2 { x: 100, y: 400 }, 0, &mut rng), Direction::Down);
    }

    #[test]
    fn world_size_is_range_checked() {
        assert!(world_fits(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT));
        assert!(world_fits(PLAYER_SIZE + 1, MAX_WORLD_DIMENSION));
        assert!(!world_fits(PLAYER_SIZE, 600));
        assert!(!world_fits(800, i32::MAX));
    }

    #[test]
    fn seeded_runs_are_reproducible_and_clean() {
        let cli = Cli::parse_from(["simulate", "--bots", "3", "--steps", "2000", "--seed", "17"]);
        let a = run(&cli, 17);
        let b = run(&cli, 17);
        assert!(a.anomalies.is_empty(), "{:?}", a.anomalies);
        assert_eq!(a.pickups, b.pickups);
        assert!(a.pickups > 0);
        assert_eq!(a.message_counts.get("playerMoved"), Some(&6_000));
        assert_eq!(a.message_counts.get("scoreUpdate"), Some(&a.pickups));
        assert_eq!(a.final_ranking.len(), 3);
    }
}
