use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::constants::{
    DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH, MAX_WORLD_DIMENSION, PLAYER_SIZE, RANK_INTERVAL_MS,
};
use crate::error::ConfigError;
use crate::telemetry::LogFormat;
use crate::types::WorldBounds;

/// Server settings. Every flag can also be given through its environment variable.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    /// Directory holding the client bundle; must contain `index.html`.
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
    #[arg(long, env = "WORLD_WIDTH", default_value_t = DEFAULT_WORLD_WIDTH)]
    pub world_width: i32,
    #[arg(long, env = "WORLD_HEIGHT", default_value_t = DEFAULT_WORLD_HEIGHT)]
    pub world_height: i32,
    #[arg(long, env = "RANK_INTERVAL_MS", default_value_t = RANK_INTERVAL_MS)]
    pub rank_interval_ms: u64,
    /// Fixed seed for placement and colors. Random when absent.
    #[arg(long, env = "GAME_SEED")]
    pub seed: Option<u32>,
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_width <= PLAYER_SIZE || self.world_height <= PLAYER_SIZE {
            return Err(ConfigError::WorldTooSmall {
                width: self.world_width,
                height: self.world_height,
                min: PLAYER_SIZE,
            });
        }
        if self.world_width > MAX_WORLD_DIMENSION || self.world_height > MAX_WORLD_DIMENSION {
            return Err(ConfigError::WorldTooLarge {
                width: self.world_width,
                height: self.world_height,
                max: MAX_WORLD_DIMENSION,
            });
        }
        if self.rank_interval_ms == 0 {
            return Err(ConfigError::ZeroRankInterval);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::new(self.world_width, self.world_height)
    }

    pub fn rank_interval(&self) -> Duration {
        Duration::from_millis(self.rank_interval_ms)
    }

    pub fn resolve_static_dir(&self) -> Option<PathBuf> {
        if let Some(path) = &self.static_dir {
            if path.join("index.html").is_file() {
                return Some(path.clone());
            }
        }

        let candidates = [PathBuf::from("public"), PathBuf::from("dist/client")];
        candidates
            .into_iter()
            .find(|path| path.join("index.html").is_file())
    }
}
