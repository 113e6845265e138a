use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("world {width}x{height} must be larger than a {min}x{min} player")]
    WorldTooSmall { width: i32, height: i32, min: i32 },
    #[error("world {width}x{height} exceeds the {max}x{max} limit")]
    WorldTooLarge { width: i32, height: i32, max: i32 },
    #[error("rank interval must be greater than zero")]
    ZeroRankInterval,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server runtime failed: {0}")]
    Serve(#[source] std::io::Error),
}
