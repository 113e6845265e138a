pub const DEFAULT_WORLD_WIDTH: i32 = 800;
pub const DEFAULT_WORLD_HEIGHT: i32 = 600;

/// Largest accepted world side. Keeps every coordinate sum well inside `i32`.
pub const MAX_WORLD_DIMENSION: i32 = 1_000_000;

pub const PLAYER_SIZE: i32 = 20;
pub const COLLECTIBLE_SIZE: i32 = 15;

pub const MOVE_STEP: i32 = 5;
pub const COLLECT_REWARD: u32 = 10;

pub const RANK_INTERVAL_MS: u64 = 1_000;

pub const EVENT_QUEUE_CAPACITY: usize = 1_024;
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Exclusive upper bound for the 24-bit display color.
pub const COLOR_RANGE: u32 = 0xFF_FFFF;
