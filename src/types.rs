use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldBounds {
    pub width: i32,
    pub height: i32,
}

impl WorldBounds {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub score: u32,
    pub color: String,
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerMoved {
    pub id: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScoreUpdate {
    pub id: String,
    pub score: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    pub id: String,
    pub score: u32,
    pub color: String,
}

/// Outbound protocol messages. Each frame is `{"type": ..., "data": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    CurrentPlayers(BTreeMap<String, PlayerView>),
    CollectibleUpdate(Vec2),
    NewPlayer(PlayerView),
    PlayerMoved(PlayerMoved),
    ScoreUpdate(ScoreUpdate),
    PlayerDisconnected(String),
    RankUpdate(Vec<RankEntry>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

impl ServerMessage {
    pub fn queue_policy(&self) -> QueuePolicy {
        match self {
            ServerMessage::RankUpdate(_) => QueuePolicy::DropOnFull,
            _ => QueuePolicy::DisconnectOnFull,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Only(String),
    AllExcept(String),
    All,
}

impl Target {
    pub fn includes(&self, client_id: &str) -> bool {
        match self {
            Target::Only(id) => id == client_id,
            Target::AllExcept(id) => id != client_id,
            Target::All => true,
        }
    }
}

/// An outbound message together with who should receive it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub target: Target,
    pub message: ServerMessage,
}

impl Delivery {
    pub fn only(client_id: &str, message: ServerMessage) -> Self {
        Self {
            target: Target::Only(client_id.to_string()),
            message,
        }
    }

    pub fn all_except(client_id: &str, message: ServerMessage) -> Self {
        Self {
            target: Target::AllExcept(client_id.to_string()),
            message,
        }
    }

    pub fn all(message: ServerMessage) -> Self {
        Self {
            target: Target::All,
            message,
        }
    }
}
