use std::collections::BTreeMap;

use crate::constants::PLAYER_SIZE;
use crate::types::{PlayerView, Vec2, WorldBounds};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub pos: Vec2,
    pub score: u32,
    pub color: String,
}

impl Player {
    pub fn new(id: impl Into<String>, pos: Vec2, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pos,
            score: 0,
            color: color.into(),
        }
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id.clone(),
            x: self.pos.x,
            y: self.pos.y,
            score: self.score,
            color: self.color.clone(),
            width: PLAYER_SIZE,
            height: PLAYER_SIZE,
        }
    }
}

/// Authoritative in-memory state: connected players and the collectible.
///
/// Players are kept in connection order, which is also the leaderboard
/// tie-break order. Callers are responsible for broadcasting changes.
#[derive(Clone, Debug)]
pub struct WorldStore {
    bounds: WorldBounds,
    players: Vec<Player>,
    collectible: Vec2,
}

impl WorldStore {
    pub fn new(bounds: WorldBounds, collectible: Vec2) -> Self {
        Self {
            bounds,
            players: Vec::new(),
            collectible,
        }
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Replaces the player with the same id in place, or appends a new one.
    pub fn upsert(&mut self, player: Player) {
        match self.get_mut(&player.id) {
            Some(existing) => *existing = player,
            None => self.players.push(player),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Player> {
        let index = self.players.iter().position(|player| player.id == id)?;
        Some(self.players.remove(index))
    }

    pub fn all_entities(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn collectible(&self) -> Vec2 {
        self.collectible
    }

    pub fn set_collectible(&mut self, pos: Vec2) {
        self.collectible = pos;
    }

    pub fn snapshot(&self) -> BTreeMap<String, PlayerView> {
        self.players
            .iter()
            .map(|player| (player.id.clone(), player.view()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> WorldStore {
        WorldStore::new(WorldBounds::new(800, 600), Vec2 { x: 10, y: 20 })
    }

    #[test]
    fn upsert_inserts_then_replaces_in_place() {
        let mut store = store();
        store.upsert(Player::new("a", Vec2 { x: 1, y: 1 }, "#000001"));
        store.upsert(Player::new("b", Vec2 { x: 2, y: 2 }, "#000002"));

        let mut moved = store.get("a").cloned().expect("a exists");
        moved.pos = Vec2 { x: 50, y: 60 };
        store.upsert(moved);

        let ids: Vec<&str> = store.all_entities().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.get("a").map(|p| p.pos), Some(Vec2 { x: 50, y: 60 }));
    }

    #[test]
    fn remove_returns_player_and_forgets_it() {
        let mut store = store();
        store.upsert(Player::new("a", Vec2 { x: 1, y: 1 }, "#000001"));
        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
        assert!(store.get("a").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn collectible_is_a_singleton() {
        let mut store = store();
        assert_eq!(store.collectible(), Vec2 { x: 10, y: 20 });
        store.set_collectible(Vec2 { x: 300, y: 400 });
        assert_eq!(store.collectible(), Vec2 { x: 300, y: 400 });
    }

    #[test]
    fn snapshot_is_keyed_by_id() {
        let mut store = store();
        store.upsert(Player::new("b", Vec2 { x: 3, y: 4 }, "#abcdef"));
        let snapshot = store.snapshot();
        let view = snapshot.get("b").expect("b in snapshot");
        assert_eq!(view.x, 3);
        assert_eq!(view.width, PLAYER_SIZE);
        assert_eq!(view.color, "#abcdef");
    }
}
