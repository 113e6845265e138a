use crate::collision::try_collect;
use crate::movement::apply_intent;
use crate::ranking::build_rank_snapshot;
use crate::rng::{random_position, RandomSource};
use crate::session;
use crate::types::{Delivery, Direction, PlayerMoved, ScoreUpdate, ServerMessage, WorldBounds};
use crate::world::WorldStore;

/// Authoritative game state. Every operation returns the messages it
/// produced; nothing here performs I/O.
#[derive(Debug)]
pub struct Game<R> {
    world: WorldStore,
    rng: R,
}

impl<R: RandomSource> Game<R> {
    pub fn new(bounds: WorldBounds, mut rng: R) -> Self {
        let collectible = random_position(&mut rng, bounds.width, bounds.height);
        Self {
            world: WorldStore::new(bounds, collectible),
            rng,
        }
    }

    pub fn world(&self) -> &WorldStore {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldStore {
        &mut self.world
    }

    pub fn connect(&mut self, client_id: &str) -> Vec<Delivery> {
        session::connect(&mut self.world, client_id, &mut self.rng)
    }

    pub fn disconnect(&mut self, client_id: &str) -> Vec<Delivery> {
        session::disconnect(&mut self.world, client_id)
    }

    /// Resolves one movement intent. `None` stands for an unrecognized
    /// direction and, like an unknown player, changes nothing.
    pub fn apply_move(&mut self, client_id: &str, dir: Option<Direction>) -> Vec<Delivery> {
        let Some(dir) = dir else {
            return Vec::new();
        };
        let Some(pos) = apply_intent(&mut self.world, client_id, dir) else {
            return Vec::new();
        };

        let mut deliveries = Vec::with_capacity(3);
        if let Some(pickup) = try_collect(&mut self.world, client_id, &mut self.rng) {
            deliveries.push(Delivery::all(ServerMessage::ScoreUpdate(ScoreUpdate {
                id: pickup.player_id,
                score: pickup.score,
            })));
            deliveries.push(Delivery::all(ServerMessage::CollectibleUpdate(
                pickup.collectible,
            )));
        }
        deliveries.push(Delivery::all(ServerMessage::PlayerMoved(PlayerMoved {
            id: client_id.to_string(),
            x: pos.x,
            y: pos.y,
        })));
        deliveries
    }

    pub fn rank_tick(&self) -> Delivery {
        Delivery::all(ServerMessage::RankUpdate(build_rank_snapshot(&self.world)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::testing::ScriptedRandom;
    use crate::rng::Rng;
    use crate::types::{Target, Vec2};

    fn game_with(values: impl IntoIterator<Item = u32>) -> Game<ScriptedRandom> {
        Game::new(WorldBounds::new(800, 600), ScriptedRandom::new(values))
    }

    fn count_kind(deliveries: &[Delivery], kind: fn(&ServerMessage) -> bool) -> usize {
        deliveries.iter().filter(|d| kind(&d.message)).count()
    }

    #[test]
    fn unknown_direction_changes_nothing() {
        // collectible (700, 500), player at (100, 100)
        let mut game = game_with([700, 500, 100, 100, 0]);
        game.connect("a");
        let before = game.world().get("a").cloned();

        assert!(game.apply_move("a", None).is_empty());
        assert!(game.apply_move("a", Direction::parse("north")).is_empty());
        assert_eq!(game.world().get("a").cloned(), before);
    }

    #[test]
    fn move_for_missing_player_is_silent() {
        let mut game = game_with([700, 500, 100, 100, 0]);
        game.connect("a");
        game.disconnect("a");
        assert!(game.apply_move("a", Some(Direction::Left)).is_empty());
        assert!(game.world().is_empty());
    }

    #[test]
    fn clamped_move_still_reports_position() {
        let mut game = game_with([700, 500, 0, 0, 0]);
        game.connect("a");
        let deliveries = game.apply_move("a", Some(Direction::Up));
        assert_eq!(
            deliveries,
            vec![Delivery::all(ServerMessage::PlayerMoved(PlayerMoved {
                id: "a".into(),
                x: 0,
                y: 0,
            }))]
        );
    }

    #[test]
    fn five_steps_right_score_exactly_once() {
        // collectible (125, 100), player A at (100, 100), then relocation to (600, 400)
        let mut game = game_with([125, 100, 100, 100, 0x123456, 600, 400]);
        game.connect("A");

        let mut xs = Vec::new();
        let mut score_updates = Vec::new();
        let mut relocations = 0;
        for _ in 0..5 {
            let deliveries = game.apply_move("A", Some(Direction::Right));
            for delivery in &deliveries {
                assert_eq!(delivery.target, Target::All);
                match &delivery.message {
                    ServerMessage::PlayerMoved(moved) => xs.push(moved.x),
                    ServerMessage::ScoreUpdate(update) => {
                        score_updates.push((update.id.clone(), update.score, xs.len()))
                    }
                    ServerMessage::CollectibleUpdate(pos) => {
                        assert_eq!(*pos, Vec2 { x: 600, y: 400 });
                        relocations += 1;
                    }
                    other => panic!("unexpected message {other:?}"),
                }
            }
        }

        assert_eq!(xs, vec![105, 110, 115, 120, 125]);
        // scored on the second step, before its playerMoved was pushed
        assert_eq!(score_updates, vec![("A".to_string(), 10, 1)]);
        assert_eq!(relocations, 1);
        assert_eq!(game.world().get("A").map(|p| p.score), Some(10));
        assert_eq!(game.world().collectible(), Vec2 { x: 600, y: 400 });
    }

    #[test]
    fn scoring_only_touches_the_mover() {
        let mut game = game_with([125, 100, 105, 100, 1, 300, 300, 2, 10, 20]);
        game.connect("A");
        game.connect("B");
        let b_before = game.world().get("B").map(|p| p.score);

        let deliveries = game.apply_move("A", Some(Direction::Right));
        assert_eq!(
            count_kind(&deliveries, |m| matches!(m, ServerMessage::ScoreUpdate(_))),
            1
        );
        assert_eq!(game.world().get("A").map(|p| p.score), Some(10));
        assert_eq!(game.world().get("B").map(|p| p.score), b_before);
    }

    #[test]
    fn rank_tick_orders_by_score() {
        let mut game = game_with([0, 0]);
        for (id, score) in [("a", 10), ("b", 30), ("c", 20)] {
            game.connect(id);
            if let Some(player) = game.world_mut().get_mut(id) {
                player.score = score;
            }
        }
        let delivery = game.rank_tick();
        assert_eq!(delivery.target, Target::All);
        match delivery.message {
            ServerMessage::RankUpdate(entries) => {
                let scores: Vec<u32> = entries.iter().map(|e| e.score).collect();
                assert_eq!(scores, vec![30, 20, 10]);
            }
            other => panic!("expected rankUpdate, got {other:?}"),
        }
    }

    #[test]
    fn seeded_game_keeps_invariants_under_random_play() {
        let mut game = Game::new(WorldBounds::new(800, 600), Rng::new(5));
        let mut driver = Rng::new(6);
        let ids = ["p1", "p2", "p3"];
        for id in ids {
            game.connect(id);
        }
        let mut last_scores = vec![0u32; ids.len()];
        for _ in 0..20_000 {
            let idx = driver.below(ids.len() as u32) as usize;
            let dir = Direction::ALL[driver.below(4) as usize];
            game.apply_move(ids[idx], Some(dir));

            let collectible = game.world().collectible();
            assert!((0..800).contains(&collectible.x));
            assert!((0..600).contains(&collectible.y));
            for (slot, id) in ids.iter().enumerate() {
                let player = game.world().get(id).expect("still connected");
                assert!((0..=780).contains(&player.pos.x));
                assert!((0..=580).contains(&player.pos.y));
                assert!(player.score >= last_scores[slot]);
                last_scores[slot] = player.score;
            }
        }
    }
}
