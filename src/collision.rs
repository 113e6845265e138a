use crate::constants::{COLLECTIBLE_SIZE, COLLECT_REWARD, PLAYER_SIZE};
use crate::rng::{random_position, RandomSource};
use crate::types::Vec2;
use crate::world::WorldStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pickup {
    pub player_id: String,
    pub score: u32,
    pub collectible: Vec2,
}

/// Strict AABB overlap between a player box and the collectible box.
/// Boxes that only share an edge do not overlap.
pub fn overlaps(player: Vec2, collectible: Vec2) -> bool {
    player.x < collectible.x + COLLECTIBLE_SIZE
        && player.x + PLAYER_SIZE > collectible.x
        && player.y < collectible.y + COLLECTIBLE_SIZE
        && player.y + PLAYER_SIZE > collectible.y
}

/// Awards the player and relocates the collectible if the player touches it.
///
/// The new collectible position is drawn over the whole world, without
/// subtracting its own size, so it may hang over the far edges.
pub fn try_collect<R: RandomSource + ?Sized>(
    store: &mut WorldStore,
    player_id: &str,
    rng: &mut R,
) -> Option<Pickup> {
    let collectible = store.collectible();
    let bounds = store.bounds();
    let player = store.get_mut(player_id)?;
    if !overlaps(player.pos, collectible) {
        return None;
    }
    player.score = player.score.saturating_add(COLLECT_REWARD);
    let score = player.score;

    let relocated = random_position(rng, bounds.width, bounds.height);
    store.set_collectible(relocated);
    Some(Pickup {
        player_id: player_id.to_string(),
        score,
        collectible: relocated,
    })
}
