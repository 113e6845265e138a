use crate::constants::{MOVE_STEP, PLAYER_SIZE};
use crate::types::{Direction, Vec2, WorldBounds};
use crate::world::WorldStore;

/// One step from `pos`, clamped so the player box stays inside the world.
pub fn resolve_step(bounds: WorldBounds, pos: Vec2, dir: Direction) -> Vec2 {
    let max_x = (bounds.width - PLAYER_SIZE).max(0);
    let max_y = (bounds.height - PLAYER_SIZE).max(0);
    match dir {
        Direction::Up => Vec2 {
            x: pos.x,
            y: (pos.y - MOVE_STEP).clamp(0, max_y),
        },
        Direction::Down => Vec2 {
            x: pos.x,
            y: (pos.y + MOVE_STEP).clamp(0, max_y),
        },
        Direction::Left => Vec2 {
            x: (pos.x - MOVE_STEP).clamp(0, max_x),
            y: pos.y,
        },
        Direction::Right => Vec2 {
            x: (pos.x + MOVE_STEP).clamp(0, max_x),
            y: pos.y,
        },
    }
}

/// Applies a movement intent to the stored player.
///
/// Returns the new position, or `None` when the player is gone.
pub fn apply_intent(store: &mut WorldStore, player_id: &str, dir: Direction) -> Option<Vec2> {
    let bounds = store.bounds();
    let player = store.get_mut(player_id)?;
    player.pos = resolve_step(bounds, player.pos, dir);
    Some(player.pos)
}
