use crate::constants::PLAYER_SIZE;
use crate::rng::{random_color, random_position, RandomSource};
use crate::types::{Delivery, ServerMessage};
use crate::world::{Player, WorldStore};

/// Seeds a new player and builds the join handshake.
///
/// The new client gets the full roster (itself included) and the collectible
/// position; everybody else gets the new player's record. A client id that is
/// already present is ignored.
pub fn connect<R: RandomSource + ?Sized>(
    store: &mut WorldStore,
    client_id: &str,
    rng: &mut R,
) -> Vec<Delivery> {
    if store.contains(client_id) {
        return Vec::new();
    }

    let bounds = store.bounds();
    let pos = random_position(
        rng,
        bounds.width - PLAYER_SIZE + 1,
        bounds.height - PLAYER_SIZE + 1,
    );
    let player = Player::new(client_id, pos, random_color(rng));
    let view = player.view();
    store.upsert(player);

    vec![
        Delivery::only(client_id, ServerMessage::CurrentPlayers(store.snapshot())),
        Delivery::only(
            client_id,
            ServerMessage::CollectibleUpdate(store.collectible()),
        ),
        Delivery::all_except(client_id, ServerMessage::NewPlayer(view)),
    ]
}

/// Removes the player; unknown ids produce nothing.
pub fn disconnect(store: &mut WorldStore, client_id: &str) -> Vec<Delivery> {
    match store.remove(client_id) {
        Some(player) => vec![Delivery::all(ServerMessage::PlayerDisconnected(player.id))],
        None => Vec::new(),
    }
}
