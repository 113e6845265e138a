use crate::types::RankEntry;
use crate::world::WorldStore;

/// Leaderboard ordered by score, highest first.
///
/// Recomputed from scratch on every call. Equal scores keep connection
/// order because the sort is stable over the store's join-ordered players.
pub fn build_rank_snapshot(store: &WorldStore) -> Vec<RankEntry> {
    let mut entries: Vec<RankEntry> = store
        .all_entities()
        .iter()
        .map(|player| RankEntry {
            id: player.id.clone(),
            score: player.score,
            color: player.color.clone(),
        })
        .collect();
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries
}
