//! Per-tick pipeline phases
//!
//! Each module owns one phase; `run_tick` runs them in order. Controller
//! decisions are applied by the engine before this is called.

pub mod actions;
pub mod consumption;
pub mod decay;
pub mod movement;
pub mod population;
pub mod predation;
pub mod separation;
pub mod split;
pub mod virus;

use bitvec::slice::BitSlice;
use tracing::trace;

use crate::game::collision::{Collider, CollisionDetector};
use crate::game::entity::Body;
use crate::game::player::{Player, PlayerId};
use crate::game::state::GameState;

/// Advance the simulation by one tick (everything after the decision phase)
pub fn run_tick(state: &mut GameState, detector: &CollisionDetector, dt: f32) {
    movement::steer_cells(state, dt);
    separation::resolve_self_collisions(state);
    consumption::consume_pellets_and_food(state, detector);
    split::auto_split(state);
    virus::collide_cells_with_viruses(state, detector);
    actions::apply_actions(state);
    split::recombine(state);
    decay::apply_decay(state);
    predation::resolve_predation(state, detector);
    movement::move_foods(state, dt);
    virus::feed_viruses(state, detector);
    population::regenerate(state);
    population::update_stats(state);

    trace!(
        tick = state.ticks,
        players = state.players.len(),
        pellets = state.pellets.len(),
        foods = state.foods.len(),
        viruses = state.viruses.len(),
        "tick complete"
    );
    state.ticks += 1;
}

/// Reference from a flattened collider back to its cell
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellRef {
    pub player: PlayerId,
    pub cell: usize,
}

/// Snapshot every living cell as a collider, with the way back to it
pub(crate) fn snapshot_cells(players: &[Player]) -> (Vec<Collider>, Vec<CellRef>) {
    let count: usize = players.iter().map(|p| p.cells.len()).sum();
    let mut colliders = Vec::with_capacity(count);
    let mut refs = Vec::with_capacity(count);
    for player in players {
        for (index, cell) in player.cells.iter().enumerate() {
            colliders.push(Collider::of(Some(player.id), cell));
            refs.push(CellRef {
                player: player.id,
                cell: index,
            });
        }
    }
    (colliders, refs)
}

/// Keep only the items whose bit is unset
pub(crate) fn retain_unmarked<T>(items: &mut Vec<T>, marked: &BitSlice) {
    let mut index = 0;
    items.retain(|_| {
        let keep = !marked[index];
        index += 1;
        keep
    });
}

/// Mass-weighted share of a displacement: the lighter body moves more
#[inline]
pub(crate) fn mass_share<B: Body>(moving: &B, other: &B) -> f32 {
    let total = moving.mass() as f32 + other.mass() as f32;
    if total > 0.0 {
        other.mass() as f32 / total
    } else {
        0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitvec::prelude::*;

    #[test]
    fn test_retain_unmarked() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        let mut marked = bitvec![0; 4];
        marked.set(1, true);
        marked.set(3, true);
        retain_unmarked(&mut items, &marked);
        assert_eq!(items, vec!['a', 'c']);
    }
}
