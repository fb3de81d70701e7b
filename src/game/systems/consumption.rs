//! Cells absorbing pellets and ejected food

use bitvec::prelude::*;

use crate::game::collision::{Collider, CollisionDetector};
use crate::game::constants::mass;
use crate::game::entity::Body;
use crate::game::state::GameState;
use crate::game::systems::{retain_unmarked, snapshot_cells, CellRef};

/// Every living cell eats the pellets and food it overlaps; each item goes
/// to the first cell (in player, then cell order) that reaches it.
pub fn consume_pellets_and_food(state: &mut GameState, detector: &CollisionDetector) {
    let (queries, refs) = snapshot_cells(&state.players);
    if queries.is_empty() {
        return;
    }

    let pellets: Vec<Collider> = state.pellets.iter().map(|p| Collider::of(None, p)).collect();
    let eaten_pellets = absorb(state, detector, &queries, &refs, &pellets, mass::PELLET);
    retain_unmarked(&mut state.pellets, &eaten_pellets);

    let foods: Vec<Collider> = state.foods.iter().map(|f| Collider::of(None, f)).collect();
    let eaten_foods = absorb(state, detector, &queries, &refs, &foods, mass::FOOD);
    retain_unmarked(&mut state.foods, &eaten_foods);
}

fn absorb(
    state: &mut GameState,
    detector: &CollisionDetector,
    queries: &[Collider],
    refs: &[CellRef],
    gallery: &[Collider],
    item_mass: u32,
) -> BitVec {
    let mut eaten = bitvec![0; gallery.len()];
    for (query, hits) in detector.solve(queries, gallery) {
        let CellRef { player, cell } = refs[query];
        let Some(player) = state.players.get_mut(player as usize) else {
            continue;
        };
        let Some(cell) = player.cells.get_mut(cell) else {
            continue;
        };
        // Food is only worth eating for cells heavier than it
        if cell.mass() <= item_mass {
            continue;
        }
        for hit in hits {
            if eaten[hit.victim] {
                continue;
            }
            eaten.set(hit.victim, true);
            cell.grow(item_mass);
            player.stats.food_eaten += 1;
        }
    }
    eaten
}
