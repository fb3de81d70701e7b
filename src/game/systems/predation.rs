//! Cells eating other players' cells
//!
//! One collision pass over a snapshot of every living cell. Predators are
//! resolved heaviest first (ties by snapshot order); each victim is eaten
//! once and an eaten cell eats nothing.

use bitvec::prelude::*;

use crate::game::collision::CollisionDetector;
use crate::game::constants::{mass, Mass};
use crate::game::state::GameState;
use crate::game::systems::{retain_unmarked, snapshot_cells, CellRef};

pub fn resolve_predation(state: &mut GameState, detector: &CollisionDetector) {
    let (colliders, refs) = snapshot_cells(&state.players);
    let hits = detector.solve(&colliders, &colliders);
    if hits.is_empty() {
        return;
    }

    let mut order: Vec<usize> = hits
        .keys()
        .copied()
        .filter(|&q| colliders[q].mass > mass::CELL_EAT_REQUIREMENT)
        .collect();
    order.sort_by(|&a, &b| colliders[b].mass.cmp(&colliders[a].mass).then(a.cmp(&b)));

    let mut eaten = bitvec![0; colliders.len()];
    let mut gains: Vec<(CellRef, Mass, u64)> = Vec::new();
    for predator in order {
        if eaten[predator] {
            continue;
        }
        let mut gained: Mass = 0;
        let mut count = 0;
        for hit in &hits[&predator] {
            if eaten[hit.victim] {
                continue;
            }
            eaten.set(hit.victim, true);
            gained += colliders[hit.victim].mass;
            count += 1;
        }
        if count > 0 {
            gains.push((refs[predator], gained, count));
        }
    }

    for (CellRef { player, cell }, gained, count) in gains {
        let player = &mut state.players[player as usize];
        player.cells[cell].grow(gained);
        player.stats.cells_eaten += count;
    }

    // Split the flat mask back into per-player masks
    let mut offset = 0;
    for player in state.players.iter_mut() {
        let len = player.cells.len();
        retain_unmarked(&mut player.cells, &eaten[offset..offset + len]);
        offset += len;
    }
}
