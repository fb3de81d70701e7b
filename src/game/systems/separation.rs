//! Keeps a player's own cells from overlapping until they may merge
//!
//! Up to `SELF_COLLISION_PASSES` relaxation passes. Each overlapping pair
//! gets an elastic exchange of split impulse along the contact normal and a
//! mass-weighted positional push. A cell held by the arena wall passes the
//! part of its push it could not take on to its partner. Whatever overlap
//! survives the relaxation is removed by direct pushback sweeps that move
//! positions only.

use crate::config::GameConfig;
use crate::game::constants::timing;
use crate::game::entity::{Body, Cell};
use crate::game::spatial::SpatialGrid;
use crate::game::state::{clamp_to_arena, GameState};
use crate::game::systems::mass_share;
use crate::util::vec2::Vec2;

pub fn resolve_self_collisions(state: &mut GameState) {
    let GameState {
        config, players, ..
    } = state;

    for player in players.iter_mut().filter(|p| p.cells.len() > 1) {
        for _ in 0..timing::SELF_COLLISION_PASSES {
            if !relax_pass(&mut player.cells, config) {
                break;
            }
        }
        for _ in 0..timing::RESIDUAL_PUSHBACK_SWEEPS {
            if !pushback_sweep(&mut player.cells, config) {
                break;
            }
        }
    }
}

/// Positional pushback for every sibling pair still overlapping; returns
/// whether anything moved
///
/// Positions shift between pairs, so this scans all pairs instead of a grid
/// built up front.
fn pushback_sweep(cells: &mut [Cell], config: &GameConfig) -> bool {
    let mut moved = false;
    for j in 1..cells.len() {
        for i in 0..j {
            let (a, b) = pair_mut(cells, i, j);
            if a.can_recombine() && b.can_recombine() {
                continue;
            }
            let (normal, distance) = contact_normal(a, b);
            let overlap = a.radius() + b.radius() - distance;
            if overlap <= timing::RESIDUAL_OVERLAP_TOLERANCE {
                continue;
            }
            push_apart(a, b, normal, overlap, config);
            moved = true;
        }
    }
    moved
}

/// One pass over all sibling pairs; returns whether anything moved
fn relax_pass(cells: &mut [Cell], config: &GameConfig) -> bool {
    let max_radius = cells.iter().map(|c| c.radius()).fold(0.0, f32::max);
    let mut grid = SpatialGrid::new(2.0 * max_radius);
    for (index, cell) in cells.iter().enumerate() {
        grid.insert(index, cell.position);
    }

    let mut moved = false;
    for (i, j) in grid.potential_pairs() {
        let (a, b) = pair_mut(cells, i, j);
        if a.can_recombine() && b.can_recombine() {
            continue;
        }
        if !a.touches_with_margin(&*b, timing::SELF_COLLISION_MARGIN) {
            continue;
        }
        separate(a, b, config);
        moved = true;
    }
    moved
}

fn separate(a: &mut Cell, b: &mut Cell, config: &GameConfig) {
    let (normal, distance) = contact_normal(a, b);

    elastic_response(a, b, normal);

    let overlap = a.radius() + b.radius() - distance;
    if overlap > 0.0 {
        push_apart(a, b, normal, overlap, config);
    }
}

/// Unit vector from `a` to `b` and their distance; coincident cells use +x
fn contact_normal(a: &Cell, b: &Cell) -> (Vec2, f32) {
    let (dir, len) = (b.position - a.position).normalize_with_length();
    if len > 0.0 {
        (dir, len)
    } else {
        (Vec2::RIGHT, 0.0)
    }
}

/// Mass-weighted push along `normal` that removes `overlap`
fn push_apart(a: &mut Cell, b: &mut Cell, normal: Vec2, overlap: f32, config: &GameConfig) {
    let push_a = -normal * (overlap * mass_share(&*a, &*b));
    let push_b = normal * (overlap * mass_share(&*b, &*a));

    let wanted_a = a.position + push_a;
    a.position = clamp_to_arena(config, wanted_a, a.radius());
    let wanted_b = b.position + push_b + (a.position - wanted_a);
    b.position = clamp_to_arena(config, wanted_b, b.radius());

    // b pinned: a takes what b could not
    let shortfall_b = b.position - wanted_b;
    if shortfall_b.length_sq() > 0.0 {
        a.position = clamp_to_arena(config, a.position + shortfall_b, a.radius());
    }
}

/// 1-D elastic collision along the normal, applied to the split impulse
fn elastic_response(a: &mut Cell, b: &mut Cell, normal: Vec2) {
    let va = a.splitting_velocity.dot(normal);
    let vb = b.splitting_velocity.dot(normal);
    // Already separating
    if va - vb <= 0.0 {
        return;
    }
    let (ma, mb) = (a.mass() as f32, b.mass() as f32);
    let total = ma + mb;
    let va_after = ((ma - mb) * va + 2.0 * mb * vb) / total;
    let vb_after = ((mb - ma) * vb + 2.0 * ma * va) / total;
    a.splitting_velocity += normal * (va_after - va);
    b.splitting_velocity += normal * (vb_after - vb);
}

/// Two distinct mutable elements, `i < j`
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}
