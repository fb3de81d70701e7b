//! Splitting (forced and voluntary) and recombination of sibling cells

use bitvec::prelude::*;
use tracing::debug;

use crate::config::RuleConfig;
use crate::game::constants::split_speed;
use crate::game::entity::{Body, Cell, EntityId};
use crate::game::player::Player;
use crate::game::state::{GameState, IdAllocator};
use crate::game::systems::retain_unmarked;
use crate::util::vec2::Vec2;

/// Halve `cell` and return the launched half
///
/// The new half gets `mass / 2` and spawns on the rim toward `direction`,
/// carrying the split speed as both its steering and split impulse. Both
/// halves restart their recombine timer.
pub fn split_cell(cell: &mut Cell, direction: Vec2, id: EntityId, rules: &RuleConfig) -> Cell {
    let total = cell.mass();
    let launched_mass = total / 2;
    cell.set_mass(total - launched_mass, rules);
    cell.reset_recombine_timer(rules);

    let speed = split_speed(launched_mass);
    let mut launched = Cell::new(
        id,
        cell.position + direction * cell.radius(),
        launched_mass,
        rules,
    );
    launched.velocity = direction * speed;
    launched.splitting_velocity = direction * speed;
    launched.reset_recombine_timer(rules);
    launched
}

/// Split every eligible cell of `player` toward its target, bounded by the
/// cell budget. Returns the number of new cells.
pub fn split_player(player: &mut Player, ids: &mut IdAllocator, rules: &RuleConfig) -> usize {
    let target = player.target;
    let existing = player.cells.len();
    let mut created = 0;
    for index in 0..existing {
        if player.cell_budget(rules) == 0 {
            break;
        }
        let cell = &mut player.cells[index];
        if cell.mass() < rules.split_min_mass {
            continue;
        }
        let direction = cell.heading_to(target);
        let launched = split_cell(cell, direction, ids.next_id(), rules);
        player.cells.push(launched);
        created += 1;
    }
    created
}

/// Cells above the mass cap split when there is budget, otherwise they are
/// clamped down.
pub fn auto_split(state: &mut GameState) {
    let GameState {
        config,
        players,
        ids,
        ..
    } = state;
    let rules = &config.rules;

    for player in players.iter_mut() {
        let existing = player.cells.len();
        for index in 0..existing {
            if player.cells[index].mass() <= rules.cell_max_mass {
                continue;
            }
            if player.cell_budget(rules) > 0 {
                let cell = &mut player.cells[index];
                let direction = cell.heading_to(player.target);
                let launched = split_cell(cell, direction, ids.next_id(), rules);
                player.cells.push(launched);
            } else {
                player.cells[index].set_mass(rules.cell_clamp_mass, rules);
            }
        }
    }
}

/// Merge touching siblings whose timers have both expired
pub fn recombine(state: &mut GameState) {
    for player in state.players.iter_mut().filter(|p| p.cells.len() > 1) {
        let merged = merge_siblings(&mut player.cells);
        if merged > 0 {
            debug!(player = player.id, merged, "cells recombined");
        }
    }
}

fn merge_siblings(cells: &mut Vec<Cell>) -> usize {
    let mut absorbed = bitvec![0; cells.len()];
    let mut merged = 0;
    for i in 0..cells.len() {
        if absorbed[i] || !cells[i].can_recombine() {
            continue;
        }
        for j in 0..cells.len() {
            if j == i || absorbed[j] || !cells[j].can_recombine() {
                continue;
            }
            if cells[i].touches(&cells[j]) {
                let gained = cells[j].mass();
                cells[i].grow(gained);
                absorbed.set(j, true);
                merged += 1;
            }
        }
    }
    retain_unmarked(cells, &absorbed);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::constants::mass;

    fn player_with(masses: &[u32], rules: &RuleConfig) -> Player {
        let mut player = Player::new(0, "p".into(), false, 0);
        for (i, &m) in masses.iter().enumerate() {
            player.cells.push(Cell::new(
                i as u64,
                Vec2::new(100.0 + i as f32 * 50.0, 100.0),
                m,
                rules,
            ));
        }
        player.target = Vec2::new(400.0, 100.0);
        player
    }

    #[test]
    fn test_split_conserves_mass() {
        let rules = RuleConfig::default();
        let mut ids = IdAllocator::default();
        for mass in [35, 36, 101, 4000] {
            let mut player = player_with(&[mass], &rules);
            let created = split_player(&mut player, &mut ids, &rules);
            assert_eq!(created, 1);
            assert_eq!(player.cells.len(), 2);
            assert_eq!(player.total_mass(), mass);
            assert_eq!(player.cells[1].mass(), mass / 2);
            assert!(player.cells.iter().all(|c| c.recombine_timer == rules.recombine_ticks));
            // Launched toward the target
            assert!(player.cells[1].splitting_velocity.x > 0.0);
        }
    }

    #[test]
    fn test_split_below_minimum_is_noop() {
        let rules = RuleConfig::default();
        let mut ids = IdAllocator::default();
        let mut player = player_with(&[rules.split_min_mass - 1], &rules);
        let before = player.clone();
        assert_eq!(split_player(&mut player, &mut ids, &rules), 0);
        assert_eq!(player, before);
    }

    #[test]
    fn test_split_respects_cell_limit() {
        let rules = RuleConfig::default();
        let mut ids = IdAllocator::default();
        let mut player = player_with(&[100; 23], &rules);
        assert_eq!(split_player(&mut player, &mut ids, &rules), 2);
        assert_eq!(player.cells.len(), rules.player_cell_limit);
        assert_eq!(player.total_mass(), 2300);
    }

    #[test]
    fn test_auto_split_and_clamp() {
        let mut state = GameState::new(GameConfig {
            target_pellets: 0,
            target_viruses: 0,
            ..GameConfig::default()
        });
        state.add_player("big", false);
        let rules = state.config().rules.clone();
        state.players[0].cells[0].set_mass(mass::CELL_MAX + 100, &rules);
        auto_split(&mut state);
        assert_eq!(state.players[0].cells.len(), 2);
        assert_eq!(state.players[0].total_mass(), mass::CELL_MAX + 100);

        // No budget: clamped instead
        let mut full = player_with(&vec![50; rules.player_cell_limit], &rules);
        full.cells[0].set_mass(mass::CELL_MAX + 1, &rules);
        full.id = 1;
        state.players.push(full);
        auto_split(&mut state);
        assert_eq!(state.players[1].cells.len(), rules.player_cell_limit);
        assert_eq!(state.players[1].cells[0].mass(), rules.cell_clamp_mass);
    }

    #[test]
    fn test_recombine_requires_expired_timers() {
        let rules = RuleConfig::default();
        let mut cells = vec![
            Cell::new(0, Vec2::new(100.0, 100.0), 100, &rules),
            Cell::new(1, Vec2::new(105.0, 100.0), 60, &rules),
            Cell::new(2, Vec2::new(300.0, 300.0), 40, &rules),
        ];
        cells[1].recombine_timer = 5;
        assert_eq!(merge_siblings(&mut cells), 0);
        assert_eq!(cells.len(), 3);

        cells[1].recombine_timer = 0;
        assert_eq!(merge_siblings(&mut cells), 1);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].mass(), 160);
        assert_eq!(cells[1].id, 2);
    }
}
