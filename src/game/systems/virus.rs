//! Cell/virus and food/virus interaction
//!
//! A cell heavy enough to eat a virus either swallows it (players with enough
//! big cells) or is disrupted: roughly half its mass pops off in
//! `POP_SIZE` granules and is scattered as fragments around the virus.

use std::f32::consts::TAU;

use bitvec::prelude::*;
use rand::Rng;
use tracing::debug;

use crate::config::RuleConfig;
use crate::game::collision::{Collider, CollisionDetector};
use crate::game::constants::{max_speed, split, Mass};
use crate::game::entity::{Body, Cell, Virus};
use crate::game::player::Player;
use crate::game::state::{GameState, IdAllocator};
use crate::game::systems::{retain_unmarked, snapshot_cells, CellRef};
use crate::util::vec2::Vec2;

/// Each cell hits at most one virus, and each virus is consumed at most once
pub fn collide_cells_with_viruses(state: &mut GameState, detector: &CollisionDetector) {
    let (queries, refs) = snapshot_cells(&state.players);
    let gallery: Vec<Collider> = state.viruses.iter().map(|v| Collider::of(None, v)).collect();
    let hits = detector.solve(&queries, &gallery);
    if hits.is_empty() {
        return;
    }

    let GameState {
        config,
        players,
        viruses,
        ids,
        rng,
        ticks,
        ..
    } = state;
    let rules = &config.rules;

    let mut consumed = bitvec![0; viruses.len()];
    for (query, found) in hits {
        let Some(hit) = found.iter().find(|h| !consumed[h.victim]) else {
            continue;
        };
        consumed.set(hit.victim, true);
        let virus = viruses[hit.victim];
        let CellRef { player, cell } = refs[query];
        let Some(player) = players.get_mut(player as usize) else {
            continue;
        };

        player.record_virus_hit(*ticks);
        if player.can_eat_viruses(rules) {
            player.cells[cell].grow(virus.mass);
            continue;
        }
        let angle = rng.gen_range(0.0..TAU);
        let fragments = disrupt(player, cell, &virus, angle, ids, rules);
        debug!(
            player = player.id,
            fragments,
            virus = virus.id,
            "cell disrupted by virus"
        );
    }

    retain_unmarked(viruses, &consumed);
}

/// Pop `player.cells[index]` on `virus`; returns the number of fragments
///
/// With no cell budget or nothing to pop, the cell absorbs the virus
/// instead.
pub fn disrupt(
    player: &mut Player,
    index: usize,
    virus: &Virus,
    base_angle: f32,
    ids: &mut IdAllocator,
    rules: &RuleConfig,
) -> usize {
    let budget = player.cell_budget(rules);
    let cell = &mut player.cells[index];
    let mass = cell.mass();
    let loss = mass - mass / split::POP_REDUCTION;
    let popped = loss - loss % split::POP_SIZE;
    let count = ((popped / split::POP_SIZE) as usize).min(budget);

    if count == 0 {
        cell.grow(virus.mass);
        return 0;
    }

    cell.set_mass(mass - popped, rules);
    cell.reset_recombine_timer(rules);

    let speed = max_speed(split::POP_SIZE);
    let share = popped / count as Mass;
    let remainder = (popped % count as Mass) as usize;
    for c in 0..count {
        let fragment_mass = share + Mass::from(c < remainder);
        let angle = base_angle + TAU * c as f32 / count as f32;
        let mut fragment = Cell::new(ids.next_id(), virus.position, fragment_mass, rules);
        fragment.splitting_velocity = Vec2::from_polar(angle, speed);
        fragment.reset_recombine_timer(rules);
        player.cells.push(fragment);
    }
    count
}

/// Viruses absorb the food they overlap; at the hit threshold a virus resets
/// and a new one appears where the food landed.
pub fn feed_viruses(state: &mut GameState, detector: &CollisionDetector) {
    if state.foods.is_empty() || state.viruses.is_empty() {
        return;
    }
    let queries: Vec<Collider> = state.viruses.iter().map(|v| Collider::of(None, v)).collect();
    let gallery: Vec<Collider> = state.foods.iter().map(|f| Collider::of(None, f)).collect();
    let hits = detector.solve(&queries, &gallery);

    let threshold = state.config.rules.virus_food_hit_threshold;
    let mut eaten = bitvec![0; gallery.len()];
    let mut bursts = Vec::new();
    for (query, found) in hits {
        for hit in found {
            if eaten[hit.victim] {
                continue;
            }
            eaten.set(hit.victim, true);
            if state.viruses[query].absorb_food(threshold) {
                bursts.push(state.foods[hit.victim].position);
            }
        }
    }

    retain_unmarked(&mut state.foods, &eaten);
    for position in bursts {
        debug!(x = position.x, y = position.y, "virus burst");
        state.spawn_virus_at(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::constants::mass;
    use crate::game::entity::Food;

    fn setup() -> (GameState, CollisionDetector) {
        let config = GameConfig {
            target_pellets: 0,
            target_viruses: 0,
            ..GameConfig::default()
        };
        let detector = CollisionDetector::from_config(&config);
        let mut state = GameState::new(config);
        state.add_player("a", false);
        (state, detector)
    }

    #[test]
    fn test_disrupt_conserves_mass() {
        let rules = RuleConfig::default();
        let virus = Virus::new(7, Vec2::new(200.0, 200.0));
        for mass in [150, 199, 400, 1001, 5000] {
            let mut ids = IdAllocator::default();
            let mut player = Player::new(0, "p".into(), false, 0);
            player
                .cells
                .push(Cell::new(0, Vec2::new(200.0, 200.0), mass, &rules));
            let count = disrupt(&mut player, 0, &virus, 0.0, &mut ids, &rules);

            let loss = mass - mass / 2;
            let popped = loss - loss % 25;
            let expected = ((popped / 25) as usize).min(rules.player_cell_limit - 1);
            assert_eq!(count, expected);
            assert_eq!(player.cells.len(), 1 + count);
            assert_eq!(player.total_mass(), mass);
            assert_eq!(player.cells[0].mass(), mass - popped);
            assert!(player.cells.iter().all(|c| c.mass() >= rules.cell_min_mass));
        }
    }

    #[test]
    fn test_disrupt_without_budget_absorbs() {
        let rules = RuleConfig::default();
        let virus = Virus::new(7, Vec2::ZERO);
        let mut ids = IdAllocator::default();
        let mut player = Player::new(0, "p".into(), false, 0);
        for i in 0..rules.player_cell_limit {
            player
                .cells
                .push(Cell::new(i as u64, Vec2::ZERO, 300, &rules));
        }
        assert_eq!(disrupt(&mut player, 0, &virus, 0.0, &mut ids, &rules), 0);
        assert_eq!(player.cells[0].mass(), 300 + mass::VIRUS_BASE);
    }

    #[test]
    fn test_fragments_fan_out() {
        let rules = RuleConfig::default();
        let virus = Virus::new(7, Vec2::new(50.0, 50.0));
        let mut ids = IdAllocator::default();
        let mut player = Player::new(0, "p".into(), false, 0);
        player.cells.push(Cell::new(0, Vec2::new(50.0, 50.0), 400, &rules));
        let count = disrupt(&mut player, 0, &virus, 0.0, &mut ids, &rules);
        assert_eq!(count, 8);
        let sum = player.cells[1..]
            .iter()
            .fold(Vec2::ZERO, |acc, c| acc + c.splitting_velocity);
        assert!(sum.length() < 1e-2);
        assert!(player.cells[1..].iter().all(|c| c.position == virus.position));
        let speed = max_speed(split::POP_SIZE);
        assert!(player.cells[1..]
            .iter()
            .all(|c| (c.splitting_velocity.length() - speed).abs() < 1e-3));
    }

    #[test]
    fn test_disrupt_conserves_mass_at_granule_floor() {
        let config = GameConfig {
            rules: RuleConfig {
                cell_min_mass: split::POP_SIZE,
                split_min_mass: 2 * split::POP_SIZE,
                ..RuleConfig::default()
            },
            ..GameConfig::default()
        };
        config.validate().unwrap();
        let rules = &config.rules;
        let virus = Virus::new(7, Vec2::new(200.0, 200.0));
        for mass in [160, 400, 1234] {
            let mut ids = IdAllocator::default();
            let mut player = Player::new(0, "p".into(), false, 0);
            player
                .cells
                .push(Cell::new(0, Vec2::new(200.0, 200.0), mass, rules));
            let count = disrupt(&mut player, 0, &virus, 0.0, &mut ids, rules);
            assert!(count > 0);
            assert_eq!(player.total_mass(), mass);
            assert!(player.cells[1..].iter().all(|c| c.mass() >= split::POP_SIZE));
        }
    }

    #[test]
    fn test_cell_pops_on_virus() {
        let (mut state, detector) = setup();
        let rules = state.config().rules.clone();
        state.players[0].cells[0].set_mass(400, &rules);
        state.players[0].cells[0].position = Vec2::new(250.0, 250.0);
        state.spawn_virus_at(Vec2::new(251.0, 250.0));
        let before = state.total_mass();

        collide_cells_with_viruses(&mut state, &detector);

        assert!(state.viruses.is_empty());
        assert_eq!(state.players[0].cells.len(), 9);
        assert_eq!(state.players[0].stats.viruses_eaten, 1);
        assert_eq!(state.players[0].virus_eaten_ticks.as_slice(), &[0]);
        // Disruption keeps the cell's mass; the virus leaves the arena
        assert_eq!(state.total_mass(), before - mass::VIRUS_BASE as u64);
    }

    #[test]
    fn test_small_cell_ignores_virus() {
        let (mut state, detector) = setup();
        let position = state.players[0].cells[0].position;
        state.spawn_virus_at(position);
        collide_cells_with_viruses(&mut state, &detector);
        assert_eq!(state.viruses.len(), 1);
        assert_eq!(state.players[0].cells.len(), 1);
    }

    #[test]
    fn test_virus_consumed_once() {
        let (mut state, detector) = setup();
        state.add_player("b", false);
        let rules = state.config().rules.clone();
        for p in 0..2 {
            state.players[p].cells[0].set_mass(400, &rules);
            state.players[p].cells[0].position = Vec2::new(250.0, 250.0);
        }
        state.spawn_virus_at(Vec2::new(250.0, 250.0));
        collide_cells_with_viruses(&mut state, &detector);
        assert_eq!(state.players[0].cells.len(), 9);
        assert_eq!(state.players[1].cells.len(), 1);
        assert_eq!(state.players[1].stats.viruses_eaten, 0);
    }

    #[test]
    fn test_virus_bursts_after_threshold_food_hits() {
        let (mut state, detector) = setup();
        let impact = Vec2::new(300.0, 300.0);
        state.spawn_virus_at(impact);
        let threshold = state.config().rules.virus_food_hit_threshold;
        for i in 0..threshold {
            state
                .foods
                .push(Food::new(1000 + i as u64, impact, Vec2::ZERO));
        }

        feed_viruses(&mut state, &detector);

        assert!(state.foods.is_empty());
        assert_eq!(state.viruses.len(), 2);
        assert_eq!(state.viruses[0].mass, mass::VIRUS_BASE);
        assert_eq!(state.viruses[0].food_hits, 0);
        assert_eq!(state.viruses[1].position, impact);
        assert_eq!(state.viruses[1].mass, mass::VIRUS_BASE);
    }

    #[test]
    fn test_virus_grows_below_threshold() {
        let (mut state, detector) = setup();
        state.spawn_virus_at(Vec2::new(300.0, 300.0));
        state
            .foods
            .push(Food::new(1000, Vec2::new(302.0, 300.0), Vec2::ZERO));
        feed_viruses(&mut state, &detector);
        assert_eq!(state.viruses.len(), 1);
        assert_eq!(state.viruses[0].mass, mass::VIRUS_BASE + mass::FOOD);
        assert_eq!(state.viruses[0].food_hits, 1);
    }
}
