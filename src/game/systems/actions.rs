//! Player actions: feed and split, gated by tick cooldowns
//!
//! The held action is not cleared after use; a player holding Split splits
//! again every time the cooldown runs out.

use crate::config::RuleConfig;
use crate::game::constants::{mass, motion, split};
use crate::game::entity::{Body, Food};
use crate::game::player::{Action, Player};
use crate::game::state::{GameState, IdAllocator};
use crate::game::systems::split::split_player;

pub fn apply_actions(state: &mut GameState) {
    let GameState {
        config,
        players,
        foods,
        ids,
        ..
    } = state;
    let rules = &config.rules;

    for player in players.iter_mut().filter(|p| !p.is_dead()) {
        player.split_cooldown = player.split_cooldown.saturating_sub(1);
        player.feed_cooldown = player.feed_cooldown.saturating_sub(1);

        let action = player.action;
        match action {
            Action::Feed if player.feed_cooldown == 0 => {
                eject_food(player, foods, ids, rules);
                player.feed_cooldown = split::FEED_COOLDOWN;
            }
            Action::Split if player.split_cooldown == 0 => {
                split_player(player, ids, rules);
                player.split_cooldown = split::SPLIT_COOLDOWN;
            }
            _ => {}
        }
    }
}

/// Every cell with mass to spare shoots one food toward the target
pub fn eject_food(
    player: &mut Player,
    foods: &mut Vec<Food>,
    ids: &mut IdAllocator,
    rules: &RuleConfig,
) -> usize {
    let target = player.target;
    let mut ejected = 0;
    for cell in player.cells.iter_mut() {
        if cell.mass() < rules.cell_min_mass + mass::FOOD {
            continue;
        }
        let direction = cell.heading_to(target);
        let position = cell.position + direction * cell.radius();
        foods.push(Food::new(
            ids.next_id(),
            position,
            direction * motion::FOOD_SPEED,
        ));
        let remaining = cell.mass() - mass::FOOD;
        cell.set_mass(remaining, rules);
        ejected += 1;
    }
    ejected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::util::vec2::Vec2;

    fn setup(cell_mass: u32) -> GameState {
        let mut state = GameState::new(GameConfig {
            target_pellets: 0,
            target_viruses: 0,
            ..GameConfig::default()
        });
        state.add_player("a", false);
        let rules = state.config().rules.clone();
        let player = &mut state.players[0];
        player.cells[0].set_mass(cell_mass, &rules);
        player.cells[0].position = Vec2::new(250.0, 250.0);
        player.target = Vec2::new(400.0, 250.0);
        state
    }

    #[test]
    fn test_feed_conserves_mass_and_sets_cooldown() {
        let mut state = setup(100);
        state.players[0].action = Action::Feed;
        let before = state.total_mass();
        apply_actions(&mut state);

        assert_eq!(state.foods.len(), 1);
        assert_eq!(state.players[0].total_mass(), 90);
        assert_eq!(state.total_mass(), before);
        assert_eq!(state.players[0].feed_cooldown, split::FEED_COOLDOWN);
        assert!(state.foods[0].velocity.x > 0.0);

        // Cooldown blocks the next few ticks
        apply_actions(&mut state);
        assert_eq!(state.foods.len(), 1);
    }

    #[test]
    fn test_feed_needs_spare_mass() {
        let mut state = setup(19);
        state.players[0].action = Action::Feed;
        apply_actions(&mut state);
        assert!(state.foods.is_empty());
        assert_eq!(state.players[0].total_mass(), 19);
    }

    #[test]
    fn test_split_action_repeats_after_cooldown() {
        let mut state = setup(400);
        state.players[0].action = Action::Split;
        apply_actions(&mut state);
        assert_eq!(state.players[0].cells.len(), 2);
        assert_eq!(state.players[0].action, Action::Split);

        for _ in 0..split::SPLIT_COOLDOWN - 1 {
            apply_actions(&mut state);
        }
        assert_eq!(state.players[0].cells.len(), 2);
        apply_actions(&mut state);
        assert_eq!(state.players[0].cells.len(), 4);
        assert_eq!(state.players[0].total_mass(), 400);
    }

    #[test]
    fn test_small_cell_split_is_noop() {
        let mut state = setup(20);
        state.players[0].action = Action::Split;
        let before = state.players[0].cells.clone();
        apply_actions(&mut state);
        assert_eq!(state.players[0].cells, before);
    }
}
