use tracing::debug;

use crate::game::constants::timing;
use crate::game::state::GameState;

/// Top pellets and viruses back up to their targets every `REGEN_INTERVAL`
pub fn regenerate(state: &mut GameState) {
    let tick = state.ticks;
    if tick == 0 || tick % timing::REGEN_INTERVAL != 0 || !state.config.pellet_regen {
        return;
    }
    let pellets = state.pellets.len();
    let viruses = state.viruses.len();
    state.populate();
    debug!(
        tick,
        pellets_added = state.pellets.len() - pellets,
        viruses_added = state.viruses.len() - viruses,
        "arena regenerated"
    );
}

/// End-of-tick statistics for every living player
pub fn update_stats(state: &mut GameState) {
    for player in state.players.iter_mut().filter(|p| !p.is_dead()) {
        player.stats.highest_mass = player.stats.highest_mass.max(player.total_mass());
        player.elapsed_ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn empty_state(regen: bool) -> GameState {
        GameState::new(GameConfig {
            target_pellets: 40,
            target_viruses: 2,
            pellet_regen: regen,
            ..GameConfig::default()
        })
    }

    #[test]
    fn test_regenerate_on_interval() {
        let mut state = empty_state(true);
        regenerate(&mut state);
        assert!(state.pellets.is_empty());

        state.ticks = timing::REGEN_INTERVAL - 1;
        regenerate(&mut state);
        assert!(state.pellets.is_empty());

        state.ticks = timing::REGEN_INTERVAL;
        regenerate(&mut state);
        assert_eq!(state.pellets.len(), 40);
        assert_eq!(state.viruses.len(), 2);
    }

    #[test]
    fn test_regenerate_disabled() {
        let mut state = empty_state(false);
        state.ticks = timing::REGEN_INTERVAL;
        regenerate(&mut state);
        assert!(state.pellets.is_empty());
    }

    #[test]
    fn test_update_stats() {
        let mut state = empty_state(false);
        state.add_player("a", false);
        state.add_player("b", false);
        state.players[1].kill();
        update_stats(&mut state);
        update_stats(&mut state);
        assert_eq!(state.players[0].elapsed_ticks, 2);
        assert_eq!(
            state.players[0].stats.highest_mass,
            state.config().rules.cell_min_mass
        );
        assert_eq!(state.players[1].elapsed_ticks, 0);
    }
}
