use crate::game::constants::{decay, Mass};
use crate::game::entity::Body;
use crate::game::state::GameState;

/// Periodic mass decay and anti-team bookkeeping
///
/// Runs every `INTERVAL_TICKS`. Cells first lose `decay_rate * anti_team_decay`
/// of their mass (floored); the virus-hit window is pruned afterwards, so the
/// new multiplier only applies from the next interval.
pub fn apply_decay(state: &mut GameState) {
    let tick = state.ticks;
    if tick % decay::INTERVAL_TICKS != 0 {
        return;
    }
    let GameState {
        config, players, ..
    } = state;
    let rules = &config.rules;

    for player in players.iter_mut().filter(|p| !p.is_dead()) {
        let keep = (1.0 - rules.decay_rate * player.anti_team_decay).max(0.0);
        for cell in player.cells.iter_mut() {
            let decayed = (cell.mass() as f32 * keep) as Mass;
            cell.set_mass(decayed, rules);
        }
        player.refresh_anti_team_decay(tick);
    }
}
