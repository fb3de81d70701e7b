use crate::game::constants::{max_speed, motion};
use crate::game::entity::{Body, Moving};
use crate::game::state::{clamp_to_arena, GameState};

/// Steer every cell toward its player's target and integrate
///
/// velocity = STEER_GAIN * (target - position), capped at the cell's mass-based
/// max speed; the split impulse is added on top and decays on its own.
pub fn steer_cells(state: &mut GameState, dt: f32) {
    let GameState {
        config, players, ..
    } = state;

    for player in players.iter_mut() {
        let target = player.target;
        for cell in player.cells.iter_mut() {
            cell.velocity =
                ((target - cell.position) * motion::STEER_GAIN).clamp_length(max_speed(cell.mass()));
            cell.position += (cell.velocity + cell.splitting_velocity) * dt;
            cell.splitting_velocity = cell
                .splitting_velocity
                .shortened(motion::SPLIT_DECELERATION * dt);
            cell.recombine_timer = cell.recombine_timer.saturating_sub(1);
            cell.position = clamp_to_arena(config, cell.position, cell.radius());
        }
    }
}

/// Slow, move and clamp every food projectile
pub fn move_foods(state: &mut GameState, dt: f32) {
    let GameState { config, foods, .. } = state;
    for food in foods.iter_mut() {
        food.decelerate(motion::FOOD_DECELERATION, dt);
        food.move_by(dt);
        food.position = clamp_to_arena(config, food.position, food.radius());
    }
}
