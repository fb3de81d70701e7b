//! Decision hook for scripted players
//!
//! The engine consults controllers every few ticks with a read-only view of
//! the state; the decisions are applied only after every controller has run.

use crate::game::entity::Body;
use crate::game::player::{Action, PlayerId};
use crate::game::state::GameState;
use crate::util::vec2::Vec2;

/// What a controller wants its player to do until the next decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Absolute world point to steer toward
    pub target: Vec2,
    pub action: Action,
}

pub trait Controller {
    fn decide(&mut self, me: PlayerId, state: &GameState) -> Decision;
}

impl<F> Controller for F
where
    F: FnMut(PlayerId, &GameState) -> Decision,
{
    fn decide(&mut self, me: PlayerId, state: &GameState) -> Decision {
        self(me, state)
    }
}

/// Chases the pellet nearest to its centre; splits onto smaller enemy cells
/// that are within reach of its largest cell.
#[derive(Debug, Clone, Default)]
pub struct HungryBot;

impl Controller for HungryBot {
    fn decide(&mut self, me: PlayerId, state: &GameState) -> Decision {
        let Some(player) = state.player(me) else {
            return Decision {
                target: Vec2::ZERO,
                action: Action::None,
            };
        };
        let Some(center) = player.center() else {
            return Decision {
                target: player.target,
                action: Action::None,
            };
        };

        let nearest_pellet = state
            .pellets
            .iter()
            .map(|p| p.position)
            .min_by(|a, b| a.distance_sq_to(center).total_cmp(&b.distance_sq_to(center)));

        let prey = player.largest_cell().and_then(|largest| {
            let reach = largest.radius() * 4.0;
            state
                .living_players()
                .filter(|other| other.id != me)
                .flat_map(|other| other.cells.iter())
                .filter(|cell| {
                    // Each half must still be able to eat it after splitting
                    largest.mass() / 2 > cell.mass() + cell.mass() / 10
                        && largest.position.distance_to(cell.position) < reach
                })
                .map(|cell| cell.position)
                .next()
        });

        match (prey, nearest_pellet) {
            (Some(position), _) => Decision {
                target: position,
                action: Action::Split,
            },
            (None, Some(position)) => Decision {
                target: position,
                action: Action::None,
            },
            (None, None) => Decision {
                target: center,
                action: Action::None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn empty_state() -> GameState {
        GameState::new(GameConfig {
            target_pellets: 0,
            target_viruses: 0,
            ..GameConfig::default()
        })
    }

    #[test]
    fn test_hungry_bot_targets_nearest_pellet() {
        let mut state = empty_state();
        let id = state.add_player("bot", true);
        let center = state.players[0].center().unwrap();
        state.pellets.push(crate::game::entity::Pellet::new(
            100,
            center + Vec2::new(30.0, 0.0),
        ));
        state.pellets.push(crate::game::entity::Pellet::new(
            101,
            center + Vec2::new(5.0, 0.0),
        ));

        let decision = HungryBot.decide(id, &state);
        assert!(decision.target.approx_eq(center + Vec2::new(5.0, 0.0), 1e-4));
        assert_eq!(decision.action, Action::None);
    }

    #[test]
    fn test_hungry_bot_without_pellets_holds_position() {
        let mut state = empty_state();
        let id = state.add_player("bot", true);
        let center = state.players[0].center().unwrap();
        let decision = HungryBot.decide(id, &state);
        assert_eq!(decision.target, center);
    }

    #[test]
    fn test_closure_controller() {
        let mut state = empty_state();
        let id = state.add_player("scripted", true);
        let mut controller = |_: PlayerId, _: &GameState| Decision {
            target: Vec2::new(1.0, 2.0),
            action: Action::Feed,
        };
        let decision = controller.decide(id, &state);
        assert_eq!(decision.action, Action::Feed);
    }
}
