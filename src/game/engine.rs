//! Host-facing driver around `GameState`
//!
//! The engine owns the state, the per-player controllers and the collision
//! detector, and is the only thing that advances time.

use tracing::{debug, info};

use crate::config::{ConfigError, GameConfig};
use crate::game::collision::CollisionDetector;
use crate::game::constants::{motion, timing, Mass};
use crate::game::controller::{Controller, Decision};
use crate::game::player::{Action, Player, PlayerId};
use crate::game::state::GameState;
use crate::game::systems;
use crate::util::vec2::Vec2;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown player id {0}")]
    UnknownPlayer(PlayerId),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

pub struct Engine {
    state: GameState,
    /// Indexed by player id
    controllers: Vec<Option<Box<dyn Controller>>>,
    detector: CollisionDetector,
}

impl Engine {
    /// Validates the config and builds a populated arena
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut state = GameState::new(config);
        state.populate();
        info!(
            pellets = state.pellets.len(),
            viruses = state.viruses.len(),
            seed = state.seed(),
            "engine created"
        );
        Ok(Self::from_state(state))
    }

    /// Resume from an existing (e.g. decoded) state; all players start
    /// without controllers.
    pub fn from_state(state: GameState) -> Self {
        let detector = CollisionDetector::from_config(state.config());
        let controllers = std::iter::repeat_with(|| None)
            .take(state.players.len())
            .collect();
        Self {
            state,
            controllers,
            detector,
        }
    }

    #[inline]
    pub fn game_state(&self) -> &GameState {
        &self.state
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        self.state.config()
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.state.ticks
    }

    pub fn player_count(&self) -> usize {
        self.state.players.len()
    }

    pub fn living_player_count(&self) -> usize {
        self.state.living_players().count()
    }

    pub fn pellet_count(&self) -> usize {
        self.state.pellets.len()
    }

    pub fn food_count(&self) -> usize {
        self.state.foods.len()
    }

    pub fn virus_count(&self) -> usize {
        self.state.viruses.len()
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.state.players.iter()
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, EngineError> {
        self.state.player(id).ok_or(EngineError::UnknownPlayer(id))
    }

    /// Add a player driven through `take_action`
    pub fn add_player(&mut self, name: impl Into<String>) -> PlayerId {
        let name = name.into();
        let id = self.state.add_player(name.clone(), false);
        self.controllers.push(None);
        info!(id, name = %name, "player added");
        id
    }

    /// Add a player driven by `controller`
    pub fn add_bot(&mut self, name: impl Into<String>, controller: Box<dyn Controller>) -> PlayerId {
        let name = name.into();
        let id = self.state.add_player(name.clone(), true);
        self.controllers.push(Some(controller));
        info!(id, name = %name, "bot added");
        id
    }

    /// Attach (or with `None`, detach) a controller
    pub fn set_controller(
        &mut self,
        id: PlayerId,
        controller: Option<Box<dyn Controller>>,
    ) -> Result<(), EngineError> {
        let slot = self
            .controllers
            .get_mut(id as usize)
            .ok_or(EngineError::UnknownPlayer(id))?;
        *slot = controller;
        Ok(())
    }

    /// Steer toward the player's centre offset by `(dx, dy) * TARGET_REACH`
    /// and hold `action`. Dead players ignore this.
    pub fn take_action(
        &mut self,
        id: PlayerId,
        dx: f32,
        dy: f32,
        action: Action,
    ) -> Result<(), EngineError> {
        let player = self
            .state
            .player_mut(id)
            .ok_or(EngineError::UnknownPlayer(id))?;
        let Some(center) = player.center() else {
            return Ok(());
        };
        player.target = center + Vec2::new(dx, dy) * motion::TARGET_REACH;
        player.action = action;
        Ok(())
    }

    /// Advance one tick
    pub fn tick(&mut self, dt: f32) {
        self.run_controllers();
        systems::run_tick(&mut self.state, &self.detector, dt);
    }

    /// Advance `n` ticks, then respawn every dead player
    pub fn step(&mut self, n: u32, dt: f32) {
        for _ in 0..n {
            self.tick(dt);
        }
        self.respawn_dead();
    }

    /// Run `n` ticks at the default tick length
    pub fn run(&mut self, n: u32) {
        self.step(n, timing::DT);
    }

    pub fn respawn(&mut self, id: PlayerId) -> Result<(), EngineError> {
        if self.state.respawn_player(id) {
            Ok(())
        } else {
            Err(EngineError::UnknownPlayer(id))
        }
    }

    /// Respawn every dead player; returns how many came back
    pub fn respawn_dead(&mut self) -> usize {
        let dead: Vec<PlayerId> = self
            .state
            .players
            .iter()
            .filter(|p| p.is_dead())
            .map(|p| p.id)
            .collect();
        for &id in &dead {
            self.state.respawn_player(id);
        }
        if !dead.is_empty() {
            debug!(count = dead.len(), "players respawned");
        }
        dead.len()
    }

    /// Replace the seed and rewind the RNG to it immediately
    ///
    /// Entities already in the arena stay; call `reset` to repopulate from
    /// the new seed.
    pub fn seed(&mut self, seed: u64) {
        self.state.reseed(seed);
    }

    /// Clear the arena (players included) and repopulate from the seed
    pub fn reset(&mut self) {
        self.state.clear();
        self.state.populate();
        self.controllers.clear();
        info!(seed = self.state.seed(), "engine reset");
    }

    /// Player ids and total mass, heaviest first (ties by id)
    pub fn leaderboard(&self) -> Vec<(PlayerId, Mass)> {
        let mut board: Vec<(PlayerId, Mass)> = self
            .state
            .players
            .iter()
            .map(|p| (p.id, p.total_mass()))
            .collect();
        board.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        board
    }

    /// Consult controllers on decision ticks. Every controller sees the same
    /// state; decisions are applied afterwards.
    fn run_controllers(&mut self) {
        if self.state.ticks % timing::DECISION_INTERVAL != 0 {
            return;
        }
        let state = &self.state;
        let decisions: Vec<(usize, Decision)> = self
            .controllers
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                let controller = slot.as_mut()?;
                let player = state.players.get(index)?;
                if player.is_dead() {
                    return None;
                }
                Some((index, controller.decide(player.id, state)))
            })
            .collect();

        for (index, decision) in decisions {
            if let Some(player) = self.state.players.get_mut(index) {
                player.target = decision.target;
                player.action = decision.action;
            }
        }
    }
}
