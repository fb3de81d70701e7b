//! Player record: an ordered set of cells plus intent, cooldowns and statistics

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::RuleConfig;
use crate::game::constants::{decay, Mass};
use crate::game::entity::{Body, Cell};
use crate::util::vec2::Vec2;

/// Dense player identifier (index into the player table)
pub type PlayerId = u32;

/// Discrete action a player holds until told otherwise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    #[default]
    None,
    Split,
    Feed,
}

/// Lifetime statistics; survive death
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Pellets and food absorbed
    pub food_eaten: u64,
    pub highest_mass: Mass,
    pub cells_eaten: u64,
    pub viruses_eaten: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color_index: u8,
    pub cells: Vec<Cell>,
    pub action: Action,
    /// Absolute world point every cell steers toward
    pub target: Vec2,
    pub split_cooldown: u32,
    pub feed_cooldown: u32,
    /// Ticks at which this player hit a virus, oldest first
    pub virus_eaten_ticks: SmallVec<[u64; 8]>,
    /// Multiplier applied to the decay rate
    pub anti_team_decay: f32,
    pub elapsed_ticks: u64,
    pub is_bot: bool,
    pub stats: PlayerStats,
}

impl Player {
    pub fn new(id: PlayerId, name: String, is_bot: bool, color_index: u8) -> Self {
        Self {
            id,
            name,
            color_index,
            cells: Vec::new(),
            action: Action::None,
            target: Vec2::ZERO,
            split_cooldown: 0,
            feed_cooldown: 0,
            virus_eaten_ticks: SmallVec::new(),
            anti_team_decay: 1.0,
            elapsed_ticks: 0,
            is_bot,
            stats: PlayerStats::default(),
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn total_mass(&self) -> Mass {
        self.cells.iter().map(|c| c.mass()).sum()
    }

    /// Mass-weighted centre of all cells, `None` when dead
    pub fn center(&self) -> Option<Vec2> {
        let total = self.total_mass();
        if total == 0 {
            return None;
        }
        let weighted = self
            .cells
            .iter()
            .fold(Vec2::ZERO, |acc, c| acc + c.position * c.mass() as f32);
        Some(weighted / total as f32)
    }

    pub fn largest_cell(&self) -> Option<&Cell> {
        self.cells.iter().max_by_key(|c| c.mass())
    }

    /// How many more cells this player may own
    #[inline]
    pub fn cell_budget(&self, rules: &RuleConfig) -> usize {
        rules.player_cell_limit.saturating_sub(self.cells.len())
    }

    /// Enough large cells to swallow viruses instead of popping on them
    pub fn can_eat_viruses(&self, rules: &RuleConfig) -> bool {
        self.cells
            .iter()
            .filter(|c| c.mass() >= rules.virus_eat_min_cell_mass)
            .count()
            >= rules.virus_eat_cell_count
    }

    pub fn record_virus_hit(&mut self, tick: u64) {
        self.virus_eaten_ticks.push(tick);
        self.stats.viruses_eaten += 1;
    }

    /// Drops virus hits older than the rolling window and recomputes the
    /// anti-team decay multiplier from what is left.
    pub fn refresh_anti_team_decay(&mut self, tick: u64) {
        self.virus_eaten_ticks
            .retain(|t| *t + decay::ANTI_TEAM_WINDOW_TICKS > tick);
        let hits = self.virus_eaten_ticks.len();
        self.anti_team_decay = if hits >= 2 {
            decay::ANTI_TEAM_BASE
                .powi(hits as i32 - 1)
                .min(decay::ANTI_TEAM_MAX)
        } else {
            1.0
        };
    }

    /// Removes every cell and resets the transient state; statistics, action
    /// and target survive.
    pub fn kill(&mut self) {
        self.cells.clear();
        self.split_cooldown = 0;
        self.feed_cooldown = 0;
        self.anti_team_decay = 1.0;
        self.elapsed_ticks = 0;
        self.virus_eaten_ticks.clear();
    }
}
