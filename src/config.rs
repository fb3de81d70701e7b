use serde::{Deserialize, Serialize};

use crate::game::constants::{arena, decay, mass, split, virus, Mass};

/// Tunable game rules
///
/// Defaults come from `game::constants`. The arena geometry lives on
/// `GameConfig`; everything here only changes how entities interact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Floor for every cell mass (and the spawn mass)
    pub cell_min_mass: Mass,
    /// Cells above this are force-split
    pub cell_max_mass: Mass,
    /// Mass a cell is clamped to when it cannot be force-split
    pub cell_clamp_mass: Mass,
    /// Cells lighter than this ignore split actions
    pub split_min_mass: Mass,
    /// Maximum simultaneous cells per player
    pub player_cell_limit: usize,
    /// Cells (each at least `virus_eat_min_cell_mass`) needed to swallow viruses
    pub virus_eat_cell_count: usize,
    pub virus_eat_min_cell_mass: Mass,
    /// Food hits that make a virus burst
    pub virus_food_hit_threshold: u32,
    /// Ticks before split cells may merge again
    pub recombine_ticks: u32,
    /// Fraction of mass lost per decay interval
    pub decay_rate: f32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            cell_min_mass: mass::CELL_MIN,
            cell_max_mass: mass::CELL_MAX,
            cell_clamp_mass: mass::CELL_CLAMP,
            split_min_mass: split::MIN_MASS,
            player_cell_limit: split::PLAYER_CELL_LIMIT,
            virus_eat_cell_count: virus::EAT_CELL_COUNT,
            virus_eat_min_cell_mass: virus::EAT_MIN_CELL_MASS,
            virus_food_hit_threshold: virus::FOOD_HIT_THRESHOLD,
            recombine_ticks: split::RECOMBINE_TICKS,
            decay_rate: decay::RATE,
        }
    }
}

impl RuleConfig {
    /// Applies the cell mass floor
    #[inline]
    pub fn floor_mass(&self, mass: Mass) -> Mass {
        mass.max(self.cell_min_mass)
    }
}

/// Arena configuration, fixed for the lifetime of an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    /// Pellet count maintained by regeneration
    pub target_pellets: usize,
    /// Virus count maintained by regeneration
    pub target_viruses: usize,
    /// Whether pellets and viruses are topped up periodically
    pub pellet_regen: bool,
    /// Seed for the state's random generator
    pub seed: u64,
    /// Buckets across the arena width used by the collision grid
    pub collision_precision: u32,
    pub rules: RuleConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: arena::WIDTH,
            arena_height: arena::HEIGHT,
            target_pellets: arena::NUM_PELLETS,
            target_viruses: arena::NUM_VIRUSES,
            pellet_regen: true,
            seed: arena::SEED,
            collision_precision: arena::COLLISION_PRECISION,
            rules: RuleConfig::default(),
        }
    }
}

/// Configuration validation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Arena dimensions must be positive, got {width}x{height}")]
    InvalidArena { width: f32, height: f32 },
    #[error("collision_precision must be at least 1")]
    InvalidPrecision,
    #[error("player_cell_limit must be at least 1")]
    InvalidCellLimit,
    #[error("split_min_mass ({split}) must be at least twice cell_min_mass ({min})")]
    SplitBelowFloor { split: Mass, min: Mass },
    #[error("cell_clamp_mass ({clamp}) must lie between 2 * cell_min_mass and cell_max_mass ({max})")]
    InvalidMassCap { clamp: Mass, max: Mass },
    #[error("decay_rate must be within [0, 1), got {0}")]
    InvalidDecayRate(f32),
    #[error("cell_min_mass ({min}) must not exceed the pop granule ({granule})")]
    FloorAbovePopSize { min: Mass, granule: Mass },
}

impl GameConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(width) = env_parse::<f32>("ARENA_WIDTH") {
            if width > 0.0 {
                config.arena_width = width;
            } else {
                tracing::warn!("ARENA_WIDTH must be > 0, using default");
            }
        }

        if let Some(height) = env_parse::<f32>("ARENA_HEIGHT") {
            if height > 0.0 {
                config.arena_height = height;
            } else {
                tracing::warn!("ARENA_HEIGHT must be > 0, using default");
            }
        }

        if let Some(pellets) = env_parse::<usize>("NUM_PELLETS") {
            config.target_pellets = pellets;
        }

        if let Some(viruses) = env_parse::<usize>("NUM_VIRUSES") {
            config.target_viruses = viruses;
        }

        if let Some(regen) = env_parse::<bool>("PELLET_REGEN") {
            config.pellet_regen = regen;
        }

        if let Some(seed) = env_parse::<u64>("SEED") {
            config.seed = seed;
        }

        if let Some(precision) = env_parse::<u32>("COLLISION_PRECISION") {
            if precision > 0 {
                config.collision_precision = precision;
            } else {
                tracing::warn!("COLLISION_PRECISION must be > 0, using default");
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return Err(ConfigError::InvalidArena {
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        if self.collision_precision == 0 {
            return Err(ConfigError::InvalidPrecision);
        }

        let rules = &self.rules;
        if rules.player_cell_limit == 0 {
            return Err(ConfigError::InvalidCellLimit);
        }
        // Disruption fragments are at least one granule; the floor must not inflate them
        if rules.cell_min_mass > split::POP_SIZE {
            return Err(ConfigError::FloorAbovePopSize {
                min: rules.cell_min_mass,
                granule: split::POP_SIZE,
            });
        }
        if rules.split_min_mass < 2 * rules.cell_min_mass {
            return Err(ConfigError::SplitBelowFloor {
                split: rules.split_min_mass,
                min: rules.cell_min_mass,
            });
        }
        if rules.cell_clamp_mass > rules.cell_max_mass
            || rules.cell_clamp_mass < 2 * rules.cell_min_mass
        {
            return Err(ConfigError::InvalidMassCap {
                clamp: rules.cell_clamp_mass,
                max: rules.cell_max_mass,
            });
        }
        if !(0.0..1.0).contains(&rules.decay_rate) {
            return Err(ConfigError::InvalidDecayRate(rules.decay_rate));
        }
        Ok(())
    }
}

/// Read and parse an environment variable, warning when it is present but malformed
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            None
        }
    }
}
