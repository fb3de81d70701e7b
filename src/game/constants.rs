//! Default game-rule constants and the mass/radius/speed curves
//!
//! Every timer here is measured in ticks, never wall-clock time. Values that
//! a host may want to tune live in `RuleConfig` and take these as defaults.

/// Integer mass unit shared by every entity
pub type Mass = u32;

/// Mass and size constants
pub mod mass {
    use super::Mass;

    /// Mass units per unit of circle area: radius = sqrt((mass / AREA_RATIO) / PI)
    pub const AREA_RATIO: f32 = 1.0;
    /// A body must be this many times heavier than another to eat it
    pub const EAT_MARGIN: f64 = 1.1;
    /// A cell must be heavier than this to eat another player's cell
    pub const CELL_EAT_REQUIREMENT: Mass = 25;
    pub const PELLET: Mass = 1;
    pub const FOOD: Mass = 10;
    pub const VIRUS_BASE: Mass = 100;
    /// Floor for every cell mass; new players spawn with exactly this
    pub const CELL_MIN: Mass = 10;
    /// Cells above this are force-split (or clamped when out of cell budget)
    pub const CELL_MAX: Mass = 22_500;
    /// Mass a cell is clamped to when it exceeds `CELL_MAX` with no split budget
    pub const CELL_CLAMP: Mass = 22_000;
}

/// Movement constants
pub mod motion {
    /// Steering gain: velocity = STEER_GAIN * (target - position)
    pub const STEER_GAIN: f32 = 3.0;
    /// Numerator of the max-speed curve
    pub const MAX_SPEED_SCALE: f32 = 400.0;
    /// Exponent of the max-speed curve: max_speed = SCALE / mass^EXPONENT
    pub const MAX_SPEED_EXPONENT: f32 = 0.439;
    /// Splitting impulse deceleration (units/s^2)
    pub const SPLIT_DECELERATION: f32 = 80.0;
    pub const SPLIT_SPEED_MIN: f32 = 20.0;
    pub const SPLIT_SPEED_MAX: f32 = 130.0;
    /// Launch speed of ejected food
    pub const FOOD_SPEED: f32 = 100.0;
    pub const FOOD_DECELERATION: f32 = 80.0;
    /// Scale applied to the (dx, dy) of an external action
    pub const TARGET_REACH: f32 = 10.0;
}

/// Split, feed and disruption constants
pub mod split {
    /// Cells lighter than this ignore split actions
    pub const MIN_MASS: u32 = 35;
    pub const SPLIT_COOLDOWN: u32 = 30;
    pub const FEED_COOLDOWN: u32 = 10;
    pub const PLAYER_CELL_LIMIT: usize = 25;
    /// Recombine cooldown: 30 seconds at 30 ticks per second
    pub const RECOMBINE_TICKS: u32 = 900;
    /// A disrupted cell keeps roughly 1/POP_REDUCTION of its mass
    pub const POP_REDUCTION: u32 = 2;
    /// Granularity of popped mass and default fragment size
    pub const POP_SIZE: u32 = 25;
}

/// Virus constants
pub mod virus {
    /// Split cells a player needs before it can swallow viruses whole
    pub const EAT_CELL_COUNT: usize = 10;
    /// Mass each of those cells must have
    pub const EAT_MIN_CELL_MASS: u32 = 160;
    /// Food hits after which a virus bursts into a new virus
    pub const FOOD_HIT_THRESHOLD: u32 = 7;
}

/// Mass decay constants
pub mod decay {
    /// Fraction of mass lost per decay interval (before anti-team scaling)
    pub const RATE: f32 = 0.002;
    pub const INTERVAL_TICKS: u64 = 60;
    /// Rolling window over which virus hits count toward anti-team decay
    pub const ANTI_TEAM_WINDOW_TICKS: u64 = 1800;
    /// Multiplier growth per virus hit beyond the first
    pub const ANTI_TEAM_BASE: f32 = 1.5;
    pub const ANTI_TEAM_MAX: f32 = 10.0;
}

/// Tick scheduling constants
pub mod timing {
    /// Default tick length: 30 ticks per second
    pub const DT: f32 = 1.0 / 30.0;
    /// Controllers are consulted on ticks divisible by this
    pub const DECISION_INTERVAL: u64 = 10;
    /// Pellets and viruses are topped up on ticks divisible by this
    pub const REGEN_INTERVAL: u64 = 300;
    /// Relaxation passes for same-player overlap
    pub const SELF_COLLISION_PASSES: usize = 5;
    /// Squared-distance slack before two sibling cells count as overlapping
    pub const SELF_COLLISION_MARGIN: f32 = 0.01;
    /// Upper bound on direct pushback sweeps after relaxation
    pub const RESIDUAL_PUSHBACK_SWEEPS: usize = 128;
    /// Overlap below this is left alone by the pushback sweeps
    pub const RESIDUAL_OVERLAP_TOLERANCE: f32 = 1e-3;
}

/// Arena defaults
pub mod arena {
    pub const WIDTH: f32 = 500.0;
    pub const HEIGHT: f32 = 500.0;
    pub const NUM_PELLETS: usize = 1024;
    pub const NUM_VIRUSES: usize = 25;
    pub const SEED: u64 = 42;
    /// Buckets across the arena width for the collision grid
    pub const COLLISION_PRECISION: u32 = 10;
    /// Attempts to find a free spawn location before accepting an overlap
    pub const MAX_SPAWN_ATTEMPTS: u32 = 30;
    /// Player colors are picked from this many palette slots
    pub const NUM_COLORS: u8 = 8;
}

/// Radius of a body with the given mass
#[inline]
pub fn radius_conversion(mass: Mass) -> f32 {
    let area = mass as f32 / mass::AREA_RATIO;
    (area / std::f32::consts::PI).sqrt()
}

/// Mass of a body with the given radius (inverse of `radius_conversion`, rounded)
#[inline]
pub fn mass_conversion(radius: f32) -> Mass {
    let area = std::f32::consts::PI * radius * radius;
    (mass::AREA_RATIO * area).round().max(0.0) as Mass
}

/// Speed cap for a cell of the given mass; heavier cells are slower
#[inline]
pub fn max_speed(mass: Mass) -> f32 {
    motion::MAX_SPEED_SCALE / (mass.max(1) as f32).powf(motion::MAX_SPEED_EXPONENT)
}

/// Launch speed of a freshly split cell
#[inline]
pub fn split_speed(mass: Mass) -> f32 {
    (3.0 * max_speed(mass).powf(1.2)).clamp(motion::SPLIT_SPEED_MIN, motion::SPLIT_SPEED_MAX)
}
