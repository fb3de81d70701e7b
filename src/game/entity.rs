//! Plain entity records and the shared body/motion behaviour
//!
//! Every simulated thing is a circle whose radius follows from its mass.
//! Shared geometry lives in default methods on `Body`; things that drift
//! (food) also implement `Moving`.

use serde::{Deserialize, Serialize};

use crate::config::RuleConfig;
use crate::game::constants::{mass, radius_conversion, Mass};
use crate::util::vec2::Vec2;

/// Identifier for pellets, food, viruses and cells
pub type EntityId = u64;

/// Circular body with a mass-derived radius
pub trait Body {
    fn position(&self) -> Vec2;
    fn mass(&self) -> Mass;

    #[inline]
    fn radius(&self) -> f32 {
        radius_conversion(self.mass())
    }

    /// Absorption test: the centres are within the larger of the two radii
    fn collides_with<B: Body>(&self, other: &B) -> bool {
        let reach = self.radius().max(other.radius());
        self.position().distance_sq_to(other.position()) <= reach * reach
    }

    #[inline]
    fn touches<B: Body>(&self, other: &B) -> bool {
        self.touches_with_margin(other, 0.0)
    }

    /// (r1 + r2)^2 >= d^2 + margin
    fn touches_with_margin<B: Body>(&self, other: &B, margin: f32) -> bool {
        let reach = self.radius() + other.radius();
        reach * reach >= self.position().distance_sq_to(other.position()) + margin
    }

    /// Strictly heavier than the other body by the eat margin
    fn can_eat<B: Body>(&self, other: &B) -> bool {
        self.mass() as f64 > other.mass() as f64 * mass::EAT_MARGIN
    }
}

/// Body with a velocity
pub trait Moving: Body {
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    fn set_position(&mut self, position: Vec2);

    fn move_by(&mut self, dt: f32) {
        let next = self.position() + self.velocity() * dt;
        self.set_position(next);
    }

    /// Grows the speed along the current heading
    fn accelerate(&mut self, acceleration: f32, dt: f32) {
        let velocity = self.velocity().lengthened(acceleration * dt);
        self.set_velocity(velocity);
    }

    /// Shrinks the speed toward zero without reversing
    fn decelerate(&mut self, deceleration: f32, dt: f32) {
        let velocity = self.velocity().shortened(deceleration * dt);
        self.set_velocity(velocity);
    }
}

/// Static unit-mass pellet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pellet {
    pub id: EntityId,
    pub position: Vec2,
}

impl Pellet {
    pub fn new(id: EntityId, position: Vec2) -> Self {
        Self { id, position }
    }
}

impl Body for Pellet {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn mass(&self) -> Mass {
        mass::PELLET
    }
}

/// Mass ejected by a feeding cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Food {
    pub fn new(id: EntityId, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            position,
            velocity,
        }
    }
}

impl Body for Food {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn mass(&self) -> Mass {
        mass::FOOD
    }
}

impl Moving for Food {
    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
}

/// Virus: pops large cells, grows when fed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Virus {
    pub id: EntityId,
    pub position: Vec2,
    pub mass: Mass,
    /// Food absorbed since the last burst
    pub food_hits: u32,
}

impl Virus {
    pub fn new(id: EntityId, position: Vec2) -> Self {
        Self {
            id,
            position,
            mass: mass::VIRUS_BASE,
            food_hits: 0,
        }
    }

    /// Absorbs one food; returns true once the hit threshold is reached
    /// (the virus is then reset to its base mass).
    pub fn absorb_food(&mut self, threshold: u32) -> bool {
        self.mass += mass::FOOD;
        self.food_hits += 1;
        if self.food_hits >= threshold {
            self.mass = mass::VIRUS_BASE;
            self.food_hits = 0;
            true
        } else {
            false
        }
    }
}

impl Body for Virus {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn mass(&self) -> Mass {
        self.mass
    }
}

/// One player-owned blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: EntityId,
    pub position: Vec2,
    /// Steering velocity toward the player's target
    pub velocity: Vec2,
    /// Impulse from splitting or sibling pushes; decays separately
    pub splitting_velocity: Vec2,
    mass: Mass,
    /// Ticks until this cell may merge again (0 = may merge)
    pub recombine_timer: u32,
}

impl Cell {
    /// New cell at rest; the mass is raised to the configured floor
    pub fn new(id: EntityId, position: Vec2, mass: Mass, rules: &RuleConfig) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            splitting_velocity: Vec2::ZERO,
            mass: rules.floor_mass(mass),
            recombine_timer: 0,
        }
    }

    /// Sets the mass, never going below the floor
    #[inline]
    pub fn set_mass(&mut self, mass: Mass, rules: &RuleConfig) {
        self.mass = rules.floor_mass(mass);
    }

    #[inline]
    pub fn grow(&mut self, amount: Mass) {
        self.mass = self.mass.saturating_add(amount);
    }

    #[inline]
    pub fn can_recombine(&self) -> bool {
        self.recombine_timer == 0
    }

    #[inline]
    pub fn reset_recombine_timer(&mut self, rules: &RuleConfig) {
        self.recombine_timer = rules.recombine_ticks;
    }

    /// Unit vector from this cell toward `target`, `Vec2::RIGHT` if already there
    #[inline]
    pub fn heading_to(&self, target: Vec2) -> Vec2 {
        (target - self.position).normalize_or(Vec2::RIGHT)
    }
}

impl Body for Cell {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn mass(&self) -> Mass {
        self.mass
    }
}
