//! Authoritative simulation state
//!
//! Owns every entity, the tick counter, the id counters and the single
//! seeded random generator. Nothing else in the crate holds randomness.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::game::constants::{arena, mass, radius_conversion, Mass};
use crate::game::entity::{Body, Cell, EntityId, Food, Pellet, Virus};
use crate::game::player::{Player, PlayerId};
use crate::util::vec2::Vec2;

/// Monotonic entity id source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: EntityId,
}

impl IdAllocator {
    #[inline]
    pub fn next_id(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) config: GameConfig,
    /// Dense table: `players[id].id == id`
    pub players: Vec<Player>,
    pub pellets: Vec<Pellet>,
    pub foods: Vec<Food>,
    pub viruses: Vec<Virus>,
    pub ticks: u64,
    pub(crate) next_player_id: PlayerId,
    pub(crate) ids: IdAllocator,
    /// Seed the generator is rewound to on reset
    pub(crate) seed: u64,
    pub(crate) rng: Pcg64,
}

impl GameState {
    /// Empty arena: no players, pellets or viruses yet
    pub fn new(config: GameConfig) -> Self {
        let seed = config.seed;
        Self {
            config,
            players: Vec::new(),
            pellets: Vec::new(),
            foods: Vec::new(),
            viruses: Vec::new(),
            ticks: 0,
            next_player_id: 0,
            ids: IdAllocator::default(),
            seed,
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Replaces the seed and rewinds the generator to it
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg64::seed_from_u64(seed);
    }

    /// Drops every entity and player and restarts all counters
    pub fn clear(&mut self) {
        self.players.clear();
        self.pellets.clear();
        self.foods.clear();
        self.viruses.clear();
        self.ticks = 0;
        self.next_player_id = 0;
        self.ids = IdAllocator::default();
        self.rng = Pcg64::seed_from_u64(self.seed);
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id as usize)
    }

    pub fn living_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_dead())
    }

    #[inline]
    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    /// Every unit of mass currently in the arena
    pub fn total_mass(&self) -> u64 {
        let cells: u64 = self
            .players
            .iter()
            .map(|p| p.total_mass() as u64)
            .sum();
        let viruses: u64 = self.viruses.iter().map(|v| v.mass as u64).sum();
        cells
            + viruses
            + self.pellets.len() as u64 * mass::PELLET as u64
            + self.foods.len() as u64 * mass::FOOD as u64
    }

    /// Clamps a centre so the whole circle stays inside the arena
    pub fn clamp_to_arena(&self, position: Vec2, radius: f32) -> Vec2 {
        clamp_to_arena(&self.config, position, radius)
    }

    /// Uniform position with the circle fully inside the arena
    pub fn random_position(&mut self, radius: f32) -> Vec2 {
        let x = random_axis(&mut self.rng, self.config.arena_width, radius);
        let y = random_axis(&mut self.rng, self.config.arena_height, radius);
        Vec2::new(x, y)
    }

    /// Random position clear of living cells and viruses, falling back to the
    /// last candidate when the arena is crowded.
    pub fn spawn_location(&mut self, mass: Mass) -> Vec2 {
        let radius = radius_conversion(mass);
        let mut candidate = self.random_position(radius);
        for _ in 1..arena::MAX_SPAWN_ATTEMPTS {
            if !self.is_occupied(candidate, radius) {
                break;
            }
            candidate = self.random_position(radius);
        }
        candidate
    }

    fn is_occupied(&self, position: Vec2, radius: f32) -> bool {
        let overlaps = |other: Vec2, other_radius: f32| {
            let reach = radius + other_radius;
            position.distance_sq_to(other) < reach * reach
        };
        self.players
            .iter()
            .flat_map(|p| p.cells.iter())
            .any(|c| overlaps(c.position, c.radius()))
            || self
                .viruses
                .iter()
                .any(|v| overlaps(v.position, v.radius()))
    }

    pub fn add_pellets(&mut self, count: usize) {
        let radius = radius_conversion(mass::PELLET);
        self.pellets.reserve(count);
        for _ in 0..count {
            let position = self.random_position(radius);
            let id = self.next_entity_id();
            self.pellets.push(Pellet::new(id, position));
        }
    }

    pub fn add_viruses(&mut self, count: usize) {
        let radius = radius_conversion(mass::VIRUS_BASE);
        for _ in 0..count {
            let position = self.random_position(radius);
            self.spawn_virus_at(position);
        }
    }

    pub fn spawn_virus_at(&mut self, position: Vec2) {
        let id = self.next_entity_id();
        self.viruses.push(Virus::new(id, position));
    }

    /// Tops pellets and viruses up to their configured targets
    pub fn populate(&mut self) {
        let pellets = self.config.target_pellets.saturating_sub(self.pellets.len());
        let viruses = self.config.target_viruses.saturating_sub(self.viruses.len());
        self.add_pellets(pellets);
        self.add_viruses(viruses);
    }

    /// Registers a player and spawns its first cell
    pub fn add_player(&mut self, name: impl Into<String>, is_bot: bool) -> PlayerId {
        let id = self.next_player_id;
        self.next_player_id += 1;
        let color_index = self.rng.gen_range(0..arena::NUM_COLORS);
        self.players.push(Player::new(id, name.into(), is_bot, color_index));
        self.spawn_cell(id);
        id
    }

    /// Kills the player and gives it a fresh floor-mass cell
    pub fn respawn_player(&mut self, id: PlayerId) -> bool {
        match self.player_mut(id) {
            Some(player) => player.kill(),
            None => return false,
        }
        self.spawn_cell(id)
    }

    fn spawn_cell(&mut self, id: PlayerId) -> bool {
        let spawn_mass = self.config.rules.cell_min_mass;
        let position = self.spawn_location(spawn_mass);
        let cell_id = self.next_entity_id();
        let cell = Cell::new(cell_id, position, spawn_mass, &self.config.rules);
        match self.player_mut(id) {
            Some(player) => {
                player.target = position;
                player.cells.push(cell);
                true
            }
            None => false,
        }
    }
}

/// Free-standing clamp so systems can use it while players are borrowed
pub(crate) fn clamp_to_arena(config: &GameConfig, position: Vec2, radius: f32) -> Vec2 {
    Vec2::new(
        clamp_axis(position.x, radius, config.arena_width),
        clamp_axis(position.y, radius, config.arena_height),
    )
}

fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    if 2.0 * radius >= extent {
        extent / 2.0
    } else {
        value.clamp(radius, extent - radius)
    }
}

fn random_axis(rng: &mut Pcg64, extent: f32, radius: f32) -> f32 {
    if 2.0 * radius >= extent {
        extent / 2.0
    } else {
        rng.gen_range(radius..extent - radius)
    }
}
