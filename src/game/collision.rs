//! Bucketed collision detection for "who can eat whom" queries
//!
//! Gallery entities are bucketed into vertical strips across the arena
//! width, each strip sorted by y. A query visits the strips its radius
//! spans, gallops to the first entry at or above its lower y bound and scans
//! until it passes the upper bound. The index is rebuilt on every call.
//!
//! A hit requires `collides_with && can_eat`; since the eater is the heavier
//! body, its radius bounds the search box. Entries owned by the query's own
//! player are skipped.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::config::GameConfig;
use crate::game::constants::Mass;
use crate::game::entity::Body;
use crate::game::player::PlayerId;
use crate::util::vec2::Vec2;

/// Relative slack on the search box so boundary hits are never missed
const BOX_SLACK: f32 = 1e-4;

/// Snapshot of a body taking part in a collision pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub owner: Option<PlayerId>,
    pub position: Vec2,
    pub mass: Mass,
}

impl Collider {
    pub fn of<B: Body>(owner: Option<PlayerId>, body: &B) -> Self {
        Self {
            owner,
            position: body.position(),
            mass: body.mass(),
        }
    }

    #[inline]
    fn same_owner(&self, other: &Collider) -> bool {
        matches!((self.owner, other.owner), (Some(a), Some(b)) if a == b)
    }

    #[inline]
    fn eats(&self, other: &Collider) -> bool {
        !self.same_owner(other) && self.can_eat(other) && self.collides_with(other)
    }
}

impl Body for Collider {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn mass(&self) -> Mass {
        self.mass
    }
}

/// One gallery entity a query can eat
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hit {
    pub owner: Option<PlayerId>,
    pub victim: usize,
}

/// Query index -> hits, victims in ascending index order
pub type CollisionHits = BTreeMap<usize, SmallVec<[Hit; 4]>>;

#[derive(Debug, Clone, Copy)]
struct Entry {
    y: f32,
    index: usize,
}

#[derive(Debug, Clone)]
pub struct CollisionDetector {
    arena_width: f32,
    precision: u32,
}

impl CollisionDetector {
    pub fn new(arena_width: f32, precision: u32) -> Self {
        Self {
            arena_width,
            precision: precision.max(1),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.arena_width, config.collision_precision)
    }

    /// Strip index for an x coordinate, clamped into the grid
    #[inline]
    fn bucket(&self, x: f32) -> usize {
        let raw = (x / self.arena_width * self.precision as f32).floor();
        if raw.is_nan() || raw < 0.0 {
            0
        } else {
            (raw as usize).min(self.precision as usize - 1)
        }
    }

    fn build_index(&self, gallery: &[Collider]) -> Vec<Vec<Entry>> {
        let mut buckets: Vec<Vec<Entry>> = vec![Vec::new(); self.precision as usize];
        for (index, item) in gallery.iter().enumerate() {
            buckets[self.bucket(item.position.x)].push(Entry {
                y: item.position.y,
                index,
            });
        }
        for bucket in &mut buckets {
            bucket.sort_unstable_by(|a, b| a.y.total_cmp(&b.y).then(a.index.cmp(&b.index)));
        }
        buckets
    }

    /// Every (query, victim) pair where the query can eat the victim
    pub fn solve(&self, queries: &[Collider], gallery: &[Collider]) -> CollisionHits {
        let mut hits = CollisionHits::new();
        if queries.is_empty() || gallery.is_empty() {
            return hits;
        }

        let buckets = self.build_index(gallery);
        for (qi, query) in queries.iter().enumerate() {
            let reach = query.radius() * (1.0 + BOX_SLACK) + BOX_SLACK;
            let (lo_y, hi_y) = (query.position.y - reach, query.position.y + reach);
            let first = self.bucket(query.position.x - reach);
            let last = self.bucket(query.position.x + reach);

            let mut found: SmallVec<[Hit; 4]> = SmallVec::new();
            for bucket in &buckets[first..=last] {
                let start = gallop_lower_bound(bucket, lo_y);
                for entry in bucket[start..].iter().take_while(|e| e.y <= hi_y) {
                    let item = &gallery[entry.index];
                    if query.eats(item) {
                        found.push(Hit {
                            owner: item.owner,
                            victim: entry.index,
                        });
                    }
                }
            }

            if !found.is_empty() {
                found.sort_unstable_by_key(|h| h.victim);
                hits.insert(qi, found);
            }
        }
        hits
    }
}

/// Reference O(n * m) scan; same hits as `CollisionDetector::solve`
pub fn solve_naive(queries: &[Collider], gallery: &[Collider]) -> CollisionHits {
    let mut hits = CollisionHits::new();
    for (qi, query) in queries.iter().enumerate() {
        let found: SmallVec<[Hit; 4]> = gallery
            .iter()
            .enumerate()
            .filter(|(_, item)| query.eats(item))
            .map(|(victim, item)| Hit {
                owner: item.owner,
                victim,
            })
            .collect();
        if !found.is_empty() {
            hits.insert(qi, found);
        }
    }
    hits
}

/// First position whose y is >= `lo`: exponential probe, then binary search
fn gallop_lower_bound(entries: &[Entry], lo: f32) -> usize {
    let mut bound = 1;
    while bound < entries.len() && entries[bound].y < lo {
        bound *= 2;
    }
    let start = bound / 2;
    let end = (bound + 1).min(entries.len());
    if start >= end {
        return end;
    }
    start + entries[start..end].partition_point(|e| e.y < lo)
}
