//! Spatial hash grid for same-player overlap checks
//!
//! Divides the arena into square buckets and stores cell indices in each.
//! Pair queries only look at the bucket itself and the forward neighbours,
//! so every pair is reported once.

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::util::vec2::Vec2;

/// Initial capacity for the bucket map
const GRID_INITIAL_CAPACITY: usize = 32;

/// Initial capacity for each bucket
const BUCKET_INITIAL_CAPACITY: usize = 4;

/// Grid bucket key - (x, y) bucket coordinates
pub type BucketKey = (i32, i32);

/// Forward neighbours: right, bottom, bottom-right, bottom-left
const FORWARD_NEIGHBOURS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (-1, 1)];

/// Entry stored in the grid
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    /// Index into the caller's cell list
    pub index: usize,
    pub position: Vec2,
}

pub struct SpatialGrid {
    /// Reciprocal of the bucket size in world units
    inv_cell_size: f32,
    buckets: HashMap<BucketKey, Vec<SpatialEntry>, FxBuildHasher>,
}

impl SpatialGrid {
    /// Create a grid with the given bucket size
    ///
    /// The bucket size should be at least twice the largest radius so that
    /// touching circles always land in the same or adjacent buckets.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        Self {
            inv_cell_size: 1.0 / cell_size,
            buckets: HashMap::with_capacity_and_hasher(GRID_INITIAL_CAPACITY, FxBuildHasher),
        }
    }

    #[inline]
    fn bucket_key(&self, position: Vec2) -> BucketKey {
        (
            (position.x * self.inv_cell_size).floor() as i32,
            (position.y * self.inv_cell_size).floor() as i32,
        )
    }

    #[inline]
    pub fn insert(&mut self, index: usize, position: Vec2) {
        let key = self.bucket_key(position);
        self.buckets
            .entry(key)
            .or_insert_with(|| Vec::with_capacity(BUCKET_INITIAL_CAPACITY))
            .push(SpatialEntry { index, position });
    }

    /// Process each candidate pair once
    pub fn for_each_potential_collision<F>(&self, mut callback: F)
    where
        F: FnMut(SpatialEntry, SpatialEntry),
    {
        for (&(bx, by), entries) in &self.buckets {
            for i in 0..entries.len() {
                for j in (i + 1)..entries.len() {
                    callback(entries[i], entries[j]);
                }
            }

            for (dx, dy) in FORWARD_NEIGHBOURS {
                if let Some(neighbour) = self.buckets.get(&(bx + dx, by + dy)) {
                    for entry in entries {
                        for other in neighbour {
                            callback(*entry, *other);
                        }
                    }
                }
            }
        }
    }

    /// Candidate index pairs `(low, high)` in ascending order
    pub fn potential_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        self.for_each_potential_collision(|a, b| {
            pairs.push((a.index.min(b.index), a.index.max(b.index)));
        });
        pairs.sort_unstable();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_bucket_pair() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(0, Vec2::new(1.0, 1.0));
        grid.insert(1, Vec2::new(2.0, 2.0));
        assert_eq!(grid.potential_pairs(), vec![(0, 1)]);
    }

    #[test]
    fn test_neighbour_buckets_reported_once() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(0, Vec2::new(9.0, 9.0));
        grid.insert(1, Vec2::new(11.0, 9.0));
        grid.insert(2, Vec2::new(9.0, 11.0));
        grid.insert(3, Vec2::new(11.0, 11.0));
        // Far away, no partners
        grid.insert(4, Vec2::new(100.0, 100.0));
        let pairs = grid.potential_pairs();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_zero_cell_size_still_buckets() {
        let mut grid = SpatialGrid::new(0.0);
        grid.insert(0, Vec2::new(0.2, 0.2));
        grid.insert(1, Vec2::new(0.7, 0.4));
        assert_eq!(grid.potential_pairs(), vec![(0, 1)]);
    }
}
