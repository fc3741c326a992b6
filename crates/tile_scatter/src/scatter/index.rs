//! Spatial index of accepted placement positions for a single rule.
//!
//! Positions are bucketed in a sparse uniform grid. With the bucket size equal to the
//! rule's minimum distance, a spacing check only touches the 3x3 block of buckets
//! around the candidate, independent of how many placements were accepted.
use std::collections::HashMap;

use glam::{IVec2, Vec2};

/// Accepted positions of one rule in one pass. Grows monotonically.
#[derive(Clone, Debug)]
pub struct AcceptanceIndex {
    cell_size: f32,
    buckets: HashMap<IVec2, Vec<Vec2>>,
    len: usize,
    min_cell: IVec2,
    max_cell: IVec2,
}

impl AcceptanceIndex {
    /// Creates an index with the given bucket size; non-positive sizes fall back to 1.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            buckets: HashMap::new(),
            len: 0,
            min_cell: IVec2::MAX,
            max_cell: IVec2::MIN,
        }
    }

    /// Creates an index tuned for spacing checks at `min_distance`.
    pub fn for_min_distance(min_distance: f32) -> Self {
        Self::new(min_distance.max(1.0))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn cell_of(&self, position: Vec2) -> IVec2 {
        (position / self.cell_size).floor().as_ivec2()
    }

    /// Records an accepted position.
    pub fn record(&mut self, position: Vec2) {
        let cell = self.cell_of(position);
        self.buckets.entry(cell).or_default().push(position);
        self.min_cell = self.min_cell.min(cell);
        self.max_cell = self.max_cell.max(cell);
        self.len += 1;
    }

    /// Whether no recorded position lies strictly closer than `min_distance`.
    pub fn is_clear(&self, position: Vec2, min_distance: f32) -> bool {
        if self.is_empty() || min_distance <= 0.0 {
            return true;
        }
        let reach = (min_distance / self.cell_size).ceil() as i32;
        let center = self.cell_of(position);
        let lo = (center - IVec2::splat(reach)).max(self.min_cell);
        let hi = (center + IVec2::splat(reach)).min(self.max_cell);
        let min_sq = min_distance * min_distance;

        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                if let Some(bucket) = self.buckets.get(&IVec2::new(x, y)) {
                    if bucket
                        .iter()
                        .any(|p| p.distance_squared(position) < min_sq)
                    {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Distance to the nearest recorded position, or infinity when empty.
    ///
    /// Searches rings of buckets outward from the query and stops once no unvisited
    /// bucket can hold anything closer than the best hit.
    pub fn nearest_distance(&self, position: Vec2) -> f32 {
        if self.is_empty() {
            return f32::INFINITY;
        }
        let center = self.cell_of(position);
        let max_ring = (center - self.min_cell)
            .abs()
            .max((center - self.max_cell).abs())
            .max_element();

        let mut best_sq = f32::INFINITY;
        for ring in 0..=max_ring {
            if ring > 0 {
                let floor = (ring - 1) as f32 * self.cell_size;
                if floor * floor >= best_sq {
                    break;
                }
            }
            for (dx, dy) in ring_offsets(ring) {
                if let Some(bucket) = self.buckets.get(&(center + IVec2::new(dx, dy))) {
                    for p in bucket {
                        best_sq = best_sq.min(p.distance_squared(position));
                    }
                }
            }
        }
        best_sq.sqrt()
    }
}

/// Offsets of all cells at Chebyshev distance exactly `ring`.
fn ring_offsets(ring: i32) -> impl Iterator<Item = (i32, i32)> {
    (-ring..=ring).flat_map(move |dy| {
        let edge_row = dy.abs() == ring;
        let step = if edge_row || ring == 0 {
            1
        } else {
            (2 * ring) as usize
        };
        (-ring..=ring).step_by(step).map(move |dx| (dx, dy))
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::random::rand01;

    #[test]
    fn empty_index_is_infinitely_far_and_clear() {
        let index = AcceptanceIndex::for_min_distance(4.0);
        assert!(index.nearest_distance(Vec2::ZERO).is_infinite());
        assert!(index.is_clear(Vec2::ZERO, 4.0));
    }

    #[test]
    fn ring_offsets_cover_the_ring_once() {
        assert_eq!(ring_offsets(0).count(), 1);
        assert_eq!(ring_offsets(1).count(), 8);
        assert_eq!(ring_offsets(3).count(), 24);
        assert!(ring_offsets(2).all(|(x, y)| x.abs().max(y.abs()) == 2));
    }

    #[test]
    fn spacing_is_strict() {
        let mut index = AcceptanceIndex::for_min_distance(4.0);
        index.record(Vec2::new(0.5, 0.5));
        assert!(!index.is_clear(Vec2::new(3.0, 0.5), 4.0));
        assert!(index.is_clear(Vec2::new(4.5, 0.5), 4.0));
        assert_eq!(index.nearest_distance(Vec2::new(4.5, 0.5)), 4.0);
    }

    #[test]
    fn matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut index = AcceptanceIndex::for_min_distance(3.0);
        let mut points = Vec::new();
        for _ in 0..300 {
            let p = Vec2::new(rand01(&mut rng) * 200.0, rand01(&mut rng) * 120.0);
            index.record(p);
            points.push(p);
        }
        assert_eq!(index.len(), 300);

        for _ in 0..300 {
            let q = Vec2::new(
                rand01(&mut rng) * 260.0 - 30.0,
                rand01(&mut rng) * 180.0 - 30.0,
            );
            let expected = points
                .iter()
                .map(|p| p.distance(q))
                .fold(f32::INFINITY, f32::min);
            assert!((index.nearest_distance(q) - expected).abs() < 1e-3);
            assert_eq!(index.is_clear(q, 3.0), expected >= 3.0);
        }
    }

    #[test]
    fn zero_distance_never_blocks() {
        let mut index = AcceptanceIndex::for_min_distance(0.0);
        index.record(Vec2::new(1.0, 1.0));
        assert!(index.is_clear(Vec2::new(1.0, 1.0), 0.0));
        assert_eq!(index.nearest_distance(Vec2::new(1.0, 1.0)), 0.0);
    }
}
