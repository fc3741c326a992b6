//! Proximity fields: distance from every tile to the nearest tile of a block set.
//!
//! A [`ProximityField`] is an exact Euclidean distance transform of a block mask,
//! computed with the Felzenszwalb-Huttenlocher separable algorithm (two 1D passes of
//! lower parabola envelopes). Distances are measured between tile coordinates.
//! Building is `O(width * height)`; queries are a single lookup.
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use glam::{IVec2, UVec2};
use tracing::debug;

use crate::terrain::{BlockId, BlockMask, TerrainGrid};

/// Squared distances from each tile to the nearest target tile.
#[derive(Clone, Debug)]
pub struct ProximityField {
    width: u32,
    height: u32,
    target_count: usize,
    dist_sq: Vec<f32>,
}

impl ProximityField {
    /// Builds the field for all tiles whose block is in `targets`.
    pub fn build<T: TerrainGrid + ?Sized>(terrain: &T, targets: &BlockMask) -> Self {
        let size = UVec2::from(terrain.size());
        let (w, h) = (size.x as usize, size.y as usize);

        // Larger than any squared in-grid distance, finite so the envelope math stays exact.
        let far = (w * w + h * h) as f32;
        let mut f = vec![far; w * h];
        let mut target_count = 0;
        for y in 0..h {
            for x in 0..w {
                let tile = IVec2::new(x as i32, y as i32);
                if terrain
                    .block_at(tile.into())
                    .is_some_and(|b| targets.contains(b))
                {
                    f[y * w + x] = 0.0;
                    target_count += 1;
                }
            }
        }

        if target_count > 0 {
            squared_edt_2d(&mut f, w, h);
        }

        debug!(
            "Proximity field {}x{} built with {} target tiles.",
            w, h, target_count
        );

        Self {
            width: size.x,
            height: size.y,
            target_count,
            dist_sq: f,
        }
    }

    /// Number of target tiles in the grid.
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Distance from `tile` to the nearest target tile; infinite when there is none
    /// or the tile lies outside the grid.
    pub fn distance_at(&self, tile: IVec2) -> f32 {
        self.distance_sq_at(tile).sqrt()
    }

    /// Whether some target tile lies within `max_distance` of `tile` (inclusive).
    #[inline]
    pub fn within(&self, tile: IVec2, max_distance: f32) -> bool {
        self.distance_sq_at(tile) <= max_distance * max_distance
    }

    #[inline]
    fn distance_sq_at(&self, tile: IVec2) -> f32 {
        if self.target_count == 0
            || tile.x < 0
            || tile.y < 0
            || tile.x as u32 >= self.width
            || tile.y as u32 >= self.height
        {
            return f32::INFINITY;
        }
        self.dist_sq[tile.y as usize * self.width as usize + tile.x as usize]
    }
}

/// Separable 2D pass: rows first, then columns, in place.
fn squared_edt_2d(f: &mut [f32], w: usize, h: usize) {
    debug_assert_eq!(f.len(), w * h);
    let n = w.max(h);
    let mut input = vec![0.0f32; n];
    let mut output = vec![0.0f32; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];

    for y in 0..h {
        let row = &mut f[y * w..(y + 1) * w];
        squared_edt_1d(row, &mut output[..w], &mut v, &mut z);
        row.copy_from_slice(&output[..w]);
    }

    for x in 0..w {
        for y in 0..h {
            input[y] = f[y * w + x];
        }
        squared_edt_1d(&input[..h], &mut output[..h], &mut v, &mut z);
        for y in 0..h {
            f[y * w + x] = output[y];
        }
    }
}

/// 1D squared distance transform of sampled function `f` via its lower envelope.
fn squared_edt_1d(f: &[f32], out: &mut [f32], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }

    let parabola = |q: usize| f[q] as f64 + (q * q) as f64;
    let intersect = |q: usize, p: usize| (parabola(q) - parabola(p)) / (2.0 * (q - p) as f64);

    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, dq) in out.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let d = q as f64 - v[k] as f64;
        *dq = (d * d + f[v[k]] as f64) as f32;
    }
}

/// Shares proximity fields between rules that use the same block set.
#[derive(Default)]
pub struct ProximityCache {
    entries: HashMap<Vec<BlockId>, Arc<ProximityField>>,
}

impl ProximityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the field for `blocks`, building and caching it on first use.
    pub fn get_or_build<T: TerrainGrid + ?Sized>(
        &mut self,
        terrain: &T,
        blocks: &BTreeSet<BlockId>,
    ) -> Arc<ProximityField> {
        let key: Vec<BlockId> = blocks.iter().copied().collect();
        self.entries
            .entry(key)
            .or_insert_with(|| Arc::new(ProximityField::build(terrain, &BlockMask::new(blocks))))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{blocks, TileGrid};

    fn field_for(grid: &TileGrid, targets: &[BlockId]) -> ProximityField {
        ProximityField::build(grid, &BlockMask::new(targets))
    }

    #[test]
    fn edt_1d_computes_squared_distance_to_nearest_zero() {
        let f = vec![0.0, 1000.0, 1000.0, 0.0];
        let mut out = vec![0.0; 4];
        let mut v = vec![0; 4];
        let mut z = vec![0.0; 5];
        squared_edt_1d(&f, &mut out, &mut v, &mut z);
        assert_eq!(out, vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn single_target_yields_exact_euclidean_distances() {
        let mut grid = TileGrid::new(5, 5, blocks::SAND);
        grid.set(IVec2::new(2, 2), blocks::WATER_0);
        let field = field_for(&grid, &blocks::WATER);

        assert_eq!(field.target_count(), 1);
        assert_eq!(field.distance_at(IVec2::new(2, 2)), 0.0);
        assert!((field.distance_at(IVec2::new(2, 1)) - 1.0).abs() < 1e-6);
        assert!((field.distance_at(IVec2::new(1, 1)) - 2f32.sqrt()).abs() < 1e-6);
        assert!((field.distance_at(IVec2::new(0, 0)) - 8f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn matches_brute_force_on_scattered_targets() {
        let grid = TileGrid::from_fn(17, 11, |x, y| {
            if (x * 7 + y * 13) % 23 == 0 {
                blocks::WATER_2
            } else {
                blocks::GRASS_1
            }
        });
        let field = field_for(&grid, &[blocks::WATER_2]);
        let targets: Vec<IVec2> = (0..11)
            .flat_map(|y| (0..17).map(move |x| IVec2::new(x, y)))
            .filter(|t| grid.get(*t) == Some(blocks::WATER_2))
            .collect();
        assert!(!targets.is_empty());

        for y in 0..11 {
            for x in 0..17 {
                let tile = IVec2::new(x, y);
                let expected = targets
                    .iter()
                    .map(|t| (*t - tile).as_vec2().length())
                    .fold(f32::INFINITY, f32::min);
                assert!(
                    (field.distance_at(tile) - expected).abs() < 1e-4,
                    "tile {tile:?}: {} vs {expected}",
                    field.distance_at(tile)
                );
            }
        }
    }

    #[test]
    fn missing_targets_are_infinitely_far() {
        let grid = TileGrid::new(3, 3, blocks::SAND);
        let field = field_for(&grid, &blocks::WATER);
        assert_eq!(field.target_count(), 0);
        assert!(!field.within(IVec2::new(1, 1), 1000.0));
        assert!(field.distance_at(IVec2::new(1, 1)).is_infinite());
    }

    #[test]
    fn within_is_inclusive_and_rejects_outside_tiles() {
        let mut grid = TileGrid::new(12, 1, blocks::SAND);
        grid.set(IVec2::new(3, 0), blocks::WATER_1);
        let field = field_for(&grid, &blocks::WATER);
        assert!(field.within(IVec2::new(0, 0), 3.0));
        assert!(!field.within(IVec2::new(7, 0), 3.0));
        assert!(!field.within(IVec2::new(-1, 0), 100.0));
    }

    #[test]
    fn cache_reuses_fields_for_equal_block_sets() {
        let grid = TileGrid::new(4, 4, blocks::WATER_0);
        let mut cache = ProximityCache::new();
        let a: BTreeSet<_> = [blocks::WATER_0, blocks::WATER_1].into_iter().collect();
        let b: BTreeSet<_> = [blocks::WATER_1, blocks::WATER_0].into_iter().collect();
        let fa = cache.get_or_build(&grid, &a);
        let fb = cache.get_or_build(&grid, &b);
        assert!(Arc::ptr_eq(&fa, &fb));
        assert_eq!(cache.len(), 1);
    }
}
