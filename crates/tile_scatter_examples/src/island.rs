//! Procedural island terrain for the demos.
use std::f32::consts::TAU;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tile_scatter::prelude::{blocks, BlockId, TileGrid};

/// Radial thresholds of the island, as fractions of the half extent.
#[derive(Debug, Clone, Copy)]
pub struct IslandShape {
    /// Where land ends and shallow water begins.
    pub coast: f32,
    /// Width of the beach band inside the coast.
    pub beach: f32,
    /// Fraction of land radius covered by the inner meadow.
    pub meadow: f32,
    /// Amplitude of the coastline wobble.
    pub wobble: f32,
}

impl Default for IslandShape {
    fn default() -> Self {
        Self {
            coast: 0.72,
            beach: 0.08,
            meadow: 0.55,
            wobble: 0.08,
        }
    }
}

/// Builds a `size` x `size` island. The coastline wobbles with a few seeded harmonics.
pub fn island_grid(size: u32, seed: u64, shape: IslandShape) -> TileGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let harmonics: Vec<(f32, f32, f32)> = (2..6)
        .map(|k| {
            let phase = rng.random_range(0.0..TAU);
            let amp = shape.wobble * rng.random_range(0.4f32..1.0) / (k as f32 - 1.0);
            (k as f32, phase, amp)
        })
        .collect();

    let half = size as f32 / 2.0;
    TileGrid::from_fn(size, size, |x, y| {
        let offset = Vec2::new(x as f32 + 0.5 - half, y as f32 + 0.5 - half) / half;
        let angle = offset.y.atan2(offset.x);
        let wobble: f32 = harmonics
            .iter()
            .map(|(k, phase, amp)| amp * (k * angle + phase).sin())
            .sum();
        classify(offset.length() / (1.0 + wobble), &shape)
    })
}

fn classify(d: f32, shape: &IslandShape) -> BlockId {
    if d > shape.coast {
        // Water deepens in five even steps towards the map edge.
        let depth = ((d - shape.coast) / (1.0 - shape.coast).max(1e-3) * 5.0) as usize;
        return blocks::WATER[depth.min(4)];
    }
    if d > shape.coast - shape.beach {
        return blocks::SAND;
    }
    let land = d / (shape.coast - shape.beach);
    if land < shape.meadow {
        blocks::GRASS_2
    } else if land < shape.meadow + 0.1 {
        blocks::DIRT
    } else {
        blocks::GRASS_1
    }
}
