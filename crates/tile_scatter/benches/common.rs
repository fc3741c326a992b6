use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::Vec2;
use tile_scatter::prelude::{blocks, TileGrid};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Round island with water rings, a beach and two grass bands.
pub fn island(size: u32) -> TileGrid {
    let c = size as f32 / 2.0;
    TileGrid::from_fn(size, size, |x, y| {
        let d = Vec2::new(x as f32 + 0.5 - c, y as f32 + 0.5 - c).length() / c;
        match d {
            d if d > 0.92 => blocks::WATER_4,
            d if d > 0.86 => blocks::WATER_2,
            d if d > 0.8 => blocks::WATER_0,
            d if d > 0.7 => blocks::SAND,
            d if d > 0.5 => blocks::GRASS_1,
            _ => blocks::GRASS_2,
        }
    })
}
