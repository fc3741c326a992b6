use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use glam::{IVec2, Vec2};
use image::{Rgb, RgbImage};
use tile_scatter::prelude::{blocks, BlockId, RunResult, TileGrid};

/// Marker drawn for each placement of a rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleStyle {
    pub color: [u8; 3],
    /// Marker radius in pixels.
    pub radius: i32,
}

impl Default for RuleStyle {
    fn default() -> Self {
        Self {
            color: [200, 30, 30],
            radius: 2,
        }
    }
}

/// How placements are drawn over the terrain.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub pixels_per_tile: u32,
    /// World units per tile used by the run that produced the placements.
    pub tile_size: f32,
    pub default_style: RuleStyle,
    styles: HashMap<String, RuleStyle>,
}

impl RenderConfig {
    pub fn new(pixels_per_tile: u32, tile_size: f32) -> Self {
        Self {
            pixels_per_tile: pixels_per_tile.max(1),
            tile_size,
            default_style: RuleStyle::default(),
            styles: HashMap::new(),
        }
    }

    pub fn with_rule_style(mut self, rule: impl Into<String>, style: RuleStyle) -> Self {
        self.styles.insert(rule.into(), style);
        self
    }

    pub fn style_for(&self, rule: &str) -> RuleStyle {
        self.styles.get(rule).copied().unwrap_or(self.default_style)
    }
}

/// Map colour of a terrain block.
pub fn block_color(block: BlockId) -> [u8; 3] {
    match block {
        blocks::SAND => [238, 214, 160],
        blocks::GRASS_1 => [120, 180, 80],
        blocks::GRASS_2 => [80, 150, 60],
        blocks::DIRT => [140, 110, 80],
        blocks::STONE => [130, 130, 130],
        blocks::WATER_0 => [120, 200, 230],
        blocks::WATER_1 => [90, 175, 220],
        blocks::WATER_2 => [60, 145, 205],
        blocks::WATER_3 => [40, 115, 185],
        blocks::WATER_4 => [25, 85, 160],
        _ => [255, 0, 255],
    }
}

/// Draws the terrain and every placement of `result` into a PNG at `path`.
pub fn render_placements_to_png(
    grid: &TileGrid,
    result: &RunResult,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let ppt = config.pixels_per_tile;
    let mut img = RgbImage::new(grid.width() * ppt, grid.height() * ppt);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let tile = IVec2::new((x / ppt) as i32, (y / ppt) as i32);
        let color = grid.get(tile).map_or([0, 0, 0], block_color);
        *pixel = Rgb(color);
    }

    for placement in &result.placements {
        let style = config.style_for(&placement.rule);
        let centre = placement.position / config.tile_size * ppt as f32;
        let radius = if placement.is_group_member() {
            (style.radius - 1).max(1)
        } else {
            style.radius
        };
        draw_disk(&mut img, centre, radius, style.color);
    }

    let path = path.as_ref();
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn draw_disk(img: &mut RgbImage, centre: Vec2, radius: i32, color: [u8; 3]) {
    let c = centre.floor().as_ivec2();
    let (w, h) = (img.width() as i32, img.height() as i32);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (x, y) = (c.x + dx, c.y + dy);
            if (0..w).contains(&x) && (0..h).contains(&y) {
                img.put_pixel(x as u32, y as u32, Rgb(color));
            }
        }
    }
}
