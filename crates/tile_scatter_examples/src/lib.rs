#![forbid(unsafe_code)]

mod island;
mod rendering;

pub use island::{island_grid, IslandShape};
pub use rendering::{block_color, render_placements_to_png, RenderConfig, RuleStyle};
