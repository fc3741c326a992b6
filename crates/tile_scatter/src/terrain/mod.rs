//! Terrain interface consumed by the placement engine.
//!
//! The engine only reads terrain through [`TerrainGrid`]. [`TileGrid`] is a dense
//! in-memory implementation for tools, tests and callers that already hold their
//! blocks in a flat buffer.
use glam::{IVec2, UVec2};
use mint::{Point2, Vector2};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod proximity;

/// Opaque terrain block identifier.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u16);

/// Block palette used by the built-in default rules.
pub mod blocks {
    use super::BlockId;

    pub const DIRT: BlockId = BlockId(0);
    pub const SAND: BlockId = BlockId(1);
    pub const GRASS_1: BlockId = BlockId(2);
    pub const GRASS_2: BlockId = BlockId(3);
    pub const STONE: BlockId = BlockId(4);
    pub const WATER_0: BlockId = BlockId(10);
    pub const WATER_1: BlockId = BlockId(11);
    pub const WATER_2: BlockId = BlockId(12);
    pub const WATER_3: BlockId = BlockId(13);
    pub const WATER_4: BlockId = BlockId(14);

    /// All water depths, shallow to deep.
    pub const WATER: [BlockId; 5] = [WATER_0, WATER_1, WATER_2, WATER_3, WATER_4];
}

/// Read-only access to a bounded 2D tile grid.
///
/// Tiles are addressed by integer coordinates in `[0, width) × [0, height)`.
pub trait TerrainGrid: Send + Sync {
    /// Grid dimensions in tiles.
    fn size(&self) -> Vector2<u32>;

    /// Block at the given tile, or `None` outside the grid.
    fn block_at(&self, tile: Point2<i32>) -> Option<BlockId>;
}

impl<T: TerrainGrid + ?Sized> TerrainGrid for &T {
    fn size(&self) -> Vector2<u32> {
        (**self).size()
    }

    fn block_at(&self, tile: Point2<i32>) -> Option<BlockId> {
        (**self).block_at(tile)
    }
}

/// Membership bitset over [`BlockId`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockMask {
    words: Vec<u64>,
}

impl BlockMask {
    pub fn new<'a>(blocks: impl IntoIterator<Item = &'a BlockId>) -> Self {
        let mut mask = Self::default();
        for block in blocks {
            mask.insert(*block);
        }
        mask
    }

    pub fn insert(&mut self, block: BlockId) {
        let word = (block.0 / 64) as usize;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (block.0 % 64);
    }

    #[inline]
    pub fn contains(&self, block: BlockId) -> bool {
        self.words
            .get((block.0 / 64) as usize)
            .is_some_and(|w| w & (1u64 << (block.0 % 64)) != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }
}

/// Dense row-major tile grid.
#[derive(Clone, Debug)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<BlockId>,
}

impl TileGrid {
    /// Creates a grid filled with a single block.
    pub fn new(width: u32, height: u32, fill: BlockId) -> Self {
        Self {
            width,
            height,
            tiles: vec![fill; width as usize * height as usize],
        }
    }

    /// Creates a grid by evaluating `f` for every tile.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> BlockId) -> Self {
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                tiles.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, tile: IVec2) -> Option<usize> {
        if tile.x < 0 || tile.y < 0 || tile.x as u32 >= self.width || tile.y as u32 >= self.height
        {
            return None;
        }
        Some(tile.y as usize * self.width as usize + tile.x as usize)
    }

    pub fn get(&self, tile: IVec2) -> Option<BlockId> {
        self.index(tile).map(|i| self.tiles[i])
    }

    /// Sets a tile; out-of-bounds writes are ignored.
    pub fn set(&mut self, tile: IVec2, block: BlockId) {
        if let Some(i) = self.index(tile) {
            self.tiles[i] = block;
        }
    }

    /// Fills the inclusive-exclusive rectangle `[min, max)`, clipped to the grid.
    pub fn fill_rect(&mut self, min: IVec2, max: IVec2, block: BlockId) {
        for y in min.y.max(0)..max.y.min(self.height as i32) {
            for x in min.x.max(0)..max.x.min(self.width as i32) {
                self.set(IVec2::new(x, y), block);
            }
        }
    }

    /// Fills every tile whose coordinate lies within `radius` of `center`.
    pub fn fill_disk(&mut self, center: IVec2, radius: i32, block: BlockId) {
        let r2 = radius * radius;
        for y in (center.y - radius)..=(center.y + radius) {
            for x in (center.x - radius)..=(center.x + radius) {
                let d = IVec2::new(x, y) - center;
                if d.length_squared() <= r2 {
                    self.set(IVec2::new(x, y), block);
                }
            }
        }
    }
}

impl TerrainGrid for TileGrid {
    fn size(&self) -> Vector2<u32> {
        UVec2::new(self.width, self.height).into()
    }

    fn block_at(&self, tile: Point2<i32>) -> Option<BlockId> {
        self.get(IVec2::from(tile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_mask_membership() {
        let mask = BlockMask::new(&[blocks::SAND, blocks::WATER_4, BlockId(300)]);
        assert!(mask.contains(blocks::SAND));
        assert!(mask.contains(blocks::WATER_4));
        assert!(mask.contains(BlockId(300)));
        assert!(!mask.contains(blocks::GRASS_2));
        assert!(!mask.contains(BlockId(9000)));
        assert!(BlockMask::default().is_empty());
    }

    #[test]
    fn tile_grid_bounds_are_respected() {
        let mut grid = TileGrid::new(4, 3, blocks::DIRT);
        grid.set(IVec2::new(3, 2), blocks::SAND);
        grid.set(IVec2::new(4, 0), blocks::SAND);
        assert_eq!(grid.get(IVec2::new(3, 2)), Some(blocks::SAND));
        assert_eq!(grid.get(IVec2::new(-1, 0)), None);
        assert_eq!(grid.block_at(Point2 { x: 4, y: 0 }), None);
        assert_eq!(UVec2::from(grid.size()), UVec2::new(4, 3));
    }

    #[test]
    fn fill_helpers_clip_to_grid() {
        let mut grid = TileGrid::new(5, 5, blocks::DIRT);
        grid.fill_rect(IVec2::new(-2, -2), IVec2::new(2, 2), blocks::STONE);
        grid.fill_disk(IVec2::new(4, 4), 1, blocks::WATER_0);
        assert_eq!(grid.get(IVec2::new(0, 0)), Some(blocks::STONE));
        assert_eq!(grid.get(IVec2::new(1, 1)), Some(blocks::STONE));
        assert_eq!(grid.get(IVec2::new(2, 2)), Some(blocks::DIRT));
        assert_eq!(grid.get(IVec2::new(4, 3)), Some(blocks::WATER_0));
        assert_eq!(grid.get(IVec2::new(3, 3)), Some(blocks::DIRT));
    }
}
