//! Candidate scanning over the terrain grid.
use std::collections::BTreeSet;

use glam::{IVec2, UVec2};

use crate::terrain::{BlockId, BlockMask, TerrainGrid};

/// Lazily yields the tiles whose block is in a rule's spawn set.
///
/// Tiles are visited row by row (`y` outer, `x` inner), which keeps the random stream
/// consumption order fixed for a given grid.
pub struct CandidateScanner<'a, T: TerrainGrid + ?Sized> {
    terrain: &'a T,
    mask: BlockMask,
    size: UVec2,
    cursor: u64,
}

impl<'a, T: TerrainGrid + ?Sized> CandidateScanner<'a, T> {
    pub fn new(terrain: &'a T, spawn_blocks: &BTreeSet<BlockId>) -> Self {
        Self::with_mask(terrain, BlockMask::new(spawn_blocks))
    }

    pub fn with_mask(terrain: &'a T, mask: BlockMask) -> Self {
        Self {
            terrain,
            mask,
            size: UVec2::from(terrain.size()),
            cursor: 0,
        }
    }

    fn total(&self) -> u64 {
        self.size.x as u64 * self.size.y as u64
    }
}

impl<T: TerrainGrid + ?Sized> Iterator for CandidateScanner<'_, T> {
    type Item = IVec2;

    fn next(&mut self) -> Option<IVec2> {
        while self.cursor < self.total() {
            let i = self.cursor;
            self.cursor += 1;
            let tile = IVec2::new(
                (i % self.size.x as u64) as i32,
                (i / self.size.x as u64) as i32,
            );
            if self
                .terrain
                .block_at(tile.into())
                .is_some_and(|b| self.mask.contains(b))
            {
                return Some(tile);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total().saturating_sub(self.cursor);
        (0, usize::try_from(left).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{blocks, TileGrid};

    #[test]
    fn yields_matching_tiles_in_row_major_order() {
        let mut grid = TileGrid::new(3, 2, blocks::GRASS_1);
        grid.set(IVec2::new(2, 0), blocks::SAND);
        grid.set(IVec2::new(0, 1), blocks::SAND);
        grid.set(IVec2::new(1, 1), blocks::WATER_0);

        let spawn: BTreeSet<_> = [blocks::SAND, blocks::WATER_0].into_iter().collect();
        let tiles: Vec<_> = CandidateScanner::new(&grid, &spawn).collect();
        assert_eq!(
            tiles,
            vec![IVec2::new(2, 0), IVec2::new(0, 1), IVec2::new(1, 1)]
        );
    }

    #[test]
    fn empty_when_no_block_matches() {
        let grid = TileGrid::new(4, 4, blocks::STONE);
        let spawn: BTreeSet<_> = [blocks::SAND].into_iter().collect();
        assert_eq!(CandidateScanner::new(&grid, &spawn).count(), 0);
    }

    #[test]
    fn handles_zero_sized_grid() {
        let grid = TileGrid::new(0, 5, blocks::SAND);
        let spawn: BTreeSet<_> = [blocks::SAND].into_iter().collect();
        assert_eq!(CandidateScanner::new(&grid, &spawn).next(), None);
    }
}
