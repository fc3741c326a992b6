//! Group expansion around accepted anchors.
//!
//! Members inherit their anchor's block and proximity validity. Each member keeps the
//! rule's minimum spacing to earlier placements, to its anchor and to the siblings drawn
//! before it, unless siblings are explicitly exempted. When configured, members must also
//! stand on a spawn block. A cluster is either committed whole with at least
//! `Grouping::min` members or not at all.
use glam::{UVec2, Vec2};
use rand::Rng as RngCore;

use crate::random::{disk_offset, range_inclusive_u32};
use crate::rules::Grouping;
use crate::scatter::evaluator::Rejection;
use crate::scatter::index::AcceptanceIndex;
use crate::terrain::{BlockMask, TerrainGrid};

/// Expands anchors of a group rule into full clusters.
pub struct GroupExpander<'a, T: TerrainGrid + ?Sized> {
    grouping: Grouping,
    min_distance: f32,
    terrain: &'a T,
    /// Spawn blocks members must stand on, when members follow the block filter.
    member_blocks: Option<&'a BlockMask>,
    /// Grid extent in tiles, when members are clamped inside the grid.
    clamp_extent: Option<Vec2>,
    attempts: u32,
    /// Skip the spacing check between members of the same cluster.
    siblings_exempt: bool,
}

impl<'a, T: TerrainGrid + ?Sized> GroupExpander<'a, T> {
    pub fn new(grouping: Grouping, min_distance: f32, terrain: &'a T) -> Self {
        Self {
            grouping,
            min_distance,
            terrain,
            member_blocks: None,
            clamp_extent: None,
            attempts: 1,
            siblings_exempt: false,
        }
    }

    /// Keeps members strictly inside the terrain grid.
    pub fn with_clamp_to_grid(mut self, clamp: bool) -> Self {
        let extent = UVec2::from(self.terrain.size()).as_vec2();
        self.clamp_extent = clamp.then_some(extent);
        self
    }

    /// Requires members to land on a tile in `blocks`.
    pub fn with_member_blocks(mut self, blocks: Option<&'a BlockMask>) -> Self {
        self.member_blocks = blocks;
        self
    }

    /// Lets members of one cluster stand closer than the rule's minimum distance.
    pub fn with_siblings_exempt(mut self, exempt: bool) -> Self {
        self.siblings_exempt = exempt;
        self
    }

    /// Position draws per member before giving up on it.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Builds a cluster around `anchor` (tile space). The anchor is the first returned
    /// position. `remaining` is how many placements the rule may still make.
    pub fn expand(
        &self,
        anchor: Vec2,
        remaining: u32,
        index: &AcceptanceIndex,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vec2>, Rejection> {
        let drawn = range_inclusive_u32(rng, self.grouping.min, self.grouping.max);
        let size = drawn.min(remaining);
        if size < self.grouping.min {
            return Err(Rejection::Capacity);
        }

        let mut members = Vec::with_capacity(size as usize);
        members.push(anchor);
        for _ in 1..size {
            if let Some(p) = self.sample_member(anchor, &members, index, rng) {
                members.push(p);
            }
        }

        if (members.len() as u32) < self.grouping.min {
            return Err(Rejection::Spacing);
        }
        Ok(members)
    }

    fn sample_member(
        &self,
        anchor: Vec2,
        siblings: &[Vec2],
        index: &AcceptanceIndex,
        rng: &mut dyn RngCore,
    ) -> Option<Vec2> {
        let min_sq = self.min_distance * self.min_distance;
        for _ in 0..self.attempts {
            let mut p = anchor + disk_offset(rng, self.grouping.radius);
            if let Some(extent) = self.clamp_extent {
                let max = Vec2::new(below_edge(extent.x), below_edge(extent.y));
                p = p.clamp(Vec2::ZERO, max);
            }
            if let Some(blocks) = self.member_blocks {
                let tile = p.floor().as_ivec2();
                let on_block = self
                    .terrain
                    .block_at(tile.into())
                    .is_some_and(|b| blocks.contains(b));
                if !on_block {
                    continue;
                }
            }
            let apart = self.siblings_exempt
                || siblings.iter().all(|s| s.distance_squared(p) >= min_sq);
            if apart && index.is_clear(p, self.min_distance) {
                return Some(p);
            }
        }
        None
    }
}

/// Largest float strictly below a positive edge.
#[inline]
fn below_edge(edge: f32) -> f32 {
    if edge > 0.0 {
        f32::from_bits(edge.to_bits() - 1)
    } else {
        0.0
    }
}
