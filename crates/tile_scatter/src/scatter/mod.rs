//! Placement pipeline: scan candidate tiles, evaluate rule constraints, expand groups and
//! emit [`Placement`] records.
use glam::{IVec2, Vec2};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::rules::{AnchorPoint, ElementId, EntityId};

pub mod evaluator;
pub mod events;
pub mod group;
pub mod index;
pub mod runner;
pub mod scanner;

/// The variant chosen for a placement.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpawnedVariant {
    Element(ElementId),
    Entity(EntityId),
}

impl SpawnedVariant {
    pub fn id(&self) -> &str {
        match self {
            SpawnedVariant::Element(id) | SpawnedVariant::Entity(id) => id,
        }
    }
}

/// Starting sprite-sheet state of a placement.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteState {
    pub phase: u32,
    pub frame: u32,
    pub animated: bool,
    pub animation_speed: f32,
}

/// Cluster membership of a placement. Member 0 is the anchor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupTag {
    /// Cluster number, unique within the rule for one pass.
    pub id: u32,
    pub member: u32,
}

impl GroupTag {
    pub fn is_anchor(&self) -> bool {
        self.member == 0
    }
}

/// A finished spawn instance. Carries everything needed to instantiate the element or
/// entity without looking at the rule again.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Name of the rule that produced the placement.
    pub rule: String,
    /// Index of that rule in its rule set.
    pub rule_index: usize,
    pub variant: SpawnedVariant,
    /// Tile containing the placement.
    pub tile: IVec2,
    /// Position in world units (tile space scaled by the run's tile size).
    pub position: Vec2,
    pub scale: f32,
    /// Rotation in radians.
    pub rotation: f32,
    pub anchor: AnchorPoint,
    pub anchor_offset: Vec2,
    pub sprite: SpriteState,
    pub group: Option<GroupTag>,
}

impl Placement {
    /// Whether this placement was produced by group expansion rather than tile scanning.
    pub fn is_group_member(&self) -> bool {
        self.group.is_some_and(|g| !g.is_anchor())
    }
}
