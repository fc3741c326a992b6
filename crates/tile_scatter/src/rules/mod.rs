//! Declarative spawn rules.
//!
//! A [`Rule`] is a common header (where, how often, spacing, grouping, sprite defaults)
//! plus a [`SpawnPayload`] that is specific to what gets spawned. Element rules carry
//! their visual parameters; entity rules carry none, so element-only fields cannot be
//! set on an entity rule.
use std::collections::BTreeSet;

use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::terrain::BlockId;

pub mod defaults;
pub mod set;

pub use set::RuleSet;

/// Identifier of a decorative element variant (tree, prop, ...).
pub type ElementId = String;
/// Identifier of a living entity variant (animal, antagonist, ...).
pub type EntityId = String;

/// Acceptance threshold scale: `spawn_chance` is compared against a draw in `[0, 1000)`.
pub const SPAWN_CHANCE_SCALE: u32 = 1000;

/// What a rule spawns.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnType {
    Element,
    Entity,
}

/// Where the sprite is anchored relative to the placement position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnchorPoint {
    /// Whatever the texture declares.
    #[default]
    TextureDefault,
    Center,
    BottomCenter,
    TopLeft,
}

/// Visual parameters of element placements. Opaque to constraint evaluation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ElementVisuals {
    /// Lower bound of the random scale factor.
    pub scale_min: f32,
    /// Upper bound of the random scale factor.
    pub scale_max: f32,
    /// Multiplied with the random factor to get the final scale.
    pub base_scale: f32,
    /// Rotation in radians.
    pub rotation: f32,
    pub anchor: AnchorPoint,
    /// Additional anchor offset in pixels.
    pub anchor_offset: Vec2,
}

impl Default for ElementVisuals {
    fn default() -> Self {
        Self {
            scale_min: 1.0,
            scale_max: 1.0,
            base_scale: 1.0,
            rotation: 0.0,
            anchor: AnchorPoint::TextureDefault,
            anchor_offset: Vec2::ZERO,
        }
    }
}

impl ElementVisuals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale_range(mut self, scale_min: f32, scale_max: f32) -> Self {
        self.scale_min = scale_min;
        self.scale_max = scale_max;
        self
    }

    pub fn with_base_scale(mut self, base_scale: f32) -> Self {
        self.base_scale = base_scale;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_anchor(mut self, anchor: AnchorPoint, offset: Vec2) -> Self {
        self.anchor = anchor;
        self.anchor_offset = offset;
        self
    }
}

/// Spawn-type specific part of a rule.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum SpawnPayload {
    Element {
        /// Variants, chosen uniformly per placement.
        variants: Vec<ElementId>,
        visuals: ElementVisuals,
    },
    Entity {
        /// Variants, chosen uniformly per placement.
        variants: Vec<EntityId>,
    },
}

impl SpawnPayload {
    pub fn spawn_type(&self) -> SpawnType {
        match self {
            SpawnPayload::Element { .. } => SpawnType::Element,
            SpawnPayload::Entity { .. } => SpawnType::Entity,
        }
    }

    pub fn variants(&self) -> &[String] {
        match self {
            SpawnPayload::Element { variants, .. } => variants,
            SpawnPayload::Entity { variants } => variants,
        }
    }
}

/// Sprite-sheet state every placement starts with.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteDefaults {
    pub phase: u32,
    pub frame: u32,
    /// Number of phases a random starting phase is drawn from.
    pub phase_count: u32,
    /// Draw the starting phase uniformly from `[0, phase_count)` instead of using `phase`.
    pub random_phase: bool,
    pub animated: bool,
    /// Frames per second.
    pub animation_speed: f32,
}

impl Default for SpriteDefaults {
    fn default() -> Self {
        Self {
            phase: 0,
            frame: 0,
            phase_count: 1,
            random_phase: false,
            animated: false,
            animation_speed: 10.0,
        }
    }
}

/// Requirement to lie near at least one tile of a block set.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Proximity {
    pub blocks: BTreeSet<BlockId>,
    /// Inclusive Euclidean distance in tiles.
    pub max_distance: f32,
}

/// Cluster spawning around each accepted anchor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grouping {
    /// Members are spread within this distance of the anchor, in tiles.
    pub radius: f32,
    /// Minimum cluster size, anchor included.
    pub min: u32,
    /// Maximum cluster size, anchor included.
    pub max: u32,
}

/// One declarative placement policy.
#[non_exhaustive]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    /// Rule name; duplicates across a rule set are allowed.
    pub name: String,
    pub payload: SpawnPayload,
    /// Blocks eligible as placement surface.
    pub spawn_blocks: BTreeSet<BlockId>,
    /// Per-mille acceptance threshold; values of 1000 and above always pass.
    pub spawn_chance: u32,
    /// Hard cap on placements per pass, group members included.
    pub max_spawns: u32,
    /// Minimum distance between placements of this rule, in tiles.
    pub min_distance_from_same_rule: f32,
    pub proximity: Option<Proximity>,
    pub group: Option<Grouping>,
    /// Jitter inside the tile instead of using the tile centre.
    pub random_placement: bool,
    pub sprite: SpriteDefaults,
}

impl Rule {
    fn with_payload(name: impl Into<String>, payload: SpawnPayload) -> Self {
        Self {
            name: name.into(),
            payload,
            spawn_blocks: BTreeSet::new(),
            spawn_chance: SPAWN_CHANCE_SCALE,
            max_spawns: u32::MAX,
            min_distance_from_same_rule: 0.0,
            proximity: None,
            group: None,
            random_placement: false,
            sprite: SpriteDefaults::default(),
        }
    }

    /// Creates an element rule.
    pub fn element<I, S>(name: impl Into<String>, variants: I, visuals: ElementVisuals) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        Self::with_payload(
            name,
            SpawnPayload::Element {
                variants: variants.into_iter().map(Into::into).collect(),
                visuals,
            },
        )
    }

    /// Creates an entity rule.
    pub fn entity<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        Self::with_payload(
            name,
            SpawnPayload::Entity {
                variants: variants.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn spawn_type(&self) -> SpawnType {
        self.payload.spawn_type()
    }

    pub fn with_spawn_blocks(mut self, blocks: impl IntoIterator<Item = BlockId>) -> Self {
        self.spawn_blocks = blocks.into_iter().collect();
        self
    }

    pub fn with_spawn_chance(mut self, spawn_chance: u32) -> Self {
        self.spawn_chance = spawn_chance;
        self
    }

    pub fn with_max_spawns(mut self, max_spawns: u32) -> Self {
        self.max_spawns = max_spawns;
        self
    }

    pub fn with_min_distance(mut self, min_distance: f32) -> Self {
        self.min_distance_from_same_rule = min_distance;
        self
    }

    /// Requires placements within `max_distance` of one of `blocks`.
    pub fn with_proximity(
        mut self,
        blocks: impl IntoIterator<Item = BlockId>,
        max_distance: f32,
    ) -> Self {
        self.proximity = Some(Proximity {
            blocks: blocks.into_iter().collect(),
            max_distance,
        });
        self
    }

    pub fn with_group(mut self, radius: f32, min: u32, max: u32) -> Self {
        self.group = Some(Grouping { radius, min, max });
        self
    }

    pub fn with_random_placement(mut self, random_placement: bool) -> Self {
        self.random_placement = random_placement;
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteDefaults) -> Self {
        self.sprite = sprite;
        self
    }

    /// Starts every placement on a random phase in `[0, phase_count)`.
    pub fn with_random_phase(mut self, phase_count: u32) -> Self {
        self.sprite.random_phase = true;
        self.sprite.phase_count = phase_count;
        self
    }

    pub fn with_animation(mut self, animation_speed: f32) -> Self {
        self.sprite.animated = true;
        self.sprite.animation_speed = animation_speed;
        self
    }

    /// Validates the rule, returning a descriptive error for malformed content.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: &str| Err(Error::rule(&self.name, reason));

        if self.name.trim().is_empty() {
            return fail("name must not be empty");
        }
        if self.payload.variants().is_empty() {
            return match self.spawn_type() {
                SpawnType::Element => fail("element rule has no element variants"),
                SpawnType::Entity => fail("entity rule has no entity variants"),
            };
        }
        if self.spawn_blocks.is_empty() {
            return fail("spawn_blocks must not be empty");
        }
        if !self.min_distance_from_same_rule.is_finite() || self.min_distance_from_same_rule < 0.0
        {
            return fail("min_distance_from_same_rule must be finite and >= 0");
        }
        if let Some(proximity) = &self.proximity {
            if proximity.blocks.is_empty() {
                return fail("proximity block set must not be empty");
            }
            if !proximity.max_distance.is_finite() || proximity.max_distance < 0.0 {
                return fail("max_distance_from_blocks must be finite and >= 0");
            }
        }
        if let Some(group) = &self.group {
            if !group.radius.is_finite() || group.radius < 0.0 {
                return fail("group radius must be finite and >= 0");
            }
            if group.min == 0 {
                return fail("group_number_min must be >= 1");
            }
            if group.min > group.max {
                return fail("group_number_min must not exceed group_number_max");
            }
        }
        if let SpawnPayload::Element { visuals, .. } = &self.payload {
            if !visuals.scale_min.is_finite() || !visuals.scale_max.is_finite() {
                return fail("scale range must be finite");
            }
            if visuals.scale_min > visuals.scale_max {
                return fail("scale_min must not exceed scale_max");
            }
            if !visuals.base_scale.is_finite() || visuals.base_scale <= 0.0 {
                return fail("base_scale must be finite and > 0");
            }
            if !visuals.rotation.is_finite() {
                return fail("rotation must be finite");
            }
        }
        if self.sprite.random_phase && self.sprite.phase_count == 0 {
            return fail("random sprite phase requires phase_count >= 1");
        }
        if !self.sprite.animation_speed.is_finite() || self.sprite.animation_speed < 0.0 {
            return fail("animation_speed must be finite and >= 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::blocks;

    fn palm() -> Rule {
        Rule::element(
            "palms",
            ["palm_1", "palm_2"],
            ElementVisuals::new().with_scale_range(0.7, 1.0),
        )
        .with_spawn_blocks([blocks::SAND])
    }

    fn reason(rule: &Rule) -> String {
        match rule.validate() {
            Err(Error::InvalidRule { reason, .. }) => reason,
            other => panic!("expected InvalidRule, got {other:?}"),
        }
    }

    #[test]
    fn builders_produce_tagged_payloads() {
        let element = palm();
        assert_eq!(element.spawn_type(), SpawnType::Element);
        assert_eq!(element.payload.variants(), ["palm_1", "palm_2"]);

        let entity = Rule::entity("sharks", ["shark"]).with_spawn_blocks([blocks::WATER_4]);
        assert_eq!(entity.spawn_type(), SpawnType::Entity);
        assert!(entity.validate().is_ok());
    }

    #[test]
    fn well_formed_rule_validates() {
        let rule = palm()
            .with_spawn_chance(50)
            .with_max_spawns(10)
            .with_min_distance(4.0)
            .with_proximity(blocks::WATER, 3.0)
            .with_group(2.0, 1, 3)
            .with_random_phase(4);
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn empty_variants_are_rejected() {
        let rule = Rule::entity("nobody", Vec::<String>::new()).with_spawn_blocks([blocks::SAND]);
        assert_eq!(reason(&rule), "entity rule has no entity variants");
    }

    #[test]
    fn empty_spawn_blocks_are_rejected() {
        let rule = Rule::entity("floating", ["gull"]);
        assert_eq!(reason(&rule), "spawn_blocks must not be empty");
    }

    #[test]
    fn inverted_scale_range_is_rejected() {
        let rule = Rule::element(
            "bad_scale",
            ["rock"],
            ElementVisuals::new().with_scale_range(2.0, 1.0),
        )
        .with_spawn_blocks([blocks::STONE]);
        assert_eq!(reason(&rule), "scale_min must not exceed scale_max");
    }

    #[test]
    fn inverted_group_bounds_are_rejected() {
        let rule = palm().with_group(3.0, 4, 2);
        assert_eq!(
            reason(&rule),
            "group_number_min must not exceed group_number_max"
        );
        let rule = palm().with_group(3.0, 0, 2);
        assert_eq!(reason(&rule), "group_number_min must be >= 1");
    }

    #[test]
    fn negative_distances_are_rejected() {
        assert!(palm().with_min_distance(-1.0).validate().is_err());
        assert!(palm().with_proximity(blocks::WATER, -2.0).validate().is_err());
        assert!(palm()
            .with_proximity(Vec::<BlockId>::new(), 2.0)
            .validate()
            .is_err());
    }

    #[test]
    fn random_phase_needs_phases() {
        assert!(palm().with_random_phase(0).validate().is_err());
    }
}
