//! Per-candidate constraint evaluation and placement emission.
//!
//! Checks run cheapest first and stop at the first failure:
//! 1. probability gate (one draw in `[0, 1000)` per candidate, always consumed),
//! 2. position resolution (tile centre or jitter inside the tile),
//! 3. same-rule spacing against the [`AcceptanceIndex`],
//! 4. proximity to a block set via a precomputed [`ProximityField`],
//! 5. population cap.
use std::fmt;

use glam::{IVec2, Vec2};
use rand::Rng as RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::random::{below, rand01, range_f32};
use crate::rules::{AnchorPoint, Rule, SpawnPayload, SPAWN_CHANCE_SCALE};
use crate::scatter::index::AcceptanceIndex;
use crate::scatter::{GroupTag, Placement, SpawnedVariant, SpriteState};
use crate::terrain::proximity::ProximityField;

/// Why a candidate was not placed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The probability gate did not accept the candidate.
    Chance,
    /// Too close to an earlier placement of the same rule.
    Spacing,
    /// No proximity block within range.
    Proximity,
    /// The rule's population cap leaves no room.
    Capacity,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Chance => "chance",
            Rejection::Spacing => "spacing",
            Rejection::Proximity => "proximity",
            Rejection::Capacity => "capacity",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluates candidates for one rule.
pub struct ConstraintEvaluator<'a> {
    rule: &'a Rule,
    rule_index: usize,
    proximity: Option<&'a ProximityField>,
    tile_size: f32,
}

impl<'a> ConstraintEvaluator<'a> {
    /// `proximity` must be the field for the rule's proximity blocks when the rule has a
    /// proximity constraint; it is ignored otherwise.
    pub fn new(
        rule: &'a Rule,
        rule_index: usize,
        proximity: Option<&'a ProximityField>,
        tile_size: f32,
    ) -> Self {
        debug_assert!(
            rule.proximity.is_none() || proximity.is_some(),
            "rule '{}' needs a proximity field",
            rule.name
        );
        Self {
            rule,
            rule_index,
            proximity,
            tile_size,
        }
    }

    pub fn rule(&self) -> &Rule {
        self.rule
    }

    /// Evaluates `tile`, returning the tile-space position to place at.
    ///
    /// `placed` is the number of placements the rule already made in this pass.
    pub fn evaluate(
        &self,
        tile: IVec2,
        index: &AcceptanceIndex,
        placed: u32,
        rng: &mut dyn RngCore,
    ) -> Result<Vec2, Rejection> {
        if below(rng, SPAWN_CHANCE_SCALE) >= self.rule.spawn_chance {
            return Err(Rejection::Chance);
        }

        let position = self.resolve_position(tile, rng);

        if !index.is_clear(position, self.rule.min_distance_from_same_rule) {
            return Err(Rejection::Spacing);
        }

        if let Some(proximity) = &self.rule.proximity {
            let within = self
                .proximity
                .is_some_and(|field| field.within(tile, proximity.max_distance));
            if !within {
                return Err(Rejection::Proximity);
            }
        }

        if placed >= self.rule.max_spawns {
            return Err(Rejection::Capacity);
        }

        Ok(position)
    }

    /// Tile centre, or a uniform point inside the tile for random placement.
    fn resolve_position(&self, tile: IVec2, rng: &mut dyn RngCore) -> Vec2 {
        let offset = if self.rule.random_placement {
            Vec2::new(rand01(rng), rand01(rng))
        } else {
            Vec2::splat(0.5)
        };
        tile.as_vec2() + offset
    }

    /// Builds the placement for an accepted tile-space position, drawing the variant,
    /// scale and starting phase.
    pub fn emit(
        &self,
        position: Vec2,
        group: Option<GroupTag>,
        rng: &mut dyn RngCore,
    ) -> Placement {
        let variants = self.rule.payload.variants();
        let pick = below(rng, variants.len() as u32) as usize;
        let id = variants[pick.min(variants.len() - 1)].clone();

        let (variant, scale, rotation, anchor, anchor_offset) = match &self.rule.payload {
            SpawnPayload::Element { visuals, .. } => (
                SpawnedVariant::Element(id),
                visuals.base_scale * range_f32(rng, visuals.scale_min, visuals.scale_max),
                visuals.rotation,
                visuals.anchor,
                visuals.anchor_offset,
            ),
            SpawnPayload::Entity { .. } => (
                SpawnedVariant::Entity(id),
                1.0,
                0.0,
                AnchorPoint::TextureDefault,
                Vec2::ZERO,
            ),
        };

        let sprite = &self.rule.sprite;
        let phase = if sprite.random_phase {
            below(rng, sprite.phase_count)
        } else {
            sprite.phase
        };

        Placement {
            rule: self.rule.name.clone(),
            rule_index: self.rule_index,
            variant,
            tile: position.floor().as_ivec2(),
            position: position * self.tile_size,
            scale,
            rotation,
            anchor,
            anchor_offset,
            sprite: SpriteState {
                phase,
                frame: sprite.frame,
                animated: sprite.animated,
                animation_speed: sprite.animation_speed,
            },
            group,
        }
    }
}
