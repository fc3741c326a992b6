#![forbid(unsafe_code)]
//! tile_scatter: Rule-driven, seeded placement of elements and entities on tile grids.
//!
//! Modules:
//! - rules: declarative spawn rules, rule sets and the built-in default policy
//! - terrain: block identifiers, the terrain grid interface and proximity fields
//! - scatter: candidate scanning, constraint evaluation, grouping, the engine and events
//! - random: seeded stream derivation and uniform draw helpers
pub mod error;
pub mod random;
pub mod rules;
pub mod scatter;
pub mod terrain;

/// Convenient re-exports for common types. Import with `use tile_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::random::seed_for_rule;
    pub use crate::rules::{
        AnchorPoint, ElementId, ElementVisuals, EntityId, Grouping, Proximity, Rule, RuleSet,
        SpawnPayload, SpawnType, SpriteDefaults,
    };
    pub use crate::scatter::evaluator::{ConstraintEvaluator, Rejection};
    pub use crate::scatter::events::{
        EventSink, FnSink, MultiSink, SpawnEvent, SpawnEventKind, VecSink,
    };
    pub use crate::scatter::group::GroupExpander;
    pub use crate::scatter::index::AcceptanceIndex;
    pub use crate::scatter::runner::{
        run_rule_set, run_rule_set_with_events, PlacementEngine, RuleResult, RuleSummary,
        RunConfig, RunResult,
    };
    pub use crate::scatter::scanner::CandidateScanner;
    pub use crate::scatter::{GroupTag, Placement, SpawnedVariant, SpriteState};
    pub use crate::terrain::proximity::{ProximityCache, ProximityField};
    pub use crate::terrain::{blocks, BlockId, BlockMask, TerrainGrid, TileGrid};
}
