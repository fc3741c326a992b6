//! High-level engine for running rule sets over a terrain grid.
//!
//! Rules are evaluated in rule-set order, each with a fresh [`AcceptanceIndex`] and its
//! own random stream seeded by [`seed_for_rule`]. Rules never see each other's
//! placements, so with the `parallel` feature they run on worker threads; results and
//! buffered events are merged back in rule-set order and match a sequential pass.
use std::sync::Arc;

use glam::UVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::random::seed_for_rule;
use crate::rules::{Rule, RuleSet};
use crate::scatter::evaluator::{ConstraintEvaluator, Rejection};
use crate::scatter::events::{EventSink, SpawnEvent, SpawnEventKind};
use crate::scatter::group::GroupExpander;
use crate::scatter::index::AcceptanceIndex;
use crate::scatter::scanner::CandidateScanner;
use crate::scatter::{GroupTag, Placement};
use crate::terrain::proximity::{ProximityCache, ProximityField};
use crate::terrain::{BlockMask, TerrainGrid};

/// Configuration for a placement pass.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// World units per tile; placement positions are tile-space positions times this.
    pub tile_size: f32,
    /// Keep group members inside the terrain grid.
    pub clamp_groups_to_grid: bool,
    /// Position draws per group member before the member is given up.
    pub group_member_attempts: u32,
    /// Require group members to stand on one of the rule's spawn blocks.
    pub members_follow_block_filter: bool,
    /// Let members of one group stand closer than the rule's minimum distance.
    pub group_siblings_exempt: bool,
    /// Evaluate rules on worker threads (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tile_size: 1.0,
            clamp_groups_to_grid: true,
            group_member_attempts: 8,
            members_follow_block_filter: false,
            group_siblings_exempt: false,
            parallel: false,
        }
    }
}

impl RunConfig {
    /// Creates a new [`RunConfig`] with the given tile size.
    pub fn new(tile_size: f32) -> Self {
        Self {
            tile_size,
            ..Default::default()
        }
    }

    pub fn with_tile_size(mut self, tile_size: f32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_clamp_groups_to_grid(mut self, clamp: bool) -> Self {
        self.clamp_groups_to_grid = clamp;
        self
    }

    pub fn with_group_member_attempts(mut self, attempts: u32) -> Self {
        self.group_member_attempts = attempts;
        self
    }

    pub fn with_members_follow_block_filter(mut self, follow: bool) -> Self {
        self.members_follow_block_filter = follow;
        self
    }

    pub fn with_group_siblings_exempt(mut self, exempt: bool) -> Self {
        self.group_siblings_exempt = exempt;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(Error::InvalidConfig(
                "tile_size must be finite and > 0".into(),
            ));
        }
        if self.group_member_attempts == 0 {
            return Err(Error::InvalidConfig(
                "group_member_attempts must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

/// Counters for one rule in one pass.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSummary {
    pub rule: String,
    pub rule_index: usize,
    /// Eligible tiles visited before the scan ended.
    pub candidates: usize,
    /// Placements emitted, group members included.
    pub placements: usize,
    /// Clusters committed.
    pub groups: usize,
    pub rejected_chance: usize,
    pub rejected_spacing: usize,
    pub rejected_proximity: usize,
    pub rejected_capacity: usize,
    /// Whether the scan stopped early because `max_spawns` was reached.
    pub cap_reached: bool,
}

impl RuleSummary {
    fn new(rule: &Rule, rule_index: usize) -> Self {
        Self {
            rule: rule.name.clone(),
            rule_index,
            ..Default::default()
        }
    }

    fn reject(&mut self, reason: Rejection) {
        match reason {
            Rejection::Chance => self.rejected_chance += 1,
            Rejection::Spacing => self.rejected_spacing += 1,
            Rejection::Proximity => self.rejected_proximity += 1,
            Rejection::Capacity => self.rejected_capacity += 1,
        }
    }

    /// Total candidates rejected for any reason.
    pub fn rejected(&self) -> usize {
        self.rejected_chance
            + self.rejected_spacing
            + self.rejected_proximity
            + self.rejected_capacity
    }
}

/// Output of a single rule.
#[derive(Debug, Clone)]
pub struct RuleResult {
    pub placements: Vec<Placement>,
    pub summary: RuleSummary,
}

/// Result of running a rule set.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// Placements of all rules, rule by rule in rule-set order.
    pub placements: Vec<Placement>,
    /// Per-rule counters in rule-set order.
    pub rules: Vec<RuleSummary>,
    /// Total candidate tiles evaluated.
    pub candidates_scanned: usize,
    /// Total candidate tiles rejected.
    pub candidates_rejected: usize,
}

impl RunResult {
    /// Creates a new empty [`RunResult`].
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, rule: RuleResult) {
        self.candidates_scanned += rule.summary.candidates;
        self.candidates_rejected += rule.summary.rejected();
        self.placements.extend(rule.placements);
        self.rules.push(rule.summary);
    }

    /// Placements produced by the rule at `rule_index`.
    pub fn placements_for(&self, rule_index: usize) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(move |p| p.rule_index == rule_index)
    }
}

/// Runs rule sets against one terrain grid, reusing proximity fields between runs.
pub struct PlacementEngine<'a, T: TerrainGrid + ?Sized> {
    /// Run configuration applied to this engine.
    pub config: RunConfig,
    /// Terrain read during passes; never mutated.
    pub terrain: &'a T,
    proximity: ProximityCache,
}

impl<'a, T: TerrainGrid + ?Sized> PlacementEngine<'a, T> {
    /// Creates an engine, failing on invalid configuration or an empty grid.
    pub fn try_new(config: RunConfig, terrain: &'a T) -> Result<Self> {
        config.validate()?;
        check_terrain(terrain)?;
        Ok(Self {
            config,
            terrain,
            proximity: ProximityCache::new(),
        })
    }

    pub fn new(config: RunConfig, terrain: &'a T) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid run configuration");
        Self {
            config,
            terrain,
            proximity: ProximityCache::new(),
        }
    }

    /// Runs every rule of `rules` for the session `seed`.
    pub fn run(&mut self, rules: &RuleSet, seed: u64) -> RunResult {
        run_rules_internal(
            rules.all(),
            self.terrain,
            &self.config,
            &mut self.proximity,
            seed,
            &mut (),
        )
    }

    pub fn run_with_events(
        &mut self,
        rules: &RuleSet,
        seed: u64,
        sink: &mut dyn EventSink,
    ) -> RunResult {
        run_rules_internal(
            rules.all(),
            self.terrain,
            &self.config,
            &mut self.proximity,
            seed,
            sink,
        )
    }

    /// Runs a single rule as if it sat at `rule_index` in a rule set.
    pub fn run_rule(&mut self, rule: &Rule, rule_index: usize, seed: u64) -> Result<RuleResult> {
        rule.validate()?;
        let field = proximity_field_for(rule, self.terrain, &mut self.proximity, &mut ());
        Ok(run_rule_internal(
            rule,
            rule_index,
            self.terrain,
            field.as_deref(),
            &self.config,
            seed,
            &mut (),
        ))
    }
}

/// Runs `rules` over `terrain` for the session `seed`.
pub fn run_rule_set<T: TerrainGrid + ?Sized>(
    rules: &RuleSet,
    terrain: &T,
    config: &RunConfig,
    seed: u64,
) -> Result<RunResult> {
    run_rule_set_with_events(rules, terrain, config, seed, &mut ())
}

pub fn run_rule_set_with_events<T: TerrainGrid + ?Sized>(
    rules: &RuleSet,
    terrain: &T,
    config: &RunConfig,
    seed: u64,
    sink: &mut dyn EventSink,
) -> Result<RunResult> {
    config.validate()?;
    check_terrain(terrain)?;
    let mut cache = ProximityCache::new();
    Ok(run_rules_internal(
        rules.all(),
        terrain,
        config,
        &mut cache,
        seed,
        sink,
    ))
}

fn check_terrain<T: TerrainGrid + ?Sized>(terrain: &T) -> Result<()> {
    let size = UVec2::from(terrain.size());
    if size.x == 0 || size.y == 0 {
        return Err(Error::InvalidTerrain(format!(
            "terrain grid is empty ({}x{})",
            size.x, size.y
        )));
    }
    Ok(())
}

fn warn_event(sink: &mut dyn EventSink, context: &str, message: String) {
    if sink.wants(SpawnEventKind::Warning) {
        sink.send(SpawnEvent::Warning {
            context: context.to_owned(),
            message,
        });
    }
}

fn proximity_field_for<T: TerrainGrid + ?Sized>(
    rule: &Rule,
    terrain: &T,
    cache: &mut ProximityCache,
    sink: &mut dyn EventSink,
) -> Option<Arc<ProximityField>> {
    let proximity = rule.proximity.as_ref()?;
    let field = cache.get_or_build(terrain, &proximity.blocks);
    if field.target_count() == 0 {
        warn!(
            "Rule '{}' requires proximity to blocks absent from the terrain; it cannot place.",
            rule.name
        );
        warn_event(
            sink,
            &format!("rule:{}", rule.name),
            "Proximity blocks are absent from the terrain".into(),
        );
    }
    Some(field)
}

fn run_rules_internal<T: TerrainGrid + ?Sized>(
    rules: &[Rule],
    terrain: &T,
    config: &RunConfig,
    cache: &mut ProximityCache,
    seed: u64,
    sink: &mut dyn EventSink,
) -> RunResult {
    if sink.wants(SpawnEventKind::RunStarted) {
        sink.send(SpawnEvent::RunStarted {
            config: config.clone(),
            rule_count: rules.len(),
            seed,
        });
    }

    if rules.is_empty() {
        warn!("Rule set has no rules.");
        warn_event(sink, "rules", "Rule set has no rules".into());
    }

    // Fields are built up front so rule evaluation only reads shared data.
    let fields: Vec<Option<Arc<ProximityField>>> = rules
        .iter()
        .map(|rule| proximity_field_for(rule, terrain, cache, sink))
        .collect();

    let rule_results = evaluate_rules(rules, &fields, terrain, config, seed, sink);

    let mut result = RunResult::new();
    for rule_result in rule_results {
        result.push(rule_result);
    }

    info!(
        "Placement pass finished | rules: {} | candidates: {} | placements: {}.",
        rules.len(),
        result.candidates_scanned,
        result.placements.len()
    );

    if sink.wants(SpawnEventKind::RunFinished) {
        sink.send(SpawnEvent::RunFinished {
            result: result.clone(),
        });
    }

    result
}

#[cfg(not(feature = "parallel"))]
fn evaluate_rules<T: TerrainGrid + ?Sized>(
    rules: &[Rule],
    fields: &[Option<Arc<ProximityField>>],
    terrain: &T,
    config: &RunConfig,
    seed: u64,
    sink: &mut dyn EventSink,
) -> Vec<RuleResult> {
    if config.parallel {
        debug!("Parallel evaluation requested without the `parallel` feature; running sequentially.");
    }
    evaluate_rules_sequential(rules, fields, terrain, config, seed, sink)
}

#[cfg(feature = "parallel")]
fn evaluate_rules<T: TerrainGrid + ?Sized>(
    rules: &[Rule],
    fields: &[Option<Arc<ProximityField>>],
    terrain: &T,
    config: &RunConfig,
    seed: u64,
    sink: &mut dyn EventSink,
) -> Vec<RuleResult> {
    use rayon::prelude::*;

    use crate::scatter::events::BufferSink;

    if !config.parallel {
        return evaluate_rules_sequential(rules, fields, terrain, config, seed, sink);
    }

    let template = BufferSink::mirroring(&*sink);
    let outcomes: Vec<(RuleResult, BufferSink)> = rules
        .par_iter()
        .enumerate()
        .map(|(index, rule)| {
            let mut buffer = BufferSink::mirroring(&template);
            let result = run_rule_internal(
                rule,
                index,
                terrain,
                fields[index].as_deref(),
                config,
                seed,
                &mut buffer,
            );
            (result, buffer)
        })
        .collect();

    let mut results = Vec::with_capacity(outcomes.len());
    for (result, buffer) in outcomes {
        buffer.replay_into(&mut *sink);
        results.push(result);
    }
    results
}

fn evaluate_rules_sequential<T: TerrainGrid + ?Sized>(
    rules: &[Rule],
    fields: &[Option<Arc<ProximityField>>],
    terrain: &T,
    config: &RunConfig,
    seed: u64,
    sink: &mut dyn EventSink,
) -> Vec<RuleResult> {
    rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            run_rule_internal(
                rule,
                index,
                terrain,
                fields[index].as_deref(),
                config,
                seed,
                sink,
            )
        })
        .collect()
}

fn run_rule_internal<T: TerrainGrid + ?Sized>(
    rule: &Rule,
    rule_index: usize,
    terrain: &T,
    proximity: Option<&ProximityField>,
    config: &RunConfig,
    seed: u64,
    sink: &mut dyn EventSink,
) -> RuleResult {
    info!(
        "Rule {}: '{}' | type: {:?} | cap: {}.",
        rule_index,
        rule.name,
        rule.spawn_type(),
        rule.max_spawns
    );
    if sink.wants(SpawnEventKind::RuleStarted) {
        sink.send(SpawnEvent::RuleStarted {
            index: rule_index,
            name: rule.name.clone(),
            spawn_type: rule.spawn_type(),
        });
    }

    let mut rng = StdRng::seed_from_u64(seed_for_rule(seed, rule_index));
    let mut index = AcceptanceIndex::for_min_distance(rule.min_distance_from_same_rule);
    let evaluator = ConstraintEvaluator::new(rule, rule_index, proximity, config.tile_size);
    let spawn_mask = BlockMask::new(&rule.spawn_blocks);
    let expander = rule.group.map(|grouping| {
        GroupExpander::new(grouping, rule.min_distance_from_same_rule, terrain)
            .with_clamp_to_grid(config.clamp_groups_to_grid)
            .with_attempts(config.group_member_attempts)
            .with_member_blocks(config.members_follow_block_filter.then_some(&spawn_mask))
            .with_siblings_exempt(config.group_siblings_exempt)
    });

    let mut summary = RuleSummary::new(rule, rule_index);
    let mut placements: Vec<Placement> = Vec::new();
    let mut next_group: u32 = 0;

    if rule.max_spawns == 0 {
        summary.cap_reached = true;
    } else {
        let wants_rejections = sink.wants(SpawnEventKind::CandidateRejected);
        let wants_placements = sink.wants(SpawnEventKind::PlacementMade);

        for tile in CandidateScanner::with_mask(terrain, spawn_mask.clone()) {
            summary.candidates += 1;
            let placed = placements.len() as u32;

            let cluster = evaluator
                .evaluate(tile, &index, placed, &mut rng)
                .and_then(|anchor| match &expander {
                    Some(expander) => expander.expand(
                        anchor,
                        rule.max_spawns - placed,
                        &index,
                        &mut rng,
                    ),
                    None => Ok(vec![anchor]),
                });

            let cluster = match cluster {
                Ok(cluster) => cluster,
                Err(reason) => {
                    summary.reject(reason);
                    if wants_rejections {
                        sink.send(SpawnEvent::CandidateRejected {
                            rule_index,
                            tile,
                            reason,
                        });
                    }
                    continue;
                }
            };

            let group_id = expander.as_ref().map(|_| {
                let id = next_group;
                next_group += 1;
                id
            });
            for (member, position) in cluster.iter().enumerate() {
                index.record(*position);
                let tag = group_id.map(|id| GroupTag {
                    id,
                    member: member as u32,
                });
                let placement = evaluator.emit(*position, tag, &mut rng);
                if wants_placements {
                    sink.send(SpawnEvent::PlacementMade {
                        rule_index,
                        placement: placement.clone(),
                    });
                }
                placements.push(placement);
            }
            if let Some(group_id) = group_id {
                summary.groups += 1;
                if sink.wants(SpawnEventKind::GroupSpawned) {
                    sink.send(SpawnEvent::GroupSpawned {
                        rule_index,
                        group_id,
                        size: cluster.len() as u32,
                    });
                }
            }

            if placements.len() as u32 >= rule.max_spawns {
                summary.cap_reached = true;
                break;
            }
        }
    }

    summary.placements = placements.len();

    if summary.candidates == 0 && rule.max_spawns > 0 {
        warn!("Rule '{}' found no eligible tiles.", rule.name);
        warn_event(
            sink,
            &format!("rule:{}", rule.name),
            "No tile matches the rule's spawn blocks".into(),
        );
    }
    debug!(
        "Rule '{}' done | candidates: {} | placed: {} | groups: {} | rejected chance/spacing/proximity/capacity: {}/{}/{}/{}.",
        rule.name,
        summary.candidates,
        summary.placements,
        summary.groups,
        summary.rejected_chance,
        summary.rejected_spacing,
        summary.rejected_proximity,
        summary.rejected_capacity
    );

    if sink.wants(SpawnEventKind::RuleFinished) {
        sink.send(SpawnEvent::RuleFinished {
            index: rule_index,
            summary: summary.clone(),
        });
    }

    RuleResult {
        placements,
        summary,
    }
}
