//! Built-in island policy: palms and coconuts on beaches, pirates and wildlife on
//! grassland, sharks in deep water.
//!
//! Tree spawn chance and cap vary with the session seed so that different sessions
//! get different but reproducible vegetation density.
use crate::rules::{ElementVisuals, Rule};
use crate::terrain::blocks;

pub const COCONUT_TREES: &str = "CoconutTrees";
pub const COCONUTS: &str = "coconut";
pub const ANTAGONISTS: &str = "AntagonistEntities";
pub const SHARKS: &str = "SharkEntities";
pub const GIRAFFES: &str = "GiraffeEntities";
pub const ARMADILLOS: &str = "ArmadilloEntities";

/// Number of facing directions on entity sprite sheets.
const ENTITY_PHASES: u32 = 8;

/// Builds the default rules for `seed`. Every returned rule validates.
pub fn default_rules(seed: u64) -> Vec<Rule> {
    vec![
        coconut_trees(seed),
        coconuts(),
        antagonists(),
        sharks(),
        giraffes(),
        armadillos(),
    ]
}

fn coconut_trees(seed: u64) -> Rule {
    Rule::element(
        COCONUT_TREES,
        ["COCONUT_TREE_1", "COCONUT_TREE_2", "COCONUT_TREE_3"],
        ElementVisuals::new()
            .with_scale_range(0.7, 1.0)
            .with_base_scale(7.0),
    )
    .with_spawn_blocks([blocks::SAND])
    .with_spawn_chance(40 + (seed % 20) as u32)
    .with_max_spawns(800 + (seed % 400) as u32)
    .with_min_distance(4.0)
    .with_proximity(blocks::WATER, 3.0)
    .with_random_placement(true)
}

fn coconuts() -> Rule {
    Rule::element(
        COCONUTS,
        ["COCONUT"],
        ElementVisuals::new().with_scale_range(1.0, 1.3),
    )
    .with_spawn_blocks([blocks::SAND])
    .with_spawn_chance(1)
    .with_max_spawns(3)
    .with_min_distance(10.0)
    .with_proximity(blocks::WATER, 4.0)
    .with_random_placement(true)
}

fn antagonists() -> Rule {
    Rule::entity(ANTAGONISTS, ["PIRATE_WOMAN", "PIRATE_MAN"])
        .with_spawn_blocks([blocks::GRASS_2])
        .with_spawn_chance(80)
        .with_max_spawns(100)
        .with_min_distance(8.0)
        .with_group(3.0, 2, 4)
        .with_random_placement(true)
        .with_random_phase(ENTITY_PHASES)
}

fn sharks() -> Rule {
    Rule::entity(SHARKS, ["SHARK"])
        .with_spawn_blocks([blocks::WATER_4])
        .with_spawn_chance(1000)
        .with_max_spawns(50)
        .with_min_distance(8.0)
        .with_random_placement(true)
        .with_random_phase(ENTITY_PHASES)
}

fn giraffes() -> Rule {
    Rule::entity(GIRAFFES, ["GIRAFFE"])
        .with_spawn_blocks([blocks::GRASS_2])
        .with_spawn_chance(1000)
        .with_max_spawns(1000)
        .with_min_distance(8.0)
        .with_random_placement(true)
        .with_random_phase(ENTITY_PHASES)
}

fn armadillos() -> Rule {
    Rule::entity(ARMADILLOS, ["ARMADILLO"])
        .with_spawn_blocks([blocks::GRASS_2])
        .with_spawn_chance(200)
        .with_max_spawns(1000)
        .with_min_distance(8.0)
        .with_group(5.0, 2, 6)
        .with_random_placement(true)
        .with_random_phase(ENTITY_PHASES)
}
