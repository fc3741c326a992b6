use tile_scatter::prelude::*;
use tile_scatter_examples::{
    island_grid, render_placements_to_png, IslandShape, RenderConfig, RuleStyle,
};

fn main() -> anyhow::Result<()> {
    let seed = 7;
    let shape = IslandShape {
        coast: 0.8,
        meadow: 0.7,
        ..Default::default()
    };
    let grid = island_grid(192, seed, shape);

    // Herds roam the meadow. Herds keep 12 tiles apart while goats inside a herd
    // huddle closer, and members stay on the blocks their rule spawns on.
    let rules = RuleSet::new()
        .with_rule(
            Rule::entity("goats", ["GOAT"])
                .with_spawn_blocks([blocks::GRASS_2])
                .with_spawn_chance(30)
                .with_max_spawns(120)
                .with_min_distance(12.0)
                .with_group(6.0, 3, 8)
                .with_random_placement(true),
        )?
        .with_rule(
            Rule::element("rocks", ["ROCK_SMALL", "ROCK_LARGE"], ElementVisuals::new())
                .with_spawn_blocks([blocks::DIRT])
                .with_spawn_chance(150)
                .with_min_distance(3.0),
        )?;

    let config = RunConfig::default()
        .with_members_follow_block_filter(true)
        .with_group_siblings_exempt(true)
        .with_group_member_attempts(16);
    let mut events = VecSink::only([SpawnEventKind::GroupSpawned]);
    let result = run_rule_set_with_events(&rules, &grid, &config, seed, &mut events)?;

    let sizes: Vec<u32> = events
        .as_slice()
        .iter()
        .filter_map(|e| match e {
            SpawnEvent::GroupSpawned { size, .. } => Some(*size),
            _ => None,
        })
        .collect();
    println!("{} herds, sizes {:?}", sizes.len(), sizes);

    let rc = RenderConfig::new(5, config.tile_size)
        .with_rule_style(
            "goats",
            RuleStyle {
                color: [250, 250, 250],
                radius: 3,
            },
        )
        .with_rule_style(
            "rocks",
            RuleStyle {
                color: [70, 70, 70],
                radius: 2,
            },
        );

    let out = "island-grouped-herds.png";
    render_placements_to_png(&grid, &result, &rc, out)?;

    Ok(())
}
