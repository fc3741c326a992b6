use tile_scatter::prelude::*;
use tile_scatter::rules::defaults;
use tile_scatter_examples::{
    island_grid, render_placements_to_png, IslandShape, RenderConfig, RuleStyle,
};

fn main() -> anyhow::Result<()> {
    let seed = 1234;
    let grid = island_grid(256, seed, IslandShape::default());
    let rules = RuleSet::with_defaults(seed);

    let config = RunConfig::new(16.0);
    let mut engine = PlacementEngine::try_new(config.clone(), &grid)?;

    let mut warnings = FnSink::new(|event: SpawnEvent| {
        if let SpawnEvent::Warning { context, message } = event {
            eprintln!("warning [{context}]: {message}");
        }
    });
    let result = engine.run_with_events(&rules, seed, &mut warnings);

    for summary in &result.rules {
        println!(
            "{:<20} placed {:>4} from {:>6} candidates ({} groups, cap reached: {})",
            summary.rule, summary.placements, summary.candidates, summary.groups, summary.cap_reached
        );
    }

    let rc = RenderConfig::new(4, config.tile_size)
        .with_rule_style(
            defaults::COCONUT_TREES,
            RuleStyle {
                color: [20, 90, 20],
                radius: 4,
            },
        )
        .with_rule_style(
            defaults::COCONUTS,
            RuleStyle {
                color: [110, 60, 20],
                radius: 3,
            },
        )
        .with_rule_style(
            defaults::ANTAGONISTS,
            RuleStyle {
                color: [200, 20, 20],
                radius: 3,
            },
        )
        .with_rule_style(
            defaults::SHARKS,
            RuleStyle {
                color: [230, 230, 240],
                radius: 3,
            },
        )
        .with_rule_style(
            defaults::GIRAFFES,
            RuleStyle {
                color: [240, 180, 30],
                radius: 3,
            },
        )
        .with_rule_style(
            defaults::ARMADILLOS,
            RuleStyle {
                color: [90, 60, 90],
                radius: 3,
            },
        );

    let out = "island-default-rules.png";
    render_placements_to_png(&grid, &result, &rc, out)?;

    Ok(())
}
