use rand::rngs::StdRng;
use rand::SeedableRng;
use yarn_spin::prelude::*;
use yarn_spin_examples::{init_tracing, render_yarn_to_png, RenderConfig, View};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let record = Preset::GreyThick4Level.record();
    let config = GenerateConfig::new(7);
    let mut rng = StdRng::seed_from_u64(config.seed);

    // Print level progress as it happens.
    let mut sink = FnSink::new(|event| match event {
        GenerationEvent::LevelBuilt {
            name,
            placements,
            vertices,
            ..
        } => println!("{name}: {placements} copies, {vertices} vertices"),
        GenerationEvent::FlyawaysGenerated { report } => {
            println!("flyaways: {} of {}", report.realized, report.target)
        }
        _ => {}
    });
    let out = generate_yarn(&record, &config, &mut rng, Some(&mut sink))?;

    for (view, file) in [
        (View::Side, "yarn-four-level-side.png"),
        (View::Front, "yarn-four-level-front.png"),
    ] {
        let rc = RenderConfig::new((1200, 1200)).with_view(view);
        render_yarn_to_png(&out, &record.material, &rc, file)?;
    }
    Ok(())
}
