use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use yarn_spin::prelude::*;
use yarn_spin_examples::{init_tracing, render_yarn_to_png, write_record, RenderConfig};

// Usage: yarn-random-samples [count] [first_seed]
//
// Writes one image and one JSON record per sample into `samples/`, the layout the
// parameter-estimation dataset expects.
fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let count: u64 = args.next().map_or(Ok(4), |s| s.parse()).context("count")?;
    let first: u64 = args.next().map_or(Ok(0), |s| s.parse()).context("first_seed")?;

    let dir = PathBuf::from("samples");
    fs::create_dir_all(&dir)?;
    let render = RenderConfig::new((1024, 256)).with_background([0, 0, 0]);

    for seed in first..first + count {
        let record = sample_yarn_record(seed);
        let out = YarnGenerator::new(GenerateConfig::new(seed)).generate(&record)?;

        let stem = dir.join(format!("sample_{seed:05}"));
        render_yarn_to_png(&out, &record.material, &render, stem.with_extension("png"))?;
        write_record(&record, stem.with_extension("json"))?;

        println!(
            "sample {seed}: {} plies, {} fibres, {} flyaways",
            record.fiber.placement.count(),
            out.yarn.polyline_count(),
            out.flyaways.len()
        );
    }
    Ok(())
}
