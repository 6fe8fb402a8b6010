use anyhow::{anyhow, Context};
use yarn_spin::prelude::*;
use yarn_spin_examples::{init_tracing, render_yarn_to_png, write_obj, write_record, RenderConfig};

// Usage: yarn-preset [preset] [seed]
fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "light".to_owned());
    let seed: u64 = match args.next() {
        Some(s) => s.parse().context("seed must be an integer")?,
        None => 5,
    };
    let preset = Preset::from_name(&name).ok_or_else(|| {
        let known: Vec<_> = Preset::ALL.iter().map(|p| p.name()).collect();
        anyhow!("unknown preset '{name}', expected one of {known:?}")
    })?;

    let record = preset.record();
    let generator = YarnGenerator::try_new(GenerateConfig::new(seed))?;
    let out = generator.generate(&record)?;

    let stem = format!("yarn-{}", preset.name());
    write_record(&record, format!("{stem}.json"))?;
    write_obj(
        [("yarn", &out.yarn), ("flyaways", &out.flyaways.to_graph())],
        format!("{stem}.obj"),
    )?;
    render_yarn_to_png(
        &out,
        &record.material,
        &RenderConfig::new((1600, 400)),
        format!("{stem}.png"),
    )?;

    let report = out.report();
    println!(
        "{}: {} fibres, {} vertices, {} of {} flyaways ({} loops, {} hairs)",
        preset.name(),
        out.yarn.polyline_count(),
        out.yarn.vertex_count(),
        report.realized,
        report.target,
        report.loops,
        report.hairs
    );
    Ok(())
}
