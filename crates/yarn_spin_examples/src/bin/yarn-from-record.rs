use anyhow::Context;
use yarn_spin::prelude::*;
use yarn_spin_examples::{init_tracing, load_record, render_yarn_to_png, RenderConfig};

// Usage: yarn-from-record <record.json> [seed]
fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let path = args.next().context("missing record path")?;
    let seed: u64 = args.next().map_or(Ok(0), |s| s.parse()).context("seed")?;

    let record = load_record(&path)?;
    let mut warnings = VecSink::filtered([GenerationEventKind::Warning]);
    let out = YarnGenerator::new(GenerateConfig::new(seed))
        .generate_with_events(&record, &mut warnings)?;
    for event in warnings.as_slice() {
        if let GenerationEvent::Warning { context, message } = event {
            eprintln!("warning [{context}]: {message}");
        }
    }

    let mut kernel = InMemoryKernel::with_default_profiles();
    let handles = assemble(&mut kernel, &out, &record)?;
    println!(
        "{path}: {} objects, material #{}",
        kernel.objects().len(),
        handles.material.0
    );

    render_yarn_to_png(
        &out,
        &record.material,
        &RenderConfig::new((1600, 400)),
        "yarn-from-record.png",
    )?;
    Ok(())
}
