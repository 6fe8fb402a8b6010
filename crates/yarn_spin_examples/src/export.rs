//! Sample records as JSON and strand geometry as Wavefront OBJ.
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;
use yarn_spin::prelude::{Error, StrandGraph, YarnRecord};

/// Write the per-sample record next to its image.
pub fn write_record(record: &YarnRecord, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(BufWriter::new(file), record)?;
    info!("Wrote {}.", path.as_ref().display());
    Ok(())
}

/// Read and validate a record. Malformed or out-of-range records are `InvalidSpec`.
pub fn load_record(path: impl AsRef<Path>) -> yarn_spin::error::Result<YarnRecord> {
    let file = File::open(path.as_ref())?;
    let record: YarnRecord = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::InvalidSpec(format!("{}: {e}", path.as_ref().display())))?;
    record.validate()?;
    Ok(record)
}

/// Write each graph as a named OBJ object made of line elements.
pub fn write_obj<'a>(
    objects: impl IntoIterator<Item = (&'a str, &'a StrandGraph)>,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    writeln!(out, "# yarn_spin strands, millimetres")?;

    // OBJ indices are 1-based and global across objects.
    let mut base = 1u64;
    for (name, graph) in objects {
        writeln!(out, "o {name}")?;
        for v in &graph.vertices {
            writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for e in &graph.edges {
            writeln!(out, "l {} {}", base + e[0] as u64, base + e[1] as u64)?;
        }
        base += graph.vertex_count() as u64;
    }
    out.flush()?;
    info!("Wrote {}.", path.as_ref().display());
    Ok(())
}
