use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

use dissonance::container::OutputContainer;
use dissonance::converter::EXPERIMENT_GROUP;
use dissonance::value::Value;

/// Display information about a container
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let container = OutputContainer::read(&file).context("Failed to read container")?;
    let manifest = container.manifest();
    let root = container.root();

    println!("Container Information");
    println!("=====================");
    println!("File: {}", file.display());
    println!();

    println!("Manifest:");
    println!("  Format version: {}", manifest.format_version);
    println!("  Converter: {}", manifest.converter);
    println!("  Created: {}", manifest.created);
    println!("  Modified: {}", manifest.modified);
    println!("  Last run: {}", manifest.run_id);
    for source in &manifest.source_files {
        println!("  Source: {}", source);
    }
    println!();

    println!("Contents:");
    println!("  Groups: {}", root.group_count());
    println!("  Datasets: {}", root.dataset_count());
    println!("  Samples: {}", root.sample_count());
    println!();

    let Some(experiment) = root.group(EXPERIMENT_GROUP) else {
        println!("No experiment group");
        return Ok(());
    };

    let mut per_protocol: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, epoch) in experiment.groups() {
        let name = epoch
            .attr("protocolname")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>");
        *per_protocol.entry(name).or_default() += 1;
    }

    println!("Epochs by protocol:");
    for (name, count) in &per_protocol {
        println!("  {:>6}  {}", count, name);
    }

    Ok(())
}
