use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use dissonance::converter::EpochKeyScheme;

/// Recompute light intensities in an existing container
pub fn run(
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    key_scheme: Option<EpochKeyScheme>,
) -> Result<()> {
    if !output.exists() {
        anyhow::bail!("Output container does not exist: {}", output.display());
    }

    info!("dissonance - R* refresh");
    info!("Input:  {}", input.display());
    info!("Output: {}", output.display());

    let mut session = super::open_session(&input, config.as_deref(), key_scheme)?;
    let summary = session
        .update_rstarr(&output)
        .context("R* refresh failed")?;

    super::print_summary(&session, &summary);
    Ok(())
}
