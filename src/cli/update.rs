use anyhow::{Context, Result};
use log::{info, warn};
use std::path::PathBuf;

use dissonance::converter::{EpochKeyScheme, UpdateFlags};

/// Refresh parts of an existing container
pub fn run(
    input: PathBuf,
    output: PathBuf,
    flags: UpdateFlags,
    config: Option<PathBuf>,
    key_scheme: Option<EpochKeyScheme>,
) -> Result<()> {
    if !output.exists() {
        anyhow::bail!("Output container does not exist: {}", output.display());
    }
    if flags.is_empty() {
        warn!("No --attrs, --responses or --stimuli given; only missing epochs will be written");
    }

    info!("dissonance - selective update");
    info!("=============================");
    info!("Input:  {}", input.display());
    info!("Output: {}", output.display());
    info!(
        "Parts: attrs={} responses={} stimuli={}",
        flags.attrs, flags.responses, flags.stimuli
    );

    let mut session = super::open_session(&input, config.as_deref(), key_scheme)?;
    let summary = session.update(&output, flags).context("Update failed")?;

    super::print_summary(&session, &summary);
    Ok(())
}
