use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use dissonance::container::EXTENSION;
use dissonance::converter::EpochKeyScheme;

/// Convert a recording to a container, optionally only one protocol
pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    protocol: Option<String>,
    config: Option<PathBuf>,
    key_scheme: Option<EpochKeyScheme>,
) -> Result<()> {
    let output = output.unwrap_or_else(|| default_output(&input));

    info!("dissonance - recording to container");
    info!("===================================");
    info!("Input:  {}", input.display());
    info!("Output: {}", output.display());

    let mut session = super::open_session(&input, config.as_deref(), key_scheme)?;

    let summary = match protocol {
        Some(name) => {
            info!("Mode: rebuild epochs of protocol {}", name);
            session
                .map_protocol(&name, &output)
                .with_context(|| format!("Failed to map protocol {}", name))?
        }
        None => {
            info!("Mode: full rebuild");
            session.to_container(&output).context("Conversion failed")?
        }
    };

    super::print_summary(&session, &summary);
    Ok(())
}

/// `<dir>/<stem>.dsn` next to the input
fn default_output(input: &Path) -> PathBuf {
    input.with_extension(EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_replaces_extension() {
        assert_eq!(
            default_output(Path::new("WT/2020-01-26A.json")),
            PathBuf::from("WT/2020-01-26A.dsn")
        );
        assert_eq!(
            default_output(Path::new("2020-01-26A")),
            PathBuf::from("2020-01-26A.dsn")
        );
    }
}
