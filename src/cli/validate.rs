use anyhow::Result;
use log::info;
use std::path::PathBuf;

/// Validate container integrity
pub fn run(file: PathBuf) -> Result<()> {
    use dissonance::validator::validate_container_report;

    info!("Validating {}", file.display());

    let report = validate_container_report(&file);

    #[cfg(feature = "colorized_output")]
    {
        println!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", report);
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
