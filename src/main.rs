//! # dissonance-convert
//!
//! Command-line front end for converting electrophysiology recordings into
//! output containers.
//!
//! ## Usage
//!
//! ```bash
//! # Full rebuild (writes WT/2020-01-26A.dsn)
//! dissonance-convert convert WT/2020-01-26A.json
//!
//! # Rebuild one protocol in an existing container
//! dissonance-convert convert WT/2020-01-26A.json out.dsn --protocol ChirpStimulusLED
//!
//! # Refresh responses and spikes only
//! dissonance-convert update WT/2020-01-26A.json out.dsn --responses
//!
//! # Recompute R* with a new calibration table
//! dissonance-convert rstarr WT/2020-01-26A.json out.dsn --config dissonance.toml
//!
//! # Inspect and validate
//! dissonance-convert info out.dsn
//! dissonance-convert validate out.dsn
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
