use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};

use dissonance::converter::{ConversionSession, EpochKeyScheme, RunSummary, UpdateFlags};

mod config;
mod convert;
mod info;
mod rstarr;
mod update;
mod validate;

/// dissonance - convert electrophysiology recordings to output containers
#[derive(Parser)]
#[command(name = "dissonance-convert")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Epoch group naming override.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KeySchemeArg {
    /// epoch{start time in unix seconds}
    Timestamp,
    /// epoch{position in the recording}
    Index,
}

impl From<KeySchemeArg> for EpochKeyScheme {
    fn from(arg: KeySchemeArg) -> Self {
        match arg {
            KeySchemeArg::Timestamp => EpochKeyScheme::Timestamp,
            KeySchemeArg::Index => EpochKeyScheme::Index,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a recording, or the epochs of one protocol, to a container
    Convert {
        /// Input recording (JSON export named YYYY-MM-DD*.json)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output container (defaults to the input name with .dsn)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Only rebuild epochs of this protocol, keeping the rest of the container
        #[arg(short = 'p', long, value_name = "NAME")]
        protocol: Option<String>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the epoch key scheme
        #[arg(long, value_enum, hide = true)]
        key_scheme: Option<KeySchemeArg>,
    },

    /// Refresh parts of every epoch in an existing container
    Update {
        /// Input recording
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Existing output container
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Rewrite epoch attributes
        #[arg(long)]
        attrs: bool,

        /// Rewrite response datasets and spikes
        #[arg(long)]
        responses: bool,

        /// Rewrite stimulus groups
        #[arg(long)]
        stimuli: bool,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the epoch key scheme
        #[arg(long, value_enum, hide = true)]
        key_scheme: Option<KeySchemeArg>,
    },

    /// Recompute R* light intensities in an existing container
    Rstarr {
        /// Input recording
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Existing output container
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the epoch key scheme
        #[arg(long, value_enum, hide = true)]
        key_scheme: Option<KeySchemeArg>,
    },

    /// Display information about a container
    Info {
        /// Container path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Validate container integrity
    Validate {
        /// Container path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Load the config file and the recording for one run.
fn open_session(
    input: &Path,
    config: Option<&Path>,
    key_scheme: Option<EpochKeyScheme>,
) -> Result<ConversionSession> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    let config = config::Config::load(config)?.into_conversion_config(key_scheme);
    info!("Epoch keys: {:?}", config.key_scheme);
    info!(
        "Spike threshold: {} (refractory {} samples)",
        config.detector.threshold, config.detector.refractory_samples
    );

    ConversionSession::open(input, &config)
        .with_context(|| format!("Failed to load recording {}", input.display()))
}

fn print_summary(session: &ConversionSession, summary: &RunSummary) {
    info!("Conversion complete!");
    info!("  Recording date: {}", session.recording_date());
    info!("  Genotype: {}", session.genotype());
    info!("  Epochs written: {}", summary.epochs_written);
    if summary.epochs_created > 0 {
        info!("  Epochs created: {}", summary.epochs_created);
    }
    info!("  {}", summary.stats);
    if summary.diagnostics > 0 {
        info!("  Diagnostics: {}", summary.diagnostics);
    }
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert {
            input,
            output,
            protocol,
            config,
            key_scheme,
        } => convert::run(input, output, protocol, config, key_scheme.map(EpochKeyScheme::from)),
        Commands::Update {
            input,
            output,
            attrs,
            responses,
            stimuli,
            config,
            key_scheme,
        } => update::run(
            input,
            output,
            UpdateFlags {
                attrs,
                responses,
                stimuli,
            },
            config,
            key_scheme.map(EpochKeyScheme::from),
        ),
        Commands::Rstarr {
            input,
            output,
            config,
            key_scheme,
        } => rstarr::run(input, output, config, key_scheme.map(EpochKeyScheme::from)),
        Commands::Info { file } => info::run(file),
        Commands::Validate { file } => validate::run(file),
    }
}
