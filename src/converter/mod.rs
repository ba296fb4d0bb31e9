//! # Conversion
//!
//! Walks a loaded recording and writes one output group per epoch under
//! `experiment/`, in one of four modes:
//!
//! | Mode | Container | Effect |
//! |------|-----------|--------|
//! | [`ConversionSession::to_container`] | overwrite | rebuild every epoch |
//! | [`ConversionSession::map_protocol`] | append | rebuild epochs of one protocol |
//! | [`ConversionSession::update`] | read-write | refresh selected parts of each epoch |
//! | [`ConversionSession::update_rstarr`] | read-write | recompute light intensities only |
//!
//! Each epoch group receives its metadata as attributes, one dataset per response
//! (plus `Spikes` for spike traces) and a `stimuli` subgroup with one group per
//! stimulus.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dissonance::converter::{ConversionConfig, ConversionSession};
//!
//! let config = ConversionConfig::default();
//! let mut session = ConversionSession::open("WT/2020-01-26A.json", &config)?;
//! let summary = session.to_container("WT/2020-01-26A.dsn")?;
//! println!("{} epochs written", summary.epochs_written);
//! # Ok::<(), dissonance::converter::ConversionError>(())
//! ```

mod diagnostics;
mod epoch;
mod error;
mod modes;
mod session;


pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use epoch::{format_datetime, EpochConverter, LightIntensity};
pub use error::ConversionError;
pub use modes::{RunSummary, UpdateFlags};
pub use session::{genotype_from_path, recording_date_from_path, ConversionSession};

use serde::Deserialize;

use crate::rstarr::CalibrationTable;
use crate::source::Epoch;
use crate::spikes::ThresholdDetector;

/// Top-level group holding one subgroup per epoch
pub const EXPERIMENT_GROUP: &str = "experiment";

/// Subgroup of an epoch holding one group per stimulus
pub const STIMULI_GROUP: &str = "stimuli";

/// Dataset holding detected spike times
pub const SPIKES_DATASET: &str = "Spikes";

/// Attribute of the spikes dataset listing refractory violations
pub const VIOLATION_ATTR: &str = "violation_idx";

/// Attribute recording the source location of an epoch or response
pub const PATH_ATTR: &str = "path";

/// Amplifier channel that carries spikes
pub const SPIKE_CHANNEL: &str = "Amp1";

/// Trace type that triggers spike detection
pub const SPIKE_TRACETYPE: &str = "spiketrace";

/// Light attributes written by the Rstarr conversion
pub const LIGHT_ATTRS: [&str; 4] = [
    "lightamplitudeSU",
    "lightmeanSU",
    "lightamplitude",
    "lightmean",
];

/// How epoch groups under `experiment/` are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpochKeyScheme {
    /// `epoch{start}` with the start time in fractional unix seconds
    #[default]
    Timestamp,
    /// `epoch{n}` with the position of the epoch in traversal order
    Index,
}

impl EpochKeyScheme {
    /// Group name for the epoch at position `index` of the traversal
    pub fn key(&self, epoch: &Epoch, index: usize) -> String {
        match self {
            Self::Timestamp => format!("epoch{}", epoch.start_timestamp()),
            Self::Index => format!("epoch{}", index),
        }
    }
}

/// Settings shared by every conversion mode
#[derive(Debug, Clone, Default)]
pub struct ConversionConfig {
    /// Epoch group naming
    pub key_scheme: EpochKeyScheme,

    /// Built-in spike detector settings
    pub detector: ThresholdDetector,

    /// LED calibrations for the Rstarr conversion
    pub calibration: CalibrationTable,
}

impl ConversionConfig {
    /// Replace the epoch key scheme
    pub fn with_key_scheme(mut self, key_scheme: EpochKeyScheme) -> Self {
        self.key_scheme = key_scheme;
        self
    }

    /// Replace the detector settings
    pub fn with_detector(mut self, detector: ThresholdDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Replace the calibration table
    pub fn with_calibration(mut self, calibration: CalibrationTable) -> Self {
        self.calibration = calibration;
        self
    }
}
