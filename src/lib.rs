//! # dissonance - Electrophysiology Recording Converter
//!
//! `dissonance` turns a hierarchical electrophysiology recording (cells, protocols,
//! epochs, responses, stimuli) into an analysis-ready output container: one group
//! per epoch carrying normalized metadata attributes, one float dataset per
//! recorded channel, detected spike times, and per-stimulus groups.
//!
//! ## Key Features
//!
//! - **Four operating modes**: full rebuild, rebuild of one protocol, selective
//!   update of attributes/responses/stimuli, and an R*-only refresh.
//!
//! - **Protocol families**: a registry of parameter mappers adds family-specific
//!   attributes (paired pulses, chirps, expanding spots, adapting steps, sine pulses).
//!
//! - **Light calibration**: stimulus-unit light levels are converted to R*/rod/s
//!   from a dated LED calibration table.
//!
//! - **Open storage**: the container is a ZIP archive of JSON metadata and one
//!   Parquet file per dataset, readable by any Arrow-capable tool.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dissonance::converter::{ConversionConfig, ConversionSession, UpdateFlags};
//!
//! let config = ConversionConfig::default();
//! let mut session = ConversionSession::open("WT/2020-01-26A.json", &config)?;
//!
//! // Rebuild everything, then later refresh only the responses
//! session.to_container("WT/2020-01-26A.dsn")?;
//! let flags = UpdateFlags { responses: true, ..UpdateFlags::default() };
//! session.update("WT/2020-01-26A.dsn", flags)?;
//!
//! for diagnostic in session.diagnostics() {
//!     println!("{}", diagnostic);
//! }
//! # Ok::<(), dissonance::converter::ConversionError>(())
//! ```
//!
//! ## Reading Containers
//!
//! ```python
//! # Python
//! import zipfile, io, pyarrow.parquet as pq
//! z = zipfile.ZipFile("2020-01-26A.dsn")
//! trace = pq.read_table(io.BytesIO(z.read("data/experiment/epoch1580032800/Amp1.parquet")))
//! ```
//!
//! ## Architecture
//!
//! - [`source`]: the recording model and its JSON reader
//! - [`converter`]: conversion session, epoch converter and operating modes
//! - [`mapping`]: protocol-family parameter mappers
//! - [`rstarr`]: LED calibration and R* conversion
//! - [`spikes`]: spike detection contract and the built-in threshold detector
//! - [`container`]: the output container (groups, attributes, datasets)
//! - [`validator`]: integrity checks for written containers
//! - [`value`]: attribute and parameter values

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod container;
pub mod converter;
pub mod mapping;
pub mod rstarr;
pub mod source;
pub mod spikes;
pub mod validator;
pub mod value;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::container::{
        ContainerError, ContainerStats, Dataset, Group, OpenMode, OutputContainer,
    };
    pub use crate::converter::{
        ConversionConfig, ConversionError, ConversionSession, Diagnostic, DiagnosticKind,
        EpochKeyScheme, RunSummary, UpdateFlags,
    };
    pub use crate::mapping::{MapperCache, ParameterMapper};
    pub use crate::rstarr::{Calibration, CalibrationConverter, CalibrationTable, RstarrConverter};
    pub use crate::source::{Cell, Epoch, Experiment, Protocol, Response, SourceError, Stimulus};
    pub use crate::spikes::{SpikeDetection, SpikeDetector, ThresholdDetector};
    pub use crate::validator::{validate_container, ValidationReport};
    pub use crate::value::{Parameters, Value};
}
