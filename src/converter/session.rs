use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{info, Level};
use regex::Regex;

use super::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use super::epoch::EpochConverter;
use super::{ConversionConfig, ConversionError, EpochKeyScheme};
use crate::mapping::MapperCache;
use crate::rstarr::{CalibrationConverter, RstarrConverter};
use crate::source::{Cell, Epoch, Experiment, Protocol};
use crate::spikes::SpikeDetector;

const RECORDING_DATE_PATTERN: &str = r"^(\d\d\d\d)-(\d\d)-(\d\d).*$";

/// Recording date encoded at the start of a source file name
pub fn recording_date_from_path(path: &Path) -> Result<NaiveDate, ConversionError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let invalid = || ConversionError::InvalidFilename(path.display().to_string());

    let pattern = Regex::new(RECORDING_DATE_PATTERN)?;
    let captures = pattern.captures(&name).ok_or_else(invalid)?;

    let field = |i: usize| -> Result<u32, ConversionError> {
        captures
            .get(i)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(invalid)
    };
    let year = i32::try_from(field(1)?).map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, field(2)?, field(3)?).ok_or_else(invalid)
}

/// Genotype label: the name of the directory holding the source file
pub fn genotype_from_path(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// One conversion run bound to a single source recording
///
/// The recording is loaded once and held read-only; each mode opens the output
/// container itself and closes it before returning.
pub struct ConversionSession {
    source_path: PathBuf,
    recording_date: NaiveDate,
    genotype: String,
    experiment: Experiment,
    pub(crate) key_scheme: EpochKeyScheme,
    detector: Box<dyn SpikeDetector>,
    rstarr: Box<dyn RstarrConverter>,
    mappers: MapperCache,
    diagnostics: Diagnostics,
}

impl ConversionSession {
    /// Load a source recording
    ///
    /// The file name must start with the recording date (`YYYY-MM-DD`); the
    /// parent directory names the genotype.
    pub fn open<P: AsRef<Path>>(path: P, config: &ConversionConfig) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        recording_date_from_path(path)?;
        let experiment = Experiment::from_json_file(path)?;
        info!(
            "Loaded {} ({} cells, {} epochs)",
            path.display(),
            experiment.cells.len(),
            experiment.epoch_count()
        );
        Self::from_experiment(path, experiment, config)
    }

    /// Build a session around an already loaded recording
    pub fn from_experiment<P: AsRef<Path>>(
        path: P,
        experiment: Experiment,
        config: &ConversionConfig,
    ) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        let recording_date = recording_date_from_path(path)?;
        let genotype = genotype_from_path(path);

        if config.calibration.is_empty() {
            info!("No LED calibrations configured; R* values will be 0.0");
        }

        Ok(Self {
            source_path: path.to_path_buf(),
            recording_date,
            genotype,
            experiment,
            key_scheme: config.key_scheme,
            detector: Box::new(config.detector.clone()),
            rstarr: Box::new(CalibrationConverter::new(recording_date, &config.calibration)),
            mappers: MapperCache::new(),
            diagnostics: Diagnostics::new(),
        })
    }

    /// Use a different spike detector
    pub fn with_detector(mut self, detector: impl SpikeDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    /// Use a different Rstarr converter
    pub fn with_rstarr(mut self, rstarr: impl RstarrConverter + 'static) -> Self {
        self.rstarr = Box::new(rstarr);
        self
    }

    /// Source file path
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Recording date parsed from the file name
    pub fn recording_date(&self) -> NaiveDate {
        self.recording_date
    }

    /// Genotype label
    pub fn genotype(&self) -> &str {
        &self.genotype
    }

    /// Epoch group naming in use
    pub fn key_scheme(&self) -> EpochKeyScheme {
        self.key_scheme
    }

    /// The loaded recording
    pub fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    /// Every `(cell, protocol, epoch)` in traversal order
    pub fn reader(&self) -> impl Iterator<Item = (&Cell, &Protocol, &Epoch)> + '_ {
        self.experiment.epochs()
    }

    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.records()
    }

    /// Remove and return recorded diagnostics
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    /// Split into the recording and the mutable conversion state
    pub(crate) fn parts(&mut self) -> (&Experiment, EpochConverter<'_>) {
        let converter = EpochConverter {
            source: &self.source_path,
            genotype: &self.genotype,
            detector: self.detector.as_ref(),
            rstarr: self.rstarr.as_mut(),
            mappers: &mut self.mappers,
            diagnostics: &mut self.diagnostics,
        };
        (&self.experiment, converter)
    }

    /// Move accumulated Rstarr errors into the diagnostics
    pub(crate) fn surface_rstarr_errors(&mut self) {
        for message in self.rstarr.take_errors() {
            self.diagnostics.record(Diagnostic::for_run(
                Level::Warn,
                DiagnosticKind::RstarrConversion,
                message,
            ));
        }
    }
}

impl std::fmt::Debug for ConversionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionSession")
            .field("source_path", &self.source_path)
            .field("recording_date", &self.recording_date)
            .field("genotype", &self.genotype)
            .field("key_scheme", &self.key_scheme)
            .field("epochs", &self.experiment.epoch_count())
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}
