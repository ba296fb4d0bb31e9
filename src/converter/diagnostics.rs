use std::fmt;

use log::Level;

/// What a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// No light amplitude parameter; 0.0 was written
    MissingLightAmplitude,
    /// No light mean parameter; 0.0 was written
    MissingLightMean,
    /// No `Amp1` background value; 0.0 was written
    MissingBackground,
    /// The Rstarr converter could not calibrate a value
    RstarrConversion,
}

/// One structured warning or note produced during a run
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity, also used when the record is logged
    pub level: Level,
    /// Category
    pub kind: DiagnosticKind,
    /// Start date of the epoch concerned, if any
    pub epoch: Option<String>,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// Diagnostic tied to one epoch
    pub fn for_epoch(
        level: Level,
        kind: DiagnosticKind,
        epoch: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            kind,
            epoch: Some(epoch.into()),
            message: message.into(),
        }
    }

    /// Diagnostic for the run as a whole
    pub fn for_run(level: Level, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            level,
            kind,
            epoch: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.epoch {
            Some(epoch) => write!(f, "{}: {}", epoch, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Ordered sink of diagnostics; every record is also sent to the logger
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and keep a record
    pub fn record(&mut self, diagnostic: Diagnostic) {
        log::log!(diagnostic.level, "{}", diagnostic);
        self.records.push(diagnostic);
    }

    /// Records in the order they were produced
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Records of one kind
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(move |d| d.kind == kind)
    }

    /// Remove and return all records
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.records)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
