//! # Source Recording Model
//!
//! Read-only view of a Symphony recording: an [`Experiment`] holds [`Cell`]s, each
//! cell holds [`Protocol`]s, each protocol holds [`Epoch`]s, and each epoch holds
//! its [`Response`] traces and [`Stimulus`] metadata.
//!
//! The recording itself is produced by acquisition software; this crate reads a
//! JSON export of the hierarchy (see [`Experiment::from_json_file`]). Other
//! readers can build the same types directly.
//!
//! ## Traversal
//!
//! [`Experiment::epochs`] walks the hierarchy depth-first in recording order and
//! yields flat `(cell, protocol, epoch)` triples:
//!
//! ```rust
//! use dissonance::source::Experiment;
//!
//! let experiment = Experiment::from_json_str(r#"{"cells": []}"#)?;
//! assert_eq!(experiment.epochs().count(), 0);
//! # Ok::<(), dissonance::source::SourceError>(())
//! ```

mod error;
mod model;

#[cfg(test)]
mod tests;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub use error::SourceError;
pub use model::{Cell, Epoch, Experiment, Protocol, Response, Stimulus};

impl Experiment {
    /// Load a recording from a JSON export
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let file = File::open(path.as_ref())?;
        let experiment: Experiment = serde_json::from_reader(BufReader::new(file))?;
        experiment.validate()?;
        Ok(experiment)
    }

    /// Parse a recording from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        let experiment: Experiment = serde_json::from_str(json)?;
        experiment.validate()?;
        Ok(experiment)
    }

    /// Check structural invariants that the deserializer cannot express
    pub fn validate(&self) -> Result<(), SourceError> {
        for (_, _, epoch) in self.epochs() {
            if epoch.startdate > epoch.enddate {
                return Err(SourceError::InvalidEpochInterval {
                    path: epoch.path.clone(),
                    start: epoch.startdate.to_rfc3339(),
                    end: epoch.enddate.to_rfc3339(),
                });
            }
        }
        Ok(())
    }

    /// Depth-first `(cell, protocol, epoch)` traversal in recording order
    pub fn epochs(&self) -> impl Iterator<Item = (&Cell, &Protocol, &Epoch)> + '_ {
        self.cells.iter().flat_map(|cell| {
            cell.protocols.iter().flat_map(move |protocol| {
                protocol
                    .epochs
                    .iter()
                    .map(move |epoch| (cell, protocol, epoch))
            })
        })
    }

    /// Total number of epochs in the recording
    pub fn epoch_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|cell| cell.protocols.iter())
            .map(|protocol| protocol.epochs.len())
            .sum()
    }
}
