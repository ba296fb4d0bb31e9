//! # Container Validation
//!
//! Integrity checks for `.dsn` output containers, in three passes:
//!
//! 1. **Structure**: ZIP layout, `mimetype` first and uncompressed, manifest and
//!    tree present, dataset entries stored, full load succeeds
//! 2. **Hierarchy**: manifest counts, `experiment` group, epoch group names and
//!    required attributes
//! 3. **Data**: finite samples, response paths, spike times and violation indices
//!
//! Structure failures stop validation since later passes need a loaded tree.
//!
//! ```rust,no_run
//! use dissonance::validator::validate_container;
//! use std::path::Path;
//!
//! let report = validate_container(Path::new("2020-01-26A.dsn"))?;
//! println!("{}", report);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::Path;

use anyhow::Result;

pub use report::{CheckStatus, Stage, ValidationCheck, ValidationReport};

use crate::container::ContainerError;

mod data;
mod hierarchy;
mod report;
mod structure;

/// Errors that abort validation
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The file is not a readable container
    #[error("Structure error: {0}")]
    StructureError(String),

    /// Error from the ZIP layer
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// The container could not be loaded
    #[error("Container error: {0}")]
    ContainerError(#[from] ContainerError),
}

/// Validate the container at `path`
///
/// Returns `Err` only when the structure pass cannot produce a loaded
/// container; the report of a file that loads is always returned, failed
/// checks included.
pub fn validate_container(path: &Path) -> Result<ValidationReport> {
    let mut report = ValidationReport::new(path.display().to_string());

    let container = structure::check_structure(path, &mut report)?;
    hierarchy::check_hierarchy(&container, &mut report)?;
    data::check_data(&container, &mut report)?;

    Ok(report)
}

/// Like [`validate_container`], but a structure failure still yields the
/// partial report
pub fn validate_container_report(path: &Path) -> ValidationReport {
    let mut report = ValidationReport::new(path.display().to_string());

    let container = match structure::check_structure(path, &mut report) {
        Ok(container) => container,
        Err(e) => {
            log::debug!("validation of {} stopped: {}", path.display(), e);
            return report;
        }
    };
    if let Err(e) = hierarchy::check_hierarchy(&container, &mut report) {
        report.add_check(ValidationCheck::failed(Stage::Hierarchy, "Hierarchy pass", e.to_string()));
    }
    if let Err(e) = data::check_data(&container, &mut report) {
        report.add_check(ValidationCheck::failed(Stage::Data, "Data pass", e.to_string()));
    }
    report
}

#[cfg(test)]
mod tests;
