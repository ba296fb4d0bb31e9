//! Manifest for the output container.
//!
//! The manifest.json file records who wrote the container, when, and from which
//! recordings, so a reader can identify a container without walking its tree.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FORMAT_VERSION;

/// Container-level provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Container format version (e.g., "1.0")
    pub format_version: String,
    /// Name and version of the converter that last wrote the file
    pub converter: String,
    /// ISO 8601 timestamp of when the file was first created
    pub created: String,
    /// ISO 8601 timestamp of the last write
    pub modified: String,
    /// Identifier of the last operation that wrote the file
    pub run_id: Uuid,
    /// Recordings that contributed epochs, in first-seen order
    #[serde(default)]
    pub source_files: Vec<String>,
    /// Number of groups below the root
    #[serde(default)]
    pub group_count: usize,
    /// Number of datasets in the container
    #[serde(default)]
    pub dataset_count: usize,
}

impl Manifest {
    /// Manifest for a brand-new container
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            format_version: FORMAT_VERSION.to_string(),
            converter: converter_info(),
            created: now.clone(),
            modified: now,
            run_id: Uuid::new_v4(),
            source_files: Vec::new(),
            group_count: 0,
            dataset_count: 0,
        }
    }

    /// Record a contributing recording (ignored if already listed)
    pub fn add_source_file(&mut self, source: impl Into<String>) {
        let source = source.into();
        if !self.source_files.contains(&source) {
            self.source_files.push(source);
        }
    }

    /// Start a new write on an existing manifest
    pub(crate) fn begin_run(&mut self) {
        self.converter = converter_info();
        self.run_id = Uuid::new_v4();
    }

    pub(crate) fn touch(&mut self) {
        self.modified = chrono::Utc::now().to_rfc3339();
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

fn converter_info() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
