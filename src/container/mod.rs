//! # Output Container
//!
//! The converter writes one container per recording: a tree of groups that carry
//! attributes and float datasets, in the spirit of HDF5 but stored as a ZIP
//! archive of JSON and Parquet so any Arrow-capable tool can read the traces.
//!
//! ## Container Format
//!
//! ```text
//! {name}.dsn (ZIP archive)
//! ├── mimetype          # "application/vnd.dissonance" (uncompressed, first entry)
//! ├── manifest.json     # Provenance: converter, timestamps, run id, source files
//! ├── tree.json         # Groups, attributes, dataset attributes and lengths
//! └── data/             # One Parquet file per dataset, mirroring the group tree
//!     └── experiment/epoch1580033600.5/Amp1.parquet
//! ```
//!
//! Parquet entries are stored uncompressed within the ZIP archive; each Parquet
//! file is ZSTD-compressed internally and repeats its dataset attributes as JSON
//! under the footer key `dissonance:attributes`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dissonance::container::{OpenMode, OutputContainer};
//!
//! let mut container = OutputContainer::open("2020-01-26A.dsn", OpenMode::Overwrite)?;
//! let epoch = container.root_mut().require_group("experiment")?.create_group("epoch0")?;
//! epoch.set_attr("protocolname", "LedPulse");
//! epoch.create_dataset("Amp1", vec![0.0, 1.0, 2.0])?.set_attr("path", "/c1/p1/e1/Amp1");
//!
//! let stats = container.close()?;
//! println!("{}", stats);
//! # Ok::<(), dissonance::container::ContainerError>(())
//! ```

mod error;
mod group;
mod io;
mod layout;
pub mod manifest;
mod stats;

#[cfg(test)]
mod tests;

pub use error::ContainerError;
pub use group::{Attributes, Dataset, Group};
pub use io::{OpenMode, OutputContainer};
pub use manifest::Manifest;
pub use stats::ContainerStats;

/// Container format version
pub const FORMAT_VERSION: &str = "1.0";

/// MIME type stored in the `mimetype` entry
pub const MIMETYPE: &str = "application/vnd.dissonance";

/// Default file extension for output containers
pub const EXTENSION: &str = "dsn";

/// Name of the mimetype entry
pub const MIMETYPE_ENTRY: &str = "mimetype";

/// Name of the manifest entry
pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Name of the group tree entry
pub const TREE_ENTRY: &str = "tree.json";

/// Directory holding dataset Parquet files
pub const DATA_PREFIX: &str = "data";

/// Column holding dataset samples
pub const VALUE_COLUMN: &str = "value";

/// Parquet footer key holding dataset attributes
pub const KEY_ATTRIBUTES: &str = "dissonance:attributes";
