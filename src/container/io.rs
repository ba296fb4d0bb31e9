use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::debug;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::error::ContainerError;
use super::group::Group;
use super::layout::{self, GroupNode};
use super::manifest::Manifest;
use super::stats::ContainerStats;
use super::{MANIFEST_ENTRY, MIMETYPE, MIMETYPE_ENTRY, TREE_ENTRY};

/// How an output container is acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Start from an empty tree; any existing file is replaced on close
    Overwrite,
    /// Load the existing file if there is one, otherwise start empty
    Append,
    /// Load the existing file; fail if it does not exist
    ReadWrite,
}

/// An output container held in memory for the duration of one operation
///
/// The whole group tree is loaded on [`open`](Self::open) and written back by
/// [`close`](Self::close), which takes the container by value so it can only
/// happen once. Dropping a container without closing it discards the changes.
#[derive(Debug)]
pub struct OutputContainer {
    path: PathBuf,
    mode: OpenMode,
    manifest: Manifest,
    root: Group,
}

impl OutputContainer {
    /// Acquire the container at `path`
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self, ContainerError> {
        let path = path.as_ref().to_path_buf();

        if path.to_string_lossy().is_empty() {
            return Err(ContainerError::InvalidFormat("Empty path".to_string()));
        }

        let (manifest, root) = match mode {
            OpenMode::Overwrite => (Manifest::new(), Group::new()),
            OpenMode::Append if !path.exists() => (Manifest::new(), Group::new()),
            OpenMode::Append | OpenMode::ReadWrite => {
                if !path.is_file() {
                    return Err(ContainerError::NotFound(path.display().to_string()));
                }
                let (mut manifest, root) = read_container(&path)?;
                manifest.begin_run();
                (manifest, root)
            }
        };

        debug!("opened {} ({:?})", path.display(), mode);

        Ok(Self {
            path,
            mode,
            manifest,
            root,
        })
    }

    /// Load a container for inspection
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        Self::open(path, OpenMode::ReadWrite)
    }

    /// Location of the container file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode the container was opened with
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Container provenance
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Mutable container provenance
    pub fn manifest_mut(&mut self) -> &mut Manifest {
        &mut self.manifest
    }

    /// Root of the group tree
    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Mutable root of the group tree
    pub fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    /// Write the container to disk and release it
    ///
    /// The archive is assembled in a temporary file next to the target and
    /// renamed over it, so readers never observe a half-written container.
    pub fn close(mut self) -> Result<ContainerStats, ContainerError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !parent.exists() {
            fs::create_dir_all(&parent)?;
        }

        self.manifest.group_count = self.root.group_count();
        self.manifest.dataset_count = self.root.dataset_count();
        self.manifest.touch();

        let mut temp = NamedTempFile::new_in(&parent)?;
        write_container(temp.as_file_mut(), &self.manifest, &self.root)?;
        temp.persist(&self.path)
            .map_err(|e| ContainerError::IoError(e.error))?;

        let stats = ContainerStats {
            groups: self.manifest.group_count,
            datasets: self.manifest.dataset_count,
            samples: self.root.sample_count(),
            total_size_bytes: fs::metadata(&self.path)?.len(),
        };
        debug!("closed {}: {}", self.path.display(), stats);
        Ok(stats)
    }
}

fn write_container(file: &mut File, manifest: &Manifest, root: &Group) -> Result<(), ContainerError> {
    let mut entries = Vec::new();
    let tree = layout::describe(root, &layout::root_prefix(), &mut entries)?;

    let mut zip_writer = ZipWriter::new(BufWriter::new(file));

    // Write mimetype as first entry (MUST be uncompressed and first)
    let stored = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .unix_permissions(0o644);
    let deflated = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    zip_writer.start_file(MIMETYPE_ENTRY, stored)?;
    zip_writer.write_all(MIMETYPE.as_bytes())?;

    zip_writer.start_file(MANIFEST_ENTRY, deflated)?;
    zip_writer.write_all(serde_json::to_string_pretty(manifest)?.as_bytes())?;

    zip_writer.start_file(TREE_ENTRY, deflated)?;
    zip_writer.write_all(serde_json::to_string_pretty(&tree)?.as_bytes())?;

    // Parquet compresses internally; Stored keeps the entries seekable
    for (entry, dataset) in entries {
        let bytes = layout::encode_dataset(dataset)?;
        zip_writer.start_file(entry, stored)?;
        zip_writer.write_all(&bytes)?;
    }

    let mut buf_writer = zip_writer.finish()?;
    buf_writer.flush()?;
    Ok(())
}

fn read_container(path: &Path) -> Result<(Manifest, Group), ContainerError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    {
        let mut first = archive.by_index(0)?;
        if first.name() != MIMETYPE_ENTRY {
            return Err(ContainerError::InvalidFormat(format!(
                "first entry is {}, expected {}",
                first.name(),
                MIMETYPE_ENTRY
            )));
        }
        let mut mimetype = String::new();
        first.read_to_string(&mut mimetype)?;
        if mimetype.trim() != MIMETYPE {
            return Err(ContainerError::InvalidFormat(format!(
                "unexpected mimetype {:?}",
                mimetype
            )));
        }
    }

    let manifest: Manifest = serde_json::from_slice(&read_entry(&mut archive, MANIFEST_ENTRY)?)?;
    let tree: GroupNode = serde_json::from_slice(&read_entry(&mut archive, TREE_ENTRY)?)?;

    let root = layout::rebuild(tree, &mut |entry: &str| {
        let bytes = read_entry(&mut archive, entry)?;
        layout::decode_dataset(Bytes::from(bytes))
    })?;

    Ok((manifest, root))
}

fn read_entry<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, ContainerError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|_| ContainerError::InvalidFormat(format!("container missing {}", name)))?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}
