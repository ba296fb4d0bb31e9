use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::Result;
use zip::{CompressionMethod, ZipArchive};

use crate::container::{
    Manifest, OutputContainer, DATA_PREFIX, FORMAT_VERSION, MANIFEST_ENTRY, MIMETYPE,
    MIMETYPE_ENTRY, TREE_ENTRY,
};

use super::{Stage, ValidationCheck, ValidationError, ValidationReport};

const STAGE: Stage = Stage::Structure;

/// Step 1: archive layout, then a full load of the container
pub(crate) fn check_structure(path: &Path, report: &mut ValidationReport) -> Result<OutputContainer> {
    if !path.is_file() {
        report.add_check(ValidationCheck::failed(
            STAGE,
            "File exists",
            format!("No such file: {}", path.display()),
        ));
        anyhow::bail!(ValidationError::StructureError("file does not exist".to_string()));
    }
    report.add_check(ValidationCheck::ok(STAGE, "File exists"));

    let mut archive = match ZipArchive::new(BufReader::new(File::open(path)?)) {
        Ok(archive) => archive,
        Err(e) => {
            report.add_check(ValidationCheck::failed(STAGE, "ZIP archive", e.to_string()));
            anyhow::bail!(ValidationError::ZipError(e));
        }
    };
    report.add_check(ValidationCheck::ok(
        STAGE,
        format!("ZIP archive ({} entries)", archive.len()),
    ));

    check_mimetype(&mut archive, report)?;
    check_manifest(&mut archive, report);

    if archive.index_for_name(TREE_ENTRY).is_some() {
        report.add_check(ValidationCheck::ok(STAGE, "tree.json present"));
    } else {
        report.add_check(ValidationCheck::failed(STAGE, "tree.json present", "missing"));
    }

    check_data_entries(&mut archive, report)?;

    match OutputContainer::read(path) {
        Ok(container) => {
            report.add_check(ValidationCheck::ok(STAGE, "Tree and datasets load"));
            Ok(container)
        }
        Err(e) => {
            report.add_check(ValidationCheck::failed(STAGE, "Tree and datasets load", e.to_string()));
            anyhow::bail!(ValidationError::ContainerError(e));
        }
    }
}

fn check_mimetype(archive: &mut ZipArchive<BufReader<File>>, report: &mut ValidationReport) -> Result<()> {
    let mut first = match archive.by_index(0) {
        Ok(entry) => entry,
        Err(e) => {
            report.add_check(ValidationCheck::failed(STAGE, "mimetype is first entry", e.to_string()));
            anyhow::bail!(ValidationError::ZipError(e));
        }
    };

    if first.name() != MIMETYPE_ENTRY {
        report.add_check(ValidationCheck::failed(
            STAGE,
            "mimetype is first entry",
            format!("first entry is {}", first.name()),
        ));
        anyhow::bail!(ValidationError::StructureError("not a dissonance container".to_string()));
    }
    report.add_check(ValidationCheck::ok(STAGE, "mimetype is first entry"));

    if first.compression() == CompressionMethod::Stored {
        report.add_check(ValidationCheck::ok(STAGE, "mimetype uncompressed"));
    } else {
        report.add_check(ValidationCheck::warning(
            STAGE,
            "mimetype uncompressed",
            format!("compressed with {:?}", first.compression()),
        ));
    }

    let mut content = String::new();
    first.read_to_string(&mut content)?;
    if content.trim() == MIMETYPE {
        report.add_check(ValidationCheck::ok(STAGE, format!("mimetype is {}", MIMETYPE)));
        Ok(())
    } else {
        report.add_check(ValidationCheck::failed(
            STAGE,
            format!("mimetype is {}", MIMETYPE),
            format!("found {:?}", content),
        ));
        anyhow::bail!(ValidationError::StructureError("unexpected mimetype".to_string()));
    }
}

fn check_manifest(archive: &mut ZipArchive<BufReader<File>>, report: &mut ValidationReport) {
    let manifest = (|| -> Result<Manifest> {
        let mut entry = archive.by_name(MANIFEST_ENTRY)?;
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        Ok(serde_json::from_slice(&bytes)?)
    })();

    match manifest {
        Ok(manifest) => {
            report.add_check(ValidationCheck::ok(STAGE, "manifest.json parses"));
            if manifest.format_version == FORMAT_VERSION {
                report.add_check(ValidationCheck::ok(
                    STAGE,
                    format!("Format version {}", FORMAT_VERSION),
                ));
            } else {
                report.add_check(ValidationCheck::warning(
                    STAGE,
                    format!("Format version {}", FORMAT_VERSION),
                    format!("container declares {}", manifest.format_version),
                ));
            }
        }
        Err(e) => {
            report.add_check(ValidationCheck::failed(STAGE, "manifest.json parses", e.to_string()));
        }
    }
}

fn check_data_entries(archive: &mut ZipArchive<BufReader<File>>, report: &mut ValidationReport) -> Result<()> {
    let prefix = format!("{}/", DATA_PREFIX);
    let mut compressed = Vec::new();
    let mut count = 0;

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if !entry.name().starts_with(&prefix) {
            continue;
        }
        count += 1;
        if entry.compression() != CompressionMethod::Stored {
            compressed.push(entry.name().to_string());
        }
    }

    if compressed.is_empty() {
        report.add_check(ValidationCheck::ok(
            STAGE,
            format!("{} dataset entries stored uncompressed", count),
        ));
    } else {
        report.add_check(ValidationCheck::warning(
            STAGE,
            "Dataset entries stored uncompressed",
            format!("{} compressed entries, e.g. {}", compressed.len(), compressed[0]),
        ));
    }
    Ok(())
}
