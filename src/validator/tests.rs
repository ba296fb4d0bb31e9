use std::path::Path;

use tempfile::tempdir;

use super::*;
use crate::container::{Group, OpenMode, OutputContainer};
use crate::converter::{LIGHT_ATTRS, SPIKES_DATASET, VIOLATION_ATTR};

fn write_epoch(epoch: &mut Group) {
    for attr in [
        "path",
        "cellname",
        "celltype",
        "genotype",
        "tracetype",
        "protocolname",
        "startdate",
        "enddate",
    ] {
        epoch.set_attr(attr, "x");
    }
    epoch.set_attr("tracetype", "spiketrace");
    for attr in LIGHT_ATTRS {
        epoch.set_attr(attr, 0.0);
    }
    epoch
        .create_dataset("Amp1", vec![0.0; 10])
        .unwrap()
        .set_attr("path", "/c1/p1/e1/Amp1");
    epoch.create_group("stimuli").unwrap();
}

fn write_container(path: &Path, edit: impl FnOnce(&mut Group)) {
    let mut container = OutputContainer::open(path, OpenMode::Overwrite).unwrap();
    let epoch = container
        .root_mut()
        .require_group("experiment")
        .unwrap()
        .create_group("epoch1580032800")
        .unwrap();
    write_epoch(epoch);
    edit(epoch);
    container.close().unwrap();
}

fn failed_names(report: &ValidationReport) -> Vec<&str> {
    report
        .checks
        .iter()
        .filter(|c| matches!(c.status, CheckStatus::Failed(_)))
        .map(|c| c.name.as_str())
        .collect()
}

#[test]
fn test_valid_container_passes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ok.dsn");
    write_container(&path, |epoch| {
        epoch
            .create_dataset(SPIKES_DATASET, vec![2.0, 7.0])
            .unwrap()
            .set_attr(VIOLATION_ATTR, vec![1_i64]);
    });

    let report = validate_container(&path).unwrap();
    assert!(!report.has_failures(), "{}", report);
    assert!(!report.has_warnings(), "{}", report);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.dsn");

    assert!(validate_container(&path).is_err());

    let report = validate_container_report(&path);
    assert_eq!(failed_names(&report), vec!["File exists"]);
}

#[test]
fn test_foreign_zip_stops_at_mimetype() {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let dir = tempdir().unwrap();
    let path = dir.path().join("foreign.dsn");
    let mut writer = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    writer.start_file("content.xml", SimpleFileOptions::default()).unwrap();
    writer.write_all(b"<x/>").unwrap();
    writer.finish().unwrap();

    let report = validate_container_report(&path);
    assert_eq!(failed_names(&report), vec!["mimetype is first entry"]);
}

#[test]
fn test_missing_attributes_fail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("attrs.dsn");
    write_container(&path, |epoch| {
        epoch.remove_attr("lightmean");
        epoch.remove_attr("genotype");
    });

    let report = validate_container(&path).unwrap();
    let check = report
        .checks
        .iter()
        .find(|c| c.name == "Required epoch attributes")
        .unwrap();
    match &check.status {
        CheckStatus::Failed(msg) => assert!(msg.contains("and 1 more"), "{}", msg),
        other => panic!("unexpected status {:?}", other),
    }
}

#[test]
fn test_spikes_outside_trace_fail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spikes.dsn");
    write_container(&path, |epoch| {
        epoch.create_dataset(SPIKES_DATASET, vec![3.0, 12.0]).unwrap();
    });

    let report = validate_container(&path).unwrap();
    assert_eq!(failed_names(&report), vec!["Spike datasets (1)"]);
}

#[test]
fn test_violation_index_outside_spikes_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("violations.dsn");
    write_container(&path, |epoch| {
        epoch
            .create_dataset(SPIKES_DATASET, vec![3.0])
            .unwrap()
            .set_attr(VIOLATION_ATTR, vec![4_i64]);
    });

    let report = validate_container(&path).unwrap();
    assert!(report.has_failures());
}

#[test]
fn test_spikes_outside_spike_trace_fail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exc.dsn");
    write_container(&path, |epoch| {
        epoch.set_attr("tracetype", "exc");
        epoch.create_dataset(SPIKES_DATASET, vec![3.0]).unwrap();
    });

    let report = validate_container(&path).unwrap();
    assert_eq!(failed_names(&report), vec!["Spike datasets (1)"]);
}

#[test]
fn test_unexpected_epoch_names_fail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("names.dsn");
    let mut container = OutputContainer::open(&path, OpenMode::Overwrite).unwrap();
    let experiment = container.root_mut().require_group("experiment").unwrap();
    write_epoch(experiment.create_group("trial-7").unwrap());
    container.close().unwrap();

    let report = validate_container(&path).unwrap();
    assert_eq!(failed_names(&report), vec!["Epoch group names"]);
}

#[test]
fn test_report_display() {
    let mut report = ValidationReport::new("test.dsn");
    report.add_check(ValidationCheck::ok(Stage::Structure, "Check 1"));
    report.add_check(ValidationCheck::warning(Stage::Hierarchy, "Check 2", "a warning"));
    report.add_check(ValidationCheck::failed(Stage::Data, "Check 3", "a failure"));

    let output = report.to_string();
    assert!(output.contains("✓"));
    assert!(output.contains("⚠"));
    assert!(output.contains("✗"));
    assert!(output.contains("Hierarchy"));
    assert!(output.contains("1 passed, 1 warnings, 1 failed"));
    assert!(output.contains("Validation FAILED"));
}
