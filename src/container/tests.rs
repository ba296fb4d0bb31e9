use super::*;
use crate::value::Value;
use std::fs::File;
use tempfile::tempdir;
use zip::ZipArchive;

fn sample_tree(container: &mut OutputContainer) {
    let experiment = container.root_mut().require_group("experiment").unwrap();
    let epoch = experiment.create_group("epoch1580033600.5").unwrap();
    epoch.set_attr("protocolname", "LedPulse");
    epoch.set_attr("pretime", 100.0);
    epoch
        .create_dataset("Amp1", vec![0.0, -1.5, 2.25])
        .unwrap()
        .set_attr("path", "/c1/p1/e1/Amp1");
    let stimuli = epoch.create_group("stimuli").unwrap();
    stimuli
        .create_group("Green_570nm")
        .unwrap()
        .set_attr("samplerate", Value::Int(10000));
}

// ==================== Group Tests ====================

#[test]
fn test_names_are_unique_across_groups_and_datasets() {
    let mut group = Group::new();
    group.create_dataset("Amp1", vec![1.0]).unwrap();

    assert!(matches!(
        group.create_group("Amp1"),
        Err(ContainerError::AlreadyExists(_))
    ));
    assert!(matches!(
        group.create_dataset("Amp1", vec![]),
        Err(ContainerError::AlreadyExists(_))
    ));
    assert!(group.require_group("Amp1").is_err());
}

#[test]
fn test_invalid_names() {
    let mut group = Group::new();
    assert!(matches!(group.create_group(""), Err(ContainerError::InvalidName(_))));
    assert!(matches!(
        group.create_dataset("a/b", vec![]),
        Err(ContainerError::InvalidName(_))
    ));
}

#[test]
fn test_replace_dataset_drops_old_attributes() {
    let mut group = Group::new();
    group
        .create_dataset("Spikes", vec![1.0, 2.0])
        .unwrap()
        .set_attr("violation_idx", vec![1_i64]);

    let replaced = group.replace_dataset("Spikes", vec![5.0]).unwrap();
    assert_eq!(replaced.values(), &[5.0]);
    assert!(replaced.attr("violation_idx").is_none());
}

#[test]
fn test_require_group_keeps_contents() {
    let mut group = Group::new();
    group.create_group("stimuli").unwrap().set_attr("x", 1_i64);

    let again = group.require_group("stimuli").unwrap();
    assert_eq!(again.attr("x"), Some(&Value::Int(1)));
}

#[test]
fn test_counts() {
    let dir = tempdir().unwrap();
    let mut container = OutputContainer::open(dir.path().join("c.dsn"), OpenMode::Overwrite).unwrap();
    sample_tree(&mut container);

    let root = container.root();
    assert_eq!(root.group_count(), 4);
    assert_eq!(root.dataset_count(), 1);
    assert_eq!(root.sample_count(), 3);
}

// ==================== Persistence Tests ====================

#[test]
fn test_close_then_reopen_preserves_tree() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("2020-01-26A.dsn");

    let mut container = OutputContainer::open(&path, OpenMode::Overwrite).unwrap();
    sample_tree(&mut container);
    let expected = container.root().clone();
    let stats = container.close().unwrap();

    assert_eq!(stats.groups, 4);
    assert_eq!(stats.datasets, 1);
    assert!(stats.total_size_bytes > 0);

    let reopened = OutputContainer::read(&path).unwrap();
    assert_eq!(reopened.root(), &expected);
    assert_eq!(reopened.manifest().group_count, 4);
}

#[test]
fn test_mimetype_is_first_and_stored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mimetype.dsn");

    let mut container = OutputContainer::open(&path, OpenMode::Overwrite).unwrap();
    sample_tree(&mut container);
    container.close().unwrap();

    let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
    let first = archive.by_index(0).unwrap();
    assert_eq!(first.name(), MIMETYPE_ENTRY);
    assert_eq!(first.compression(), zip::CompressionMethod::Stored);
    drop(first);

    let parquet = archive
        .by_name("data/experiment/epoch1580033600.5/Amp1.parquet")
        .unwrap();
    assert_eq!(parquet.compression(), zip::CompressionMethod::Stored);
}

#[test]
fn test_dataset_attributes_in_parquet_footer() {
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use std::io::Read;

    let dir = tempdir().unwrap();
    let path = dir.path().join("footer.dsn");

    let mut container = OutputContainer::open(&path, OpenMode::Overwrite).unwrap();
    sample_tree(&mut container);
    container.close().unwrap();

    let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
    let mut entry = archive
        .by_name("data/experiment/epoch1580033600.5/Amp1.parquet")
        .unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();

    let reader = SerializedFileReader::new(bytes::Bytes::from(bytes)).unwrap();
    let kv = reader.metadata().file_metadata().key_value_metadata().unwrap();
    let attrs = kv.iter().find(|kv| kv.key == KEY_ATTRIBUTES).unwrap();
    assert!(attrs.value.as_deref().unwrap().contains("/c1/p1/e1/Amp1"));
}

#[test]
fn test_read_write_requires_existing_file() {
    let dir = tempdir().unwrap();
    let result = OutputContainer::open(dir.path().join("missing.dsn"), OpenMode::ReadWrite);
    assert!(matches!(result, Err(ContainerError::NotFound(_))));
}

#[test]
fn test_append_creates_when_missing_and_loads_when_present() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("append.dsn");

    let mut first = OutputContainer::open(&path, OpenMode::Append).unwrap();
    assert!(first.root().group("experiment").is_none());
    first.root_mut().require_group("experiment").unwrap();
    first.manifest_mut().add_source_file("WT/2020-01-26A.json");
    first.close().unwrap();

    let second = OutputContainer::open(&path, OpenMode::Append).unwrap();
    assert!(second.root().group("experiment").is_some());
    assert_eq!(second.manifest().source_files, vec!["WT/2020-01-26A.json"]);
}

#[test]
fn test_overwrite_ignores_existing_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("overwrite.dsn");

    let mut container = OutputContainer::open(&path, OpenMode::Overwrite).unwrap();
    sample_tree(&mut container);
    container.close().unwrap();

    let fresh = OutputContainer::open(&path, OpenMode::Overwrite).unwrap();
    assert_eq!(fresh.root().group_count(), 0);
}

#[test]
fn test_dropping_without_close_discards_changes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("discard.dsn");

    let mut container = OutputContainer::open(&path, OpenMode::Overwrite).unwrap();
    sample_tree(&mut container);
    drop(container);

    assert!(!path.exists());
}

#[test]
fn test_non_finite_attribute_fails_close_and_keeps_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nonfinite.dsn");

    let mut container = OutputContainer::open(&path, OpenMode::Overwrite).unwrap();
    sample_tree(&mut container);
    let expected = container.root().clone();
    container.close().unwrap();

    let mut container = OutputContainer::open(&path, OpenMode::ReadWrite).unwrap();
    let epoch = container
        .root_mut()
        .group_mut("experiment")
        .and_then(|g| g.group_mut("epoch1580033600.5"))
        .unwrap();
    epoch.set_attr("lightamplitude", f64::INFINITY);
    assert!(matches!(container.close(), Err(ContainerError::InvalidValue(_))));

    let mut container = OutputContainer::open(&path, OpenMode::ReadWrite).unwrap();
    assert_eq!(container.root(), &expected);
    container
        .root_mut()
        .group_mut("experiment")
        .and_then(|g| g.group_mut("epoch1580033600.5"))
        .and_then(|g| g.dataset_mut("Amp1"))
        .unwrap()
        .set_attr("scale", vec![1.0, f64::NAN]);
    assert!(matches!(container.close(), Err(ContainerError::InvalidValue(_))));

    assert_eq!(OutputContainer::read(&path).unwrap().root(), &expected);
}

#[test]
fn test_rejects_foreign_zip() {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let dir = tempdir().unwrap();
    let path = dir.path().join("foreign.dsn");
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    writer.start_file("readme.txt", SimpleFileOptions::default()).unwrap();
    writer.write_all(b"hello").unwrap();
    writer.finish().unwrap();

    assert!(matches!(
        OutputContainer::read(&path),
        Err(ContainerError::InvalidFormat(_))
    ));
}

#[test]
fn test_empty_dataset_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.dsn");

    let mut container = OutputContainer::open(&path, OpenMode::Overwrite).unwrap();
    container.root_mut().create_dataset("nothing", Vec::new()).unwrap();
    container.close().unwrap();

    let reopened = OutputContainer::read(&path).unwrap();
    assert!(reopened.root().dataset("nothing").unwrap().is_empty());
}
