//! On-disk representation of the group tree and its datasets.

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;
use serde::{Deserialize, Serialize};

use super::error::ContainerError;
use super::group::{Attributes, Dataset, Group};
use super::{DATA_PREFIX, KEY_ATTRIBUTES, VALUE_COLUMN};

/// ZSTD level for dataset pages
const DATASET_ZSTD_LEVEL: i32 = 3;

/// tree.json entry for a group
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct GroupNode {
    #[serde(default)]
    pub attrs: Attributes,
    #[serde(default)]
    pub groups: BTreeMap<String, GroupNode>,
    #[serde(default)]
    pub datasets: BTreeMap<String, DatasetNode>,
}

/// tree.json entry for a dataset; samples live in the Parquet entry
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DatasetNode {
    pub entry: String,
    pub len: usize,
    #[serde(default)]
    pub attrs: Attributes,
}

/// Flatten a group into its tree node plus `(entry name, dataset)` pairs
///
/// Fails on non-finite attribute values, which JSON cannot represent.
pub(crate) fn describe<'a>(
    group: &'a Group,
    prefix: &str,
    entries: &mut Vec<(String, &'a Dataset)>,
) -> Result<GroupNode, ContainerError> {
    check_finite(group.attrs(), prefix)?;
    let mut node = GroupNode {
        attrs: group.attrs().clone(),
        ..Default::default()
    };

    for (name, dataset) in group.datasets() {
        let entry = format!("{}{}.parquet", prefix, name);
        check_finite(dataset.attrs(), &entry)?;
        node.datasets.insert(
            name.to_string(),
            DatasetNode {
                entry: entry.clone(),
                len: dataset.len(),
                attrs: dataset.attrs().clone(),
            },
        );
        entries.push((entry, dataset));
    }

    for (name, child) in group.groups() {
        let child_prefix = format!("{}{}/", prefix, name);
        node.groups
            .insert(name.to_string(), describe(child, &child_prefix, entries)?);
    }

    Ok(node)
}

fn check_finite(attrs: &Attributes, location: &str) -> Result<(), ContainerError> {
    match attrs.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(ContainerError::InvalidValue(format!(
            "attribute {} of {} is {}",
            name, location, value
        ))),
        None => Ok(()),
    }
}

/// Prefix for dataset entries of the root group
pub(crate) fn root_prefix() -> String {
    format!("{}/", DATA_PREFIX)
}

/// Rebuild a group from its tree node, pulling samples through `load`
pub(crate) fn rebuild<F>(node: GroupNode, load: &mut F) -> Result<Group, ContainerError>
where
    F: FnMut(&str) -> Result<Vec<f64>, ContainerError>,
{
    let mut group = Group::new();
    group.update_attrs(node.attrs);

    for (name, dataset) in node.datasets {
        let values = load(&dataset.entry)?;
        if values.len() != dataset.len {
            return Err(ContainerError::InvalidFormat(format!(
                "dataset {} has {} samples, tree declares {}",
                dataset.entry,
                values.len(),
                dataset.len
            )));
        }
        group.insert_dataset(&name, Dataset::with_attrs(values, dataset.attrs))?;
    }

    for (name, child) in node.groups {
        let child = rebuild(child, load)?;
        group.insert_group(&name, child)?;
    }

    Ok(group)
}

fn dataset_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![Field::new(
        VALUE_COLUMN,
        DataType::Float64,
        false,
    )]))
}

/// Encode one dataset as a single-column Parquet file
pub(crate) fn encode_dataset(dataset: &Dataset) -> Result<Vec<u8>, ContainerError> {
    let schema = dataset_schema();
    let column: ArrayRef = Arc::new(Float64Array::from(dataset.values().to_vec()));
    let batch = RecordBatch::try_new(schema.clone(), vec![column])?;

    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::try_new(DATASET_ZSTD_LEVEL)?))
        .set_key_value_metadata(Some(vec![KeyValue {
            key: KEY_ATTRIBUTES.to_string(),
            value: Some(serde_json::to_string(dataset.attrs())?),
        }]))
        .build();

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(buffer)
}

/// Decode the samples of a dataset Parquet file
pub(crate) fn decode_dataset(bytes: Bytes) -> Result<Vec<f64>, ContainerError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)?.build()?;

    let mut values = Vec::new();
    for batch in reader {
        let batch = batch?;
        let column = batch.column_by_name(VALUE_COLUMN).ok_or_else(|| {
            ContainerError::InvalidFormat(format!("dataset is missing column {}", VALUE_COLUMN))
        })?;
        let array = column
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| {
                ContainerError::InvalidFormat(format!(
                    "column {} is {}, expected Float64",
                    VALUE_COLUMN,
                    column.data_type()
                ))
            })?;
        values.extend_from_slice(array.values());
    }
    Ok(values)
}
