use std::collections::BTreeMap;

use crate::value::Value;

use super::error::ContainerError;

/// Attribute map of a group or dataset
pub type Attributes = BTreeMap<String, Value>;

/// A named float array with attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    values: Vec<f64>,
    attrs: Attributes,
}

impl Dataset {
    /// Create a dataset without attributes
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            attrs: Attributes::new(),
        }
    }

    /// Samples
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the dataset holds no samples
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All attributes
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// One attribute
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub(crate) fn with_attrs(values: Vec<f64>, attrs: Attributes) -> Self {
        Self { values, attrs }
    }
}

/// A node of the output hierarchy: attributes, child groups and datasets
///
/// Child names are unique across groups and datasets, as in HDF5.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    attrs: Attributes,
    groups: BTreeMap<String, Group>,
    datasets: BTreeMap<String, Dataset>,
}

fn check_name(name: &str) -> Result<(), ContainerError> {
    if name.is_empty() || name.contains('/') {
        return Err(ContainerError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl Group {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    // ---- attributes ----

    /// All attributes
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// One attribute
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Write many attributes at once; later entries win on key collisions
    pub fn update_attrs<I>(&mut self, attrs: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.attrs.extend(attrs);
    }

    /// Delete an attribute, returning it if it was present
    pub fn remove_attr(&mut self, name: &str) -> Option<Value> {
        self.attrs.remove(name)
    }

    // ---- children ----

    /// Whether a child group or dataset named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name) || self.datasets.contains_key(name)
    }

    /// Child group by name
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Mutable child group by name
    pub fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.get_mut(name)
    }

    /// Child groups in name order
    pub fn groups(&self) -> impl Iterator<Item = (&str, &Group)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Create a new child group; fails if the name is taken
    pub fn create_group(&mut self, name: &str) -> Result<&mut Group, ContainerError> {
        check_name(name)?;
        if self.contains(name) {
            return Err(ContainerError::AlreadyExists(name.to_string()));
        }
        Ok(self.groups.entry(name.to_string()).or_default())
    }

    /// Existing child group, or a new one if missing
    pub fn require_group(&mut self, name: &str) -> Result<&mut Group, ContainerError> {
        check_name(name)?;
        if self.datasets.contains_key(name) {
            return Err(ContainerError::AlreadyExists(name.to_string()));
        }
        Ok(self.groups.entry(name.to_string()).or_default())
    }

    /// Drop any child named `name`, then create an empty group in its place
    pub fn replace_group(&mut self, name: &str) -> Result<&mut Group, ContainerError> {
        self.remove(name);
        self.create_group(name)
    }

    /// Child dataset by name
    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.get(name)
    }

    /// Mutable child dataset by name
    pub fn dataset_mut(&mut self, name: &str) -> Option<&mut Dataset> {
        self.datasets.get_mut(name)
    }

    /// Child datasets in name order
    pub fn datasets(&self) -> impl Iterator<Item = (&str, &Dataset)> {
        self.datasets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Create a new dataset; fails if the name is taken
    pub fn create_dataset(
        &mut self,
        name: &str,
        values: Vec<f64>,
    ) -> Result<&mut Dataset, ContainerError> {
        self.insert_dataset(name, Dataset::new(values))
    }

    /// Create or overwrite a dataset; attributes of the old dataset are dropped
    pub fn replace_dataset(
        &mut self,
        name: &str,
        values: Vec<f64>,
    ) -> Result<&mut Dataset, ContainerError> {
        self.datasets.remove(name);
        self.create_dataset(name, values)
    }

    pub(crate) fn insert_dataset(
        &mut self,
        name: &str,
        dataset: Dataset,
    ) -> Result<&mut Dataset, ContainerError> {
        check_name(name)?;
        if self.contains(name) {
            return Err(ContainerError::AlreadyExists(name.to_string()));
        }
        Ok(self.datasets.entry(name.to_string()).or_insert(dataset))
    }

    pub(crate) fn insert_group(&mut self, name: &str, group: Group) -> Result<(), ContainerError> {
        check_name(name)?;
        if self.contains(name) {
            return Err(ContainerError::AlreadyExists(name.to_string()));
        }
        self.groups.insert(name.to_string(), group);
        Ok(())
    }

    /// Delete a child group or dataset; returns whether anything was removed
    pub fn remove(&mut self, name: &str) -> bool {
        self.groups.remove(name).is_some() || self.datasets.remove(name).is_some()
    }

    /// Number of groups below this one (not counting itself)
    pub fn group_count(&self) -> usize {
        self.groups.values().map(|g| 1 + g.group_count()).sum()
    }

    /// Number of datasets in this group and below
    pub fn dataset_count(&self) -> usize {
        self.datasets.len() + self.groups.values().map(Group::dataset_count).sum::<usize>()
    }

    /// Number of samples in all datasets in this group and below
    pub fn sample_count(&self) -> usize {
        self.datasets.values().map(Dataset::len).sum::<usize>()
            + self.groups.values().map(Group::sample_count).sum::<usize>()
    }
}
