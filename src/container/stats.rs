use std::fmt;

/// Statistics from a closed output container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// Groups below the root
    pub groups: usize,

    /// Datasets in the container
    pub datasets: usize,

    /// Samples across all datasets
    pub samples: usize,

    /// Size of the container file in bytes
    pub total_size_bytes: u64,
}

impl fmt::Display for ContainerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Container: {} groups, {} datasets, {} samples, {} bytes",
            self.groups, self.datasets, self.samples, self.total_size_bytes
        )
    }
}
