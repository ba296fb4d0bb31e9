use std::fmt;
use std::path::Path;

use log::{info, warn};

use super::session::ConversionSession;
use super::{ConversionError, EXPERIMENT_GROUP, LIGHT_ATTRS};
use crate::container::{ContainerError, ContainerStats, Group, OpenMode, OutputContainer};

/// Which parts of existing epoch groups a selective update rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateFlags {
    /// Rewrite generic, light and protocol-specific attributes
    pub attrs: bool,
    /// Rewrite response datasets and detected spikes
    pub responses: bool,
    /// Rewrite the `stimuli` subgroup
    pub stimuli: bool,
}

impl UpdateFlags {
    /// Rewrite everything
    pub fn all() -> Self {
        Self {
            attrs: true,
            responses: true,
            stimuli: true,
        }
    }

    /// Whether no part is selected
    pub fn is_empty(&self) -> bool {
        !(self.attrs || self.responses || self.stimuli)
    }
}

/// Outcome of one conversion mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Epoch groups written or refreshed
    pub epochs_written: usize,
    /// Epoch groups created because they were missing (selective update only)
    pub epochs_created: usize,
    /// Diagnostics recorded by this run alone; the session keeps the full history
    pub diagnostics: usize,
    /// Container statistics after close
    pub stats: ContainerStats,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} epochs written", self.epochs_written)?;
        if self.epochs_created > 0 {
            write!(f, " ({} created)", self.epochs_created)?;
        }
        write!(f, ", {} diagnostics; {}", self.diagnostics, self.stats)
    }
}

#[derive(Debug, Default)]
struct Progress {
    written: usize,
    created: usize,
}

impl ConversionSession {
    /// Rebuild the whole output container from the recording
    ///
    /// Any existing file at `output` is replaced when the container is closed.
    pub fn to_container<P: AsRef<Path>>(&mut self, output: P) -> Result<RunSummary, ConversionError> {
        let start = self.diagnostics().len();
        let mut container = self.acquire(output.as_ref(), OpenMode::Overwrite)?;
        let outcome = self.rebuild_all(container.root_mut());
        self.release(container, outcome, start)
    }

    /// Rebuild only the epochs of protocol `protocol_name`
    ///
    /// Other groups in the container are left untouched; a missing container is
    /// created.
    pub fn map_protocol<P: AsRef<Path>>(
        &mut self,
        protocol_name: &str,
        output: P,
    ) -> Result<RunSummary, ConversionError> {
        let start = self.diagnostics().len();
        let mut container = self.acquire(output.as_ref(), OpenMode::Append)?;
        let outcome = self.rebuild_protocol(protocol_name, container.root_mut());
        self.release(container, outcome, start)
    }

    /// Refresh selected parts of every epoch in an existing container
    ///
    /// Epochs without a group are created and fully converted.
    pub fn update<P: AsRef<Path>>(
        &mut self,
        output: P,
        flags: UpdateFlags,
    ) -> Result<RunSummary, ConversionError> {
        let start = self.diagnostics().len();
        let mut container = self.acquire(output.as_ref(), OpenMode::ReadWrite)?;
        let outcome = self.refresh(flags, container.root_mut());
        self.release(container, outcome, start)
    }

    /// Recompute the light attributes of every epoch in an existing container
    pub fn update_rstarr<P: AsRef<Path>>(&mut self, output: P) -> Result<RunSummary, ConversionError> {
        let start = self.diagnostics().len();
        let mut container = self.acquire(output.as_ref(), OpenMode::ReadWrite)?;
        let outcome = self.refresh_rstarr(container.root_mut());
        self.release(container, outcome, start)
    }

    fn acquire(&self, output: &Path, mode: OpenMode) -> Result<OutputContainer, ConversionError> {
        info!("Opening {} ({:?})", output.display(), mode);
        let mut container = OutputContainer::open(output, mode)?;
        container
            .manifest_mut()
            .add_source_file(self.source_path().display().to_string());
        Ok(container)
    }

    /// Close the container whatever the outcome; the outcome's error wins
    fn release(
        &mut self,
        container: OutputContainer,
        outcome: Result<Progress, ConversionError>,
        start: usize,
    ) -> Result<RunSummary, ConversionError> {
        match outcome {
            Ok(progress) => {
                self.surface_rstarr_errors();
                let stats = container.close()?;
                let summary = RunSummary {
                    epochs_written: progress.written,
                    epochs_created: progress.created,
                    diagnostics: self.diagnostics().len() - start,
                    stats,
                };
                info!("{}", summary);
                Ok(summary)
            }
            Err(err) => {
                let path = container.path().to_path_buf();
                if let Err(close_err) = container.close() {
                    warn!("Failed to close {} after error: {}", path.display(), close_err);
                }
                Err(err)
            }
        }
    }

    fn rebuild_all(&mut self, root: &mut Group) -> Result<Progress, ConversionError> {
        let scheme = self.key_scheme;
        let experiment_group = root.create_group(EXPERIMENT_GROUP)?;
        let (experiment, mut converter) = self.parts();
        let mut progress = Progress::default();

        for (index, (cell, protocol, epoch)) in experiment.epochs().enumerate() {
            let key = scheme.key(epoch, index);
            let group = experiment_group.create_group(&key).map_err(|err| match err {
                ContainerError::AlreadyExists(key) => ConversionError::DuplicateEpochKey(key),
                other => other.into(),
            })?;
            converter.convert_epoch(cell, protocol, epoch, group)?;
            progress.written += 1;
        }

        Ok(progress)
    }

    fn rebuild_protocol(
        &mut self,
        protocol_name: &str,
        root: &mut Group,
    ) -> Result<Progress, ConversionError> {
        let scheme = self.key_scheme;
        let experiment_group = root.require_group(EXPERIMENT_GROUP)?;
        let (experiment, mut converter) = self.parts();
        let mut progress = Progress::default();

        for (index, (cell, protocol, epoch)) in experiment.epochs().enumerate() {
            if protocol.name != protocol_name {
                continue;
            }
            let key = scheme.key(epoch, index);
            let group = experiment_group.replace_group(&key)?;
            converter.convert_epoch(cell, protocol, epoch, group)?;
            progress.written += 1;
        }

        if progress.written == 0 {
            warn!("No epochs of protocol {} in the recording", protocol_name);
        }
        Ok(progress)
    }

    fn refresh(&mut self, flags: UpdateFlags, root: &mut Group) -> Result<Progress, ConversionError> {
        let scheme = self.key_scheme;
        let experiment_group = root
            .group_mut(EXPERIMENT_GROUP)
            .ok_or_else(|| ConversionError::MissingGroup(EXPERIMENT_GROUP.to_string()))?;
        let (experiment, mut converter) = self.parts();
        let mut progress = Progress::default();

        for (index, (cell, protocol, epoch)) in experiment.epochs().enumerate() {
            let key = scheme.key(epoch, index);
            match experiment_group.group_mut(&key) {
                Some(group) => {
                    if flags.attrs {
                        converter.update_attrs(cell, protocol, epoch, group);
                    }
                    if flags.responses {
                        converter.update_responses(epoch, group)?;
                    }
                    if flags.stimuli {
                        converter.update_stimuli(epoch, group)?;
                    }
                }
                None => {
                    log::debug!("{} missing, converting in full", key);
                    let group = experiment_group.create_group(&key)?;
                    converter.convert_epoch(cell, protocol, epoch, group)?;
                    progress.created += 1;
                }
            }
            progress.written += 1;
        }

        Ok(progress)
    }

    fn refresh_rstarr(&mut self, root: &mut Group) -> Result<Progress, ConversionError> {
        let scheme = self.key_scheme;
        let experiment_group = root
            .group_mut(EXPERIMENT_GROUP)
            .ok_or_else(|| ConversionError::MissingGroup(EXPERIMENT_GROUP.to_string()))?;
        let (experiment, mut converter) = self.parts();
        let mut progress = Progress::default();

        for (index, (_, protocol, epoch)) in experiment.epochs().enumerate() {
            let key = scheme.key(epoch, index);
            let group = experiment_group
                .group_mut(&key)
                .ok_or_else(|| ConversionError::MissingGroup(format!("{}/{}", EXPERIMENT_GROUP, key)))?;
            for attr in LIGHT_ATTRS {
                group.remove_attr(attr);
            }
            converter.rstarr_conversion(protocol, epoch, group);
            progress.written += 1;
        }

        Ok(progress)
    }
}
