use std::path::Path;

use chrono::{DateTime, FixedOffset};
use log::Level;

use super::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use super::{
    ConversionError, LIGHT_ATTRS, PATH_ATTR, SPIKES_DATASET, SPIKE_CHANNEL, SPIKE_TRACETYPE,
    STIMULI_GROUP, VIOLATION_ATTR,
};
use crate::container::{Attributes, Group};
use crate::mapping::MapperCache;
use crate::rstarr::RstarrConverter;
use crate::source::{Cell, Epoch, Protocol};
use crate::spikes::SpikeDetector;
use crate::value::Value;

/// Light intensity in raw stimulus units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightIntensity {
    /// Stimulus amplitude
    pub amplitude_su: f64,
    /// Background or mean level
    pub mean_su: f64,
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS[.ffffff]+HH:MM`
///
/// Microseconds are only written when non-zero.
pub fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
    if dt.timestamp_subsec_micros() == 0 {
        dt.format("%Y-%m-%d %H:%M:%S%:z").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.6f%:z").to_string()
    }
}

/// Writes the parts of one epoch into its output group
///
/// Borrows the mutable conversion state of a session so that the recording can
/// be traversed at the same time.
pub struct EpochConverter<'a> {
    pub(crate) source: &'a Path,
    pub(crate) genotype: &'a str,
    pub(crate) detector: &'a dyn SpikeDetector,
    pub(crate) rstarr: &'a mut dyn RstarrConverter,
    pub(crate) mappers: &'a mut MapperCache,
    pub(crate) diagnostics: &'a mut Diagnostics,
}

impl EpochConverter<'_> {
    /// Write attributes, responses and stimuli of a freshly created group
    pub fn convert_epoch(
        &mut self,
        cell: &Cell,
        protocol: &Protocol,
        epoch: &Epoch,
        group: &mut Group,
    ) -> Result<(), ConversionError> {
        self.update_attrs(cell, protocol, epoch, group);
        self.update_responses(epoch, group)?;
        self.update_stimuli(epoch, group)
    }

    /// Write the generic epoch attributes, the light attributes and the
    /// protocol-specific parameters
    pub fn update_attrs(&mut self, cell: &Cell, protocol: &Protocol, epoch: &Epoch, group: &mut Group) {
        let mut attrs = Attributes::new();
        attrs.insert(PATH_ATTR.into(), epoch.path.as_str().into());
        attrs.insert("cellname".into(), cell.cellkey.as_str().into());
        attrs.insert("celltype".into(), cell.celltype.as_str().into());
        attrs.insert("genotype".into(), self.genotype.into());
        attrs.insert("tracetype".into(), epoch.tracetype.as_str().into());
        attrs.insert("protocolname".into(), protocol.name.as_str().into());
        attrs.insert("startdate".into(), format_datetime(&epoch.startdate).into());
        attrs.insert("enddate".into(), format_datetime(&epoch.enddate).into());
        attrs.insert(
            "interpulseinterval".into(),
            protocol.get_or("interpulseInterval", 0_i64),
        );
        attrs.insert("led".into(), protocol.get_or("led", 0_i64));

        self.rstarr_conversion(protocol, epoch, group);

        attrs.insert("numberofaverages".into(), protocol.get_or("numberOfAverages", 0.0));
        attrs.insert("pretime".into(), protocol.get_or("preTime", 0.0));

        let background = epoch.background_value(SPIKE_CHANNEL).unwrap_or_else(|| {
            self.diagnostics.record(Diagnostic::for_epoch(
                Level::Debug,
                DiagnosticKind::MissingBackground,
                format_datetime(&epoch.startdate),
                format!("{}: no {} background, using 0.0", protocol.name, SPIKE_CHANNEL),
            ));
            0.0
        });
        attrs.insert("backgroundval".into(), background.into());

        attrs.insert("stimtime".into(), protocol.get_or("stimTime", 0.0));
        attrs.insert("samplerate".into(), protocol.get_or("sampleRate", 0.0));
        attrs.insert("tailtime".into(), protocol.get_or("tailTime", 0.0));
        attrs.insert(
            "ndf".into(),
            epoch
                .protocol_parameter("ndf")
                .cloned()
                .unwrap_or(Value::Float(0.0)),
        );
        attrs.insert("holdingpotential".into(), epoch.holdingpotential.into());

        attrs.extend(self.mappers.params(protocol, epoch));
        group.update_attrs(attrs);
    }

    /// Resolve the light amplitude and mean in stimulus units
    ///
    /// Missing values fall back to 0.0 and are recorded as diagnostics.
    pub fn light_intensity(&mut self, protocol: &Protocol, epoch: &Epoch) -> LightIntensity {
        let background_only =
            protocol.is_named("ChirpStimulusLED") || protocol.is_named("ExpandingSpots");

        let amplitude = if protocol.is_named("LedPulseFamily") {
            epoch
                .protocol_parameter("lightAmplitude")
                .and_then(Value::as_f64)
        } else if background_only {
            Some(0.0)
        } else {
            protocol
                .get_f64("lightAmplitude")
                .or_else(|| protocol.get_f64("firstLightAmplitude"))
        };

        // background-only protocols never use lightMean
        let mean = if background_only {
            protocol.get_f64("backgroundIntensity")
        } else {
            protocol.get_f64("lightMean")
        };

        let amplitude_su = amplitude.unwrap_or_else(|| {
            self.missing_light(protocol, epoch, DiagnosticKind::MissingLightAmplitude, Level::Info, "lightamplitude");
            0.0
        });
        let mean_su = mean.unwrap_or_else(|| {
            self.missing_light(protocol, epoch, DiagnosticKind::MissingLightMean, Level::Warn, "lightmean");
            0.0
        });

        LightIntensity {
            amplitude_su,
            mean_su,
        }
    }

    /// Write the four light attributes of an epoch group
    pub fn rstarr_conversion(&mut self, protocol: &Protocol, epoch: &Epoch, group: &mut Group) {
        let light = self.light_intensity(protocol, epoch);
        let (amplitude, mean) = self.rstarr.get(
            &protocol.name,
            protocol.get("led"),
            light.amplitude_su,
            light.mean_su,
        );

        let [amplitude_su_attr, mean_su_attr, amplitude_attr, mean_attr] = LIGHT_ATTRS;
        group.set_attr(amplitude_su_attr, light.amplitude_su);
        group.set_attr(mean_su_attr, light.mean_su);
        group.set_attr(amplitude_attr, amplitude);
        group.set_attr(mean_attr, mean);
    }

    /// Write one dataset per response, plus detected spikes for spike traces
    ///
    /// Existing datasets of the same name are replaced, so re-applying an
    /// update leaves the group unchanged.
    pub fn update_responses(&mut self, epoch: &Epoch, group: &mut Group) -> Result<(), ConversionError> {
        let spike_trace = epoch.tracetype == SPIKE_TRACETYPE;

        for response in &epoch.responses {
            group
                .replace_dataset(&response.name, response.data.clone())?
                .set_attr(PATH_ATTR, response.path.as_str());

            if !spike_trace || response.name != SPIKE_CHANNEL {
                continue;
            }

            group.remove(SPIKES_DATASET);
            let detection = self.detector.detect(&response.data);

            let spikes = match detection.spikes {
                Some(spikes) if !spikes.is_empty() => {
                    Some(group.create_dataset(SPIKES_DATASET, spikes)?)
                }
                _ => None,
            };

            if let Some(violations) = detection.violation_idx {
                let Some(spikes) = spikes else {
                    return Err(ConversionError::OrphanViolationIndex {
                        epoch: epoch.path.clone(),
                    });
                };
                spikes.set_attr(VIOLATION_ATTR, violations);
            }
        }

        Ok(())
    }

    /// Rewrite the `stimuli` subgroup from the epoch's stimuli
    ///
    /// Parameter keys are lower-cased.
    pub fn update_stimuli(&mut self, epoch: &Epoch, group: &mut Group) -> Result<(), ConversionError> {
        let stimuli = group.replace_group(STIMULI_GROUP)?;
        for stimulus in &epoch.stimuli {
            let target = stimuli.replace_group(&stimulus.name)?;
            target.update_attrs(
                stimulus
                    .iter()
                    .map(|(key, value)| (key.to_lowercase(), value.clone())),
            );
        }
        Ok(())
    }

    fn missing_light(
        &mut self,
        protocol: &Protocol,
        epoch: &Epoch,
        kind: DiagnosticKind,
        level: Level,
        attribute: &str,
    ) {
        let start = format_datetime(&epoch.startdate);
        self.diagnostics.record(Diagnostic::for_epoch(
            level,
            kind,
            start,
            format!(
                "{} in {}: no {}, using 0.0",
                protocol.name,
                self.source.display(),
                attribute
            ),
        ));
    }
}
