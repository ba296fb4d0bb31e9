//! # Protocol Parameter Mapping
//!
//! Every Symphony protocol family names its stimulus parameters differently.
//! A [`ParameterMapper`] translates one family's parameters into the flat,
//! lowercase attribute vocabulary of the output container.
//!
//! Mappers are looked up by protocol name (case-insensitive) in a fixed registry;
//! the first mapper that claims the name wins. Protocols nobody claims get the
//! [`Generic`] mapper, which adds nothing beyond the attributes every epoch has.
//!
//! | Mapper | Protocol names |
//! |--------|----------------|
//! | [`PairedPulseFamily`] | `pairedpulsefamily`, `ledpairedpulsefamily` |
//! | [`ChirpStimulusLed`] | `chirpstimulusled` |
//! | [`ExpandingSpots`] | `expandingspots` |
//! | [`AdaptingSteps`] | `adaptingsteps` |
//! | [`LedPairedSineWavePulse`] | `ledpairedsinewavepulse` |

mod families;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use crate::source::{Epoch, Protocol};
use crate::value::Parameters;

pub use families::{
    AdaptingSteps, ChirpStimulusLed, ExpandingSpots, Generic, LedPairedSineWavePulse,
    PairedPulseFamily,
};

/// Translates one protocol family's parameters into output attributes
pub trait ParameterMapper: Sync {
    /// Short family name used in logs
    fn family(&self) -> &'static str;

    /// Lowercase protocol names this mapper claims
    fn protocol_names(&self) -> &'static [&'static str];

    /// Attributes for one epoch of `protocol`
    fn params(&self, protocol: &Protocol, epoch: &Epoch) -> Parameters;

    /// Whether this mapper claims `protocol_name`
    fn claims(&self, protocol_name: &str) -> bool {
        let lower = protocol_name.to_lowercase();
        self.protocol_names().iter().any(|name| *name == lower)
    }
}

/// Known protocol families in selection order
pub static REGISTRY: [&dyn ParameterMapper; 5] = [
    &PairedPulseFamily,
    &ChirpStimulusLed,
    &ExpandingSpots,
    &AdaptingSteps,
    &LedPairedSineWavePulse,
];

/// Select the mapper for a protocol name
pub fn select(protocol_name: &str) -> &'static dyn ParameterMapper {
    REGISTRY
        .iter()
        .copied()
        .find(|mapper| mapper.claims(protocol_name))
        .unwrap_or(&Generic)
}

/// Per-session cache of mapper selections keyed by protocol name
#[derive(Default)]
pub struct MapperCache {
    selected: HashMap<String, &'static dyn ParameterMapper>,
}

impl MapperCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper for `protocol`, selecting it on first use
    pub fn mapper_for(&mut self, protocol: &Protocol) -> &'static dyn ParameterMapper {
        if let Some(mapper) = self.selected.get(&protocol.name) {
            return *mapper;
        }
        let mapper = select(&protocol.name);
        log::debug!("protocol {} uses {} mapper", protocol.name, mapper.family());
        self.selected.insert(protocol.name.clone(), mapper);
        mapper
    }

    /// Family attributes for one epoch
    pub fn params(&mut self, protocol: &Protocol, epoch: &Epoch) -> Parameters {
        self.mapper_for(protocol).params(protocol, epoch)
    }

    /// Number of distinct protocol names seen
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether no protocol has been looked up yet
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

impl std::fmt::Debug for MapperCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.selected.iter().map(|(k, v)| (k, v.family())))
            .finish()
    }
}
