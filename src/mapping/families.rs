use crate::source::{Epoch, Protocol};
use crate::value::{Parameters, Value};

use super::ParameterMapper;

/// Copies protocol parameters into the attribute map under lowercase keys
struct Fields<'a> {
    protocol: &'a Protocol,
    epoch: &'a Epoch,
    out: Parameters,
}

impl<'a> Fields<'a> {
    fn new(protocol: &'a Protocol, epoch: &'a Epoch) -> Self {
        Self {
            protocol,
            epoch,
            out: Parameters::new(),
        }
    }

    /// Protocol-level parameter, 0.0 when absent
    fn protocol(mut self, key: &str) -> Self {
        let value = self.protocol.get_or(key, 0.0);
        self.out.insert(key.to_lowercase(), value);
        self
    }

    /// Epoch override, then protocol parameter, then 0.0
    fn epoch(mut self, key: &str) -> Self {
        let value = self
            .epoch
            .protocol_parameter(key)
            .or_else(|| self.protocol.get(key))
            .cloned()
            .unwrap_or(Value::Float(0.0));
        self.out.insert(key.to_lowercase(), value);
        self
    }

    fn finish(self) -> Parameters {
        self.out
    }
}

/// Protocols without family-specific attributes
pub struct Generic;

impl ParameterMapper for Generic {
    fn family(&self) -> &'static str {
        "generic"
    }

    fn protocol_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn params(&self, _protocol: &Protocol, _epoch: &Epoch) -> Parameters {
        Parameters::new()
    }
}

/// Two flashes separated by a variable interval
pub struct PairedPulseFamily;

impl ParameterMapper for PairedPulseFamily {
    fn family(&self) -> &'static str {
        "paired-pulse"
    }

    fn protocol_names(&self) -> &'static [&'static str] {
        &["pairedpulsefamily", "ledpairedpulsefamily"]
    }

    // The interval is stepped per epoch, so the epoch value replaces the
    // protocol-level interpulseinterval.
    fn params(&self, protocol: &Protocol, epoch: &Epoch) -> Parameters {
        Fields::new(protocol, epoch)
            .protocol("firstLightAmplitude")
            .protocol("secondLightAmplitude")
            .protocol("firstPulseDuration")
            .protocol("secondPulseDuration")
            .epoch("interpulseInterval")
            .finish()
    }
}

/// Step, frequency chirp and contrast chirp on one LED
pub struct ChirpStimulusLed;

impl ParameterMapper for ChirpStimulusLed {
    fn family(&self) -> &'static str {
        "chirp"
    }

    fn protocol_names(&self) -> &'static [&'static str] {
        &["chirpstimulusled"]
    }

    fn params(&self, protocol: &Protocol, epoch: &Epoch) -> Parameters {
        Fields::new(protocol, epoch)
            .protocol("backgroundIntensity")
            .protocol("stepTime")
            .protocol("frequencyTime")
            .protocol("contrastTime")
            .protocol("interTime")
            .protocol("stepContrast")
            .protocol("frequencyContrast")
            .protocol("frequencyMin")
            .protocol("frequencyMax")
            .protocol("contrastMin")
            .protocol("contrastMax")
            .protocol("contrastFrequency")
            .finish()
    }
}

/// Spots of increasing diameter on a projector background
pub struct ExpandingSpots;

impl ParameterMapper for ExpandingSpots {
    fn family(&self) -> &'static str {
        "expanding-spots"
    }

    fn protocol_names(&self) -> &'static [&'static str] {
        &["expandingspots"]
    }

    fn params(&self, protocol: &Protocol, epoch: &Epoch) -> Parameters {
        Fields::new(protocol, epoch)
            .protocol("backgroundIntensity")
            .protocol("spotIntensity")
            .epoch("currentSpotSize")
            .finish()
    }
}

/// Test flashes on top of adapting steps
pub struct AdaptingSteps;

impl ParameterMapper for AdaptingSteps {
    fn family(&self) -> &'static str {
        "adapting-steps"
    }

    fn protocol_names(&self) -> &'static [&'static str] {
        &["adaptingsteps"]
    }

    fn params(&self, protocol: &Protocol, epoch: &Epoch) -> Parameters {
        Fields::new(protocol, epoch)
            .protocol("flashDuration")
            .protocol("fixedFlashTime")
            .protocol("flashAmplitude")
            .epoch("stepAmplitude")
            .epoch("variableFlashTime")
            .finish()
    }
}

/// Sine-wave modulation followed by a pulse
pub struct LedPairedSineWavePulse;

impl ParameterMapper for LedPairedSineWavePulse {
    fn family(&self) -> &'static str {
        "sine-pulse"
    }

    fn protocol_names(&self) -> &'static [&'static str] {
        &["ledpairedsinewavepulse"]
    }

    fn params(&self, protocol: &Protocol, epoch: &Epoch) -> Parameters {
        Fields::new(protocol, epoch)
            .protocol("frequency")
            .protocol("sineTime")
            .protocol("pulseTime")
            .protocol("pulseAmplitude")
            .epoch("contrast")
            .finish()
    }
}
