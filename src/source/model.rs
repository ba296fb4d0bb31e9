use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::value::{Parameters, Value};

/// Root of a recording: the cells recorded on one day
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Experiment {
    /// Cells in recording order
    #[serde(default)]
    pub cells: Vec<Cell>,
}

/// One recorded cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Cell identifier as labelled during the experiment
    pub cellkey: String,

    /// Cell type label (e.g. `RGC\ON-alpha`)
    #[serde(default)]
    pub celltype: String,

    /// Protocols run on this cell, in recording order
    #[serde(default)]
    pub protocols: Vec<Protocol>,
}

/// A stimulus/recording configuration applied to one or more epochs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Protocol {
    /// Protocol name (e.g. `LedPulseFamily`)
    pub name: String,

    /// Protocol-level configuration
    #[serde(default)]
    pub parameters: Parameters,

    /// Epochs in recording order
    #[serde(default)]
    pub epochs: Vec<Epoch>,
}

impl Protocol {
    /// Look up a protocol parameter
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// Look up a protocol parameter, falling back to `default` when absent
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.parameters
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    /// Numeric protocol parameter; absent or non-numeric values are `None`
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Case-insensitive protocol name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// One trial of a protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Epoch {
    /// Location of the epoch inside the source recording
    pub path: String,

    /// Trial start
    pub startdate: DateTime<FixedOffset>,

    /// Trial end
    pub enddate: DateTime<FixedOffset>,

    /// Signal kind (e.g. `spiketrace`)
    #[serde(default)]
    pub tracetype: String,

    /// Amplifier holding potential
    #[serde(default)]
    pub holdingpotential: f64,

    /// Per-channel background settings keyed by device name
    #[serde(default)]
    pub backgrounds: BTreeMap<String, Parameters>,

    /// Epoch-level overrides of protocol parameters
    #[serde(default)]
    pub protocol_parameters: Parameters,

    /// Recorded channels
    #[serde(default)]
    pub responses: Vec<Response>,

    /// Applied stimuli
    #[serde(default)]
    pub stimuli: Vec<Stimulus>,
}

impl Epoch {
    /// Epoch-level override of a protocol parameter
    pub fn protocol_parameter(&self, name: &str) -> Option<&Value> {
        self.protocol_parameters.get(name)
    }

    /// Background `value` configured for an amplifier channel
    pub fn background_value(&self, channel: &str) -> Option<f64> {
        self.backgrounds
            .get(channel)
            .and_then(|bg| bg.get("value"))
            .and_then(Value::as_f64)
    }

    /// Start time as fractional unix seconds
    pub fn start_timestamp(&self) -> f64 {
        self.startdate.timestamp() as f64
            + f64::from(self.startdate.timestamp_subsec_micros()) / 1e6
    }
}

/// A recorded channel of an epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Channel name (e.g. `Amp1`)
    pub name: String,

    /// Location of the response inside the source recording
    #[serde(default)]
    pub path: String,

    /// Samples in recording order
    #[serde(default)]
    pub data: Vec<f64>,
}

/// Metadata of a stimulus applied during an epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stimulus {
    /// Stimulus device name
    pub name: String,

    /// Stimulus parameters
    #[serde(default)]
    pub parameters: Parameters,
}

impl Stimulus {
    /// Iterate over `(key, value)` parameter pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.parameters.iter().map(|(k, v)| (k.as_str(), v))
    }
}
