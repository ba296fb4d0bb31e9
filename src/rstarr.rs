//! # Rstarr Conversion
//!
//! Light intensities are recorded in stimulus units (SU), the raw values sent to
//! an LED. Analysis wants them in R*/rod/s, which depends on the LED and on the
//! calibration that was valid on the recording day.
//!
//! [`RstarrConverter`] is the seam the epoch converter talks to. The built-in
//! [`CalibrationConverter`] reads a [`CalibrationTable`] (usually from the TOML
//! config) and binds it to one recording date. A missing calibration never fails
//! a conversion: the converter logs a message once and falls back to `(0.0, 0.0)`.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::value::Value;

/// Converts raw stimulus units to R*/rod/s for one recording date
pub trait RstarrConverter {
    /// Convert `(amplitude, mean)` for a protocol driven by `led`
    fn get(
        &mut self,
        protocol: &str,
        led: Option<&Value>,
        amplitude_su: f64,
        mean_su: f64,
    ) -> (f64, f64);

    /// Unique conversion errors accumulated so far, oldest first
    fn errors(&self) -> &[String];

    /// Remove and return the accumulated errors
    fn take_errors(&mut self) -> Vec<String>;
}

/// One calibration entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Calibration {
    /// LED identifier as recorded in the protocol's `led` parameter
    pub led: String,

    /// First recording date this entry applies to
    pub effective: NaiveDate,

    /// R*/rod/s per stimulus unit
    pub rstarr_per_su: f64,

    /// Restrict to these protocol names (empty means all)
    #[serde(default)]
    pub protocols: Vec<String>,
}

impl Calibration {
    fn applies_to(&self, protocol: &str) -> bool {
        self.protocols.is_empty()
            || self
                .protocols
                .iter()
                .any(|name| name.eq_ignore_ascii_case(protocol))
    }
}

/// All known calibrations
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CalibrationTable {
    /// Calibration entries in any order
    #[serde(default, rename = "calibration")]
    pub entries: Vec<Calibration>,
}

impl CalibrationTable {
    /// Create a table from entries
    pub fn new(entries: Vec<Calibration>) -> Self {
        Self { entries }
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Linear LED calibration bound to a recording date
#[derive(Debug, Clone)]
pub struct CalibrationConverter {
    date: NaiveDate,
    /// Entries effective on `date`, newest first per LED
    by_led: BTreeMap<String, Vec<Calibration>>,
    errors: Vec<String>,
    seen: HashSet<String>,
}

impl CalibrationConverter {
    /// Bind `table` to the recording `date`
    pub fn new(date: NaiveDate, table: &CalibrationTable) -> Self {
        let mut by_led: BTreeMap<String, Vec<Calibration>> = BTreeMap::new();
        for entry in table.entries.iter().filter(|e| e.effective <= date) {
            by_led
                .entry(entry.led.to_lowercase())
                .or_default()
                .push(entry.clone());
        }
        for entries in by_led.values_mut() {
            entries.sort_by(|a, b| b.effective.cmp(&a.effective));
        }

        Self {
            date,
            by_led,
            errors: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Recording date this converter is bound to
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    fn record(&mut self, message: String) {
        if self.seen.insert(message.clone()) {
            self.errors.push(message);
        }
    }

    fn factor(&self, protocol: &str, led: &str) -> Option<f64> {
        self.by_led
            .get(&led.to_lowercase())?
            .iter()
            .find(|entry| entry.applies_to(protocol))
            .map(|entry| entry.rstarr_per_su)
    }
}

impl RstarrConverter for CalibrationConverter {
    fn get(
        &mut self,
        protocol: &str,
        led: Option<&Value>,
        amplitude_su: f64,
        mean_su: f64,
    ) -> (f64, f64) {
        let led_name = match led {
            Some(Value::Text(name)) => name.clone(),
            Some(Value::Int(id)) => id.to_string(),
            Some(other) => {
                self.record(format!(
                    "{}: unsupported led identifier {} ({})",
                    protocol,
                    other,
                    other.type_name()
                ));
                return (0.0, 0.0);
            }
            None => {
                self.record(format!("{}: no led parameter, cannot convert to R*", protocol));
                return (0.0, 0.0);
            }
        };

        match self.factor(protocol, &led_name) {
            Some(factor) => {
                let (amplitude, mean) = (amplitude_su * factor, mean_su * factor);
                if amplitude.is_finite() && mean.is_finite() {
                    return (amplitude, mean);
                }
                self.record(format!(
                    "{}: R* of ({}, {}) SU for led {} is not finite",
                    protocol, amplitude_su, mean_su, led_name
                ));
                (0.0, 0.0)
            }
            None => {
                self.record(format!(
                    "{}: no calibration for led {} on {}",
                    protocol, led_name, self.date
                ));
                (0.0, 0.0)
            }
        }
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }

    fn take_errors(&mut self) -> Vec<String> {
        self.seen.clear();
        std::mem::take(&mut self.errors)
    }
}
