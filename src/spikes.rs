//! # Spike Detection
//!
//! The converter treats spike detection as a black box behind [`SpikeDetector`]:
//! given one trace it returns the spike times (if any) and the indices of spikes
//! that violate the refractory period (if any).
//!
//! [`ThresholdDetector`] is the built-in detector. It subtracts the trace median,
//! marks an event whenever the absolute deviation rises through `threshold`, and
//! reports the sample index of the largest deviation inside each event.

use serde::Deserialize;

/// Result of running a detector over one trace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpikeDetection {
    /// Spike times in samples; `None` when no spikes were found
    pub spikes: Option<Vec<f64>>,

    /// Positions in `spikes` that follow the previous spike too closely
    pub violation_idx: Option<Vec<i64>>,
}

impl SpikeDetection {
    /// A detection with no spikes and no violations
    pub fn none() -> Self {
        Self::default()
    }
}

/// Contract for spike detection routines
pub trait SpikeDetector {
    /// Detect spikes in a single trace
    fn detect(&self, signal: &[f64]) -> SpikeDetection;
}

impl<F> SpikeDetector for F
where
    F: Fn(&[f64]) -> SpikeDetection,
{
    fn detect(&self, signal: &[f64]) -> SpikeDetection {
        self(signal)
    }
}

/// Threshold-crossing detector settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdDetector {
    /// Absolute deviation from the trace median that starts an event
    pub threshold: f64,

    /// Minimum gap in samples between consecutive spikes
    pub refractory_samples: usize,
}

impl Default for ThresholdDetector {
    fn default() -> Self {
        Self {
            threshold: 20.0,
            refractory_samples: 20,
        }
    }
}

impl ThresholdDetector {
    /// Create a detector with the given threshold and refractory gap
    pub fn new(threshold: f64, refractory_samples: usize) -> Self {
        Self {
            threshold,
            refractory_samples,
        }
    }
}

impl SpikeDetector for ThresholdDetector {
    fn detect(&self, signal: &[f64]) -> SpikeDetection {
        let Some(baseline) = median(signal) else {
            return SpikeDetection::none();
        };

        let mut spikes = Vec::new();
        let mut peak: Option<(usize, f64)> = None;

        for (i, sample) in signal.iter().enumerate() {
            let deviation = (sample - baseline).abs();
            if deviation >= self.threshold {
                match peak {
                    Some((_, best)) if best >= deviation => {}
                    _ => peak = Some((i, deviation)),
                }
            } else if let Some((idx, _)) = peak.take() {
                spikes.push(idx);
            }
        }
        if let Some((idx, _)) = peak {
            spikes.push(idx);
        }

        if spikes.is_empty() {
            return SpikeDetection::none();
        }

        let violations: Vec<i64> = spikes
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[1] - pair[0] < self.refractory_samples)
            .map(|(i, _)| (i + 1) as i64)
            .collect();

        SpikeDetection {
            spikes: Some(spikes.into_iter().map(|i| i as f64).collect()),
            violation_idx: (!violations.is_empty()).then_some(violations),
        }
    }
}

fn median(signal: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = signal.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}
