use anyhow::Result;

use crate::container::{Dataset, OutputContainer};
use crate::converter::{
    EXPERIMENT_GROUP, PATH_ATTR, SPIKES_DATASET, SPIKE_CHANNEL, SPIKE_TRACETYPE, VIOLATION_ATTR,
};
use crate::value::Value;

use super::{Stage, ValidationCheck, ValidationReport};

const STAGE: Stage = Stage::Data;

/// Step 3: dataset contents of every epoch
pub(crate) fn check_data(container: &OutputContainer, report: &mut ValidationReport) -> Result<()> {
    let Some(experiment) = container.root().group(EXPERIMENT_GROUP) else {
        return Ok(());
    };

    let mut non_finite = 0usize;
    let mut without_path = Vec::new();
    let mut spike_problems = Vec::new();
    let mut spike_sets = 0usize;

    for (key, epoch) in experiment.groups() {
        for (name, dataset) in epoch.datasets() {
            non_finite += dataset.values().iter().filter(|v| !v.is_finite()).count();
            if name != SPIKES_DATASET && dataset.attr(PATH_ATTR).is_none() {
                without_path.push(format!("{}/{}", key, name));
            }
            if name != SPIKES_DATASET && dataset.attr(VIOLATION_ATTR).is_some() {
                spike_problems.push(format!("{}: {} on {}", key, VIOLATION_ATTR, name));
            }
        }

        if let Some(spikes) = epoch.dataset(SPIKES_DATASET) {
            spike_sets += 1;
            if epoch.attr("tracetype").and_then(Value::as_str) != Some(SPIKE_TRACETYPE) {
                spike_problems.push(format!("{}: {} outside a {} epoch", key, SPIKES_DATASET, SPIKE_TRACETYPE));
            }
            let trace_len = epoch.dataset(SPIKE_CHANNEL).map(Dataset::len);
            spike_problems.extend(check_spikes(spikes, trace_len).map(|p| format!("{}: {}", key, p)));
        }
    }

    if non_finite == 0 {
        report.add_check(ValidationCheck::ok(STAGE, "Samples are finite"));
    } else {
        report.add_check(ValidationCheck::warning(
            STAGE,
            "Samples are finite",
            format!("{} NaN or infinite samples", non_finite),
        ));
    }

    if without_path.is_empty() {
        report.add_check(ValidationCheck::ok(STAGE, "Responses record their source path"));
    } else {
        report.add_check(ValidationCheck::warning(
            STAGE,
            "Responses record their source path",
            format!("{} datasets without path, e.g. {}", without_path.len(), without_path[0]),
        ));
    }

    report.add_check(ValidationCheck::from_problems(
        STAGE,
        format!("Spike datasets ({})", spike_sets),
        &spike_problems,
    ));

    Ok(())
}

/// Spike times must increase and fall inside the trace; violation indices must
/// point into the spike list
fn check_spikes(spikes: &Dataset, trace_len: Option<usize>) -> Option<String> {
    let times = spikes.values();

    if times.windows(2).any(|w| w[1] <= w[0]) {
        return Some("spike times are not strictly increasing".to_string());
    }

    match trace_len {
        None => return Some(format!("{} without an {} trace", SPIKES_DATASET, SPIKE_CHANNEL)),
        Some(len) => {
            if let Some(t) = times.iter().find(|&&t| t < 0.0 || t >= len as f64) {
                return Some(format!("spike at sample {} outside trace of {} samples", t, len));
            }
        }
    }

    match spikes.attr(VIOLATION_ATTR) {
        None => None,
        Some(Value::IntArray(indices)) => indices
            .iter()
            .find(|&&i| i < 0 || i as usize >= times.len())
            .map(|i| format!("violation index {} outside {} spikes", i, times.len())),
        Some(other) => Some(format!("{} has type {}", VIOLATION_ATTR, other.type_name())),
    }
}
