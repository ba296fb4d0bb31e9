use anyhow::Result;
use regex::Regex;

use crate::container::{Group, OutputContainer};
use crate::converter::{EXPERIMENT_GROUP, LIGHT_ATTRS, PATH_ATTR, STIMULI_GROUP};

use super::{Stage, ValidationCheck, ValidationReport};

const STAGE: Stage = Stage::Hierarchy;

/// Attributes every epoch group carries after a full conversion
const REQUIRED_ATTRS: &[&str] = &[
    PATH_ATTR,
    "cellname",
    "celltype",
    "genotype",
    "tracetype",
    "protocolname",
    "startdate",
    "enddate",
];

/// Step 2: group tree and per-epoch attributes
pub(crate) fn check_hierarchy(container: &OutputContainer, report: &mut ValidationReport) -> Result<()> {
    let root = container.root();
    let manifest = container.manifest();

    let counts_match =
        manifest.group_count == root.group_count() && manifest.dataset_count == root.dataset_count();
    if counts_match {
        report.add_check(ValidationCheck::ok(STAGE, "Manifest counts match tree"));
    } else {
        report.add_check(ValidationCheck::failed(
            STAGE,
            "Manifest counts match tree",
            format!(
                "manifest lists {} groups/{} datasets, tree has {}/{}",
                manifest.group_count,
                manifest.dataset_count,
                root.group_count(),
                root.dataset_count()
            ),
        ));
    }

    let Some(experiment) = root.group(EXPERIMENT_GROUP) else {
        report.add_check(ValidationCheck::failed(
            STAGE,
            "experiment group present",
            "container has no experiment group",
        ));
        return Ok(());
    };
    report.add_check(ValidationCheck::ok(STAGE, "experiment group present"));

    let epochs: Vec<(&str, &Group)> = experiment.groups().collect();
    if epochs.is_empty() {
        report.add_check(ValidationCheck::warning(STAGE, "Epoch groups", "no epochs converted"));
        return Ok(());
    }
    report.add_check(ValidationCheck::ok(STAGE, format!("{} epoch groups", epochs.len())));

    let key_pattern = Regex::new(r"^epoch-?\d+(\.\d+)?$")?;
    let bad_keys: Vec<String> = epochs
        .iter()
        .filter(|(key, _)| !key_pattern.is_match(key))
        .map(|(key, _)| format!("unexpected group name {}", key))
        .collect();
    report.add_check(ValidationCheck::from_problems(STAGE, "Epoch group names", &bad_keys));

    let mut missing = Vec::new();
    for (key, epoch) in &epochs {
        for attr in REQUIRED_ATTRS.iter().chain(LIGHT_ATTRS.iter()) {
            if epoch.attr(attr).is_none() {
                missing.push(format!("{} lacks {}", key, attr));
            }
        }
    }
    report.add_check(ValidationCheck::from_problems(STAGE, "Required epoch attributes", &missing));

    let without_stimuli = epochs
        .iter()
        .filter(|(_, epoch)| epoch.group(STIMULI_GROUP).is_none())
        .count();
    if without_stimuli == 0 {
        report.add_check(ValidationCheck::ok(STAGE, "stimuli subgroups present"));
    } else {
        report.add_check(ValidationCheck::warning(
            STAGE,
            "stimuli subgroups present",
            format!("{} epochs without a stimuli group", without_stimuli),
        ));
    }

    Ok(())
}
