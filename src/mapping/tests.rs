use super::*;
use crate::source::Experiment;
use crate::value::Value;
use proptest::prelude::*;

fn single_epoch(protocol_json: &str) -> Experiment {
    Experiment::from_json_str(&format!(
        r#"{{"cells": [{{"cellkey": "c1", "protocols": [{}]}}]}}"#,
        protocol_json
    ))
    .unwrap()
}

#[test]
fn test_selection_by_name() {
    assert_eq!(select("PairedPulseFamily").family(), "paired-pulse");
    assert_eq!(select("LedPairedPulseFamily").family(), "paired-pulse");
    assert_eq!(select("ChirpStimulusLED").family(), "chirp");
    assert_eq!(select("ExpandingSpots").family(), "expanding-spots");
    assert_eq!(select("AdaptingSteps").family(), "adapting-steps");
    assert_eq!(select("LedPairedSineWavePulse").family(), "sine-pulse");
}

#[test]
fn test_unknown_protocol_is_generic() {
    let experiment = single_epoch(
        r#"{"name": "LedPulse", "parameters": {"preTime": 10}, "epochs": [
            {"path": "/e", "startdate": "2020-01-26T10:00:00+00:00", "enddate": "2020-01-26T10:00:01+00:00"}]}"#,
    );
    let (_, protocol, epoch) = experiment.epochs().next().unwrap();

    assert_eq!(select(&protocol.name).family(), "generic");
    assert!(select(&protocol.name).params(protocol, epoch).is_empty());
}

#[test]
fn test_registry_names_are_lowercase_and_disjoint() {
    let mut seen = std::collections::HashSet::new();
    for mapper in REGISTRY.iter() {
        for name in mapper.protocol_names() {
            assert_eq!(*name, name.to_lowercase());
            assert!(seen.insert(*name), "{} claimed twice", name);
        }
    }
}

#[test]
fn test_paired_pulse_prefers_epoch_interval() {
    let experiment = single_epoch(
        r#"{"name": "PairedPulseFamily",
            "parameters": {"interpulseInterval": 100, "firstLightAmplitude": 0.5, "secondLightAmplitude": 1.0},
            "epochs": [
              {"path": "/e1", "startdate": "2020-01-26T10:00:00+00:00", "enddate": "2020-01-26T10:00:01+00:00",
               "protocol_parameters": {"interpulseInterval": 250}},
              {"path": "/e2", "startdate": "2020-01-26T10:00:02+00:00", "enddate": "2020-01-26T10:00:03+00:00"}
            ]}"#,
    );
    let mut epochs = experiment.epochs();

    let (_, protocol, first) = epochs.next().unwrap();
    let params = PairedPulseFamily.params(protocol, first);
    assert_eq!(params["interpulseinterval"], Value::Int(250));
    assert_eq!(params["firstlightamplitude"], Value::Float(0.5));
    assert_eq!(params["secondlightamplitude"], Value::Float(1.0));
    assert_eq!(params["firstpulseduration"], Value::Float(0.0));

    let (_, protocol, second) = epochs.next().unwrap();
    let params = PairedPulseFamily.params(protocol, second);
    assert_eq!(params["interpulseinterval"], Value::Int(100));
}

#[test]
fn test_expanding_spots_fields() {
    let experiment = single_epoch(
        r#"{"name": "ExpandingSpots", "parameters": {"backgroundIntensity": 5.0, "spotIntensity": 0.8},
            "epochs": [{"path": "/e", "startdate": "2020-01-26T10:00:00+00:00", "enddate": "2020-01-26T10:00:01+00:00",
                        "protocol_parameters": {"currentSpotSize": 300}}]}"#,
    );
    let (_, protocol, epoch) = experiment.epochs().next().unwrap();

    let params = ExpandingSpots.params(protocol, epoch);
    assert_eq!(params.len(), 3);
    assert_eq!(params["backgroundintensity"], Value::Float(5.0));
    assert_eq!(params["spotintensity"], Value::Float(0.8));
    assert_eq!(params["currentspotsize"], Value::Int(300));
}

#[test]
fn test_cache_selects_once_per_name() {
    let experiment = single_epoch(
        r#"{"name": "AdaptingSteps", "parameters": {"flashDuration": 10}, "epochs": [
            {"path": "/e1", "startdate": "2020-01-26T10:00:00+00:00", "enddate": "2020-01-26T10:00:01+00:00",
             "protocol_parameters": {"stepAmplitude": 2.0, "variableFlashTime": 500}},
            {"path": "/e2", "startdate": "2020-01-26T10:00:02+00:00", "enddate": "2020-01-26T10:00:03+00:00",
             "protocol_parameters": {"stepAmplitude": 4.0, "variableFlashTime": 750}}]}"#,
    );
    let mut cache = MapperCache::new();

    let amplitudes: Vec<Value> = experiment
        .epochs()
        .map(|(_, protocol, epoch)| cache.params(protocol, epoch)["stepamplitude"].clone())
        .collect();

    assert_eq!(amplitudes, vec![Value::Float(2.0), Value::Float(4.0)]);
    assert_eq!(cache.len(), 1);
}

proptest! {
    #[test]
    fn prop_selection_ignores_case(mask in proptest::collection::vec(any::<bool>(), 0..32)) {
        for mapper in REGISTRY.iter() {
            for name in mapper.protocol_names() {
                let mixed: String = name
                    .chars()
                    .enumerate()
                    .map(|(i, c)| if mask.get(i).copied().unwrap_or(false) { c.to_ascii_uppercase() } else { c })
                    .collect();
                prop_assert_eq!(select(&mixed).family(), mapper.family());
            }
        }
    }

    #[test]
    fn prop_unclaimed_names_fall_back(name in "[a-z]{1,12}") {
        let claimed = REGISTRY.iter().any(|m| m.protocol_names().contains(&name.as_str()));
        prop_assume!(!claimed);
        prop_assert_eq!(select(&name).family(), "generic");
    }
}
