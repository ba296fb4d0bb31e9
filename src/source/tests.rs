use super::*;
use crate::value::Value;

const TWO_CELLS: &str = r#"{
  "cells": [
    {"cellkey": "c1", "celltype": "RGC\\ON-alpha", "protocols": [
      {"name": "LedPulse", "parameters": {"lightAmplitude": 1.5, "led": "Green_570nm"}, "epochs": [
        {"path": "/c1/p1/e1", "startdate": "2020-01-26T10:00:00+00:00", "enddate": "2020-01-26T10:00:01+00:00"},
        {"path": "/c1/p1/e2", "startdate": "2020-01-26T10:00:02+00:00", "enddate": "2020-01-26T10:00:03+00:00"}
      ]},
      {"name": "ExpandingSpots", "epochs": [
        {"path": "/c1/p2/e1", "startdate": "2020-01-26T10:01:00+00:00", "enddate": "2020-01-26T10:01:01+00:00"}
      ]}
    ]},
    {"cellkey": "c2", "protocols": [
      {"name": "LedPulse", "epochs": [
        {"path": "/c2/p1/e1", "startdate": "2020-01-26T09:00:00+00:00", "enddate": "2020-01-26T09:00:01+00:00",
         "backgrounds": {"Amp1": {"value": -3.5}},
         "protocol_parameters": {"ndf": 2}}
      ]}
    ]}
  ]
}"#;

#[test]
fn test_traversal_follows_recording_order() {
    let experiment = Experiment::from_json_str(TWO_CELLS).unwrap();

    let paths: Vec<&str> = experiment
        .epochs()
        .map(|(_, _, epoch)| epoch.path.as_str())
        .collect();

    // c2's epoch starts earliest but is still visited last
    assert_eq!(paths, vec!["/c1/p1/e1", "/c1/p1/e2", "/c1/p2/e1", "/c2/p1/e1"]);
    assert_eq!(experiment.epoch_count(), 4);
}

#[test]
fn test_traversal_carries_parents() {
    let experiment = Experiment::from_json_str(TWO_CELLS).unwrap();

    let (cell, protocol, _) = experiment.epochs().nth(2).unwrap();
    assert_eq!(cell.cellkey, "c1");
    assert_eq!(protocol.name, "ExpandingSpots");
}

#[test]
fn test_protocol_lookup_with_default() {
    let experiment = Experiment::from_json_str(TWO_CELLS).unwrap();
    let protocol = &experiment.cells[0].protocols[0];

    assert_eq!(protocol.get_f64("lightAmplitude"), Some(1.5));
    assert_eq!(protocol.get_or("preTime", 0.0), Value::Float(0.0));
    assert_eq!(protocol.get_or("led", 0_i64), Value::Text("Green_570nm".into()));
    assert!(protocol.is_named("ledpulse"));
}

#[test]
fn test_background_and_overrides() {
    let experiment = Experiment::from_json_str(TWO_CELLS).unwrap();
    let (_, _, epoch) = experiment.epochs().last().unwrap();

    assert_eq!(epoch.background_value("Amp1"), Some(-3.5));
    assert_eq!(epoch.background_value("Amp2"), None);
    assert_eq!(epoch.protocol_parameter("ndf"), Some(&Value::Int(2)));

    let (_, _, first) = experiment.epochs().next().unwrap();
    assert_eq!(first.background_value("Amp1"), None);
}

#[test]
fn test_start_timestamp_keeps_subseconds() {
    let json = r#"{"cells": [{"cellkey": "c", "protocols": [{"name": "p", "epochs": [
        {"path": "/e", "startdate": "2020-01-26T10:13:20.5+00:00", "enddate": "2020-01-26T10:13:21+00:00"}
    ]}]}]}"#;
    let experiment = Experiment::from_json_str(json).unwrap();
    let (_, _, epoch) = experiment.epochs().next().unwrap();

    assert_eq!(epoch.start_timestamp(), 1_580_033_600.5);
}

#[test]
fn test_rejects_inverted_epoch_interval() {
    let json = r#"{"cells": [{"cellkey": "c", "protocols": [{"name": "p", "epochs": [
        {"path": "/bad", "startdate": "2020-01-26T10:00:05+00:00", "enddate": "2020-01-26T10:00:00+00:00"}
    ]}]}]}"#;

    match Experiment::from_json_str(json) {
        Err(SourceError::InvalidEpochInterval { path, .. }) => assert_eq!(path, "/bad"),
        other => panic!("expected interval error, got {:?}", other),
    }
}

#[test]
fn test_rejects_malformed_json() {
    assert!(matches!(
        Experiment::from_json_str("{\"cells\": [{]}"),
        Err(SourceError::JsonError(_))
    ));
}
