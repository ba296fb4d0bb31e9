use chrono::{DateTime, Duration};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dissonance::converter::{ConversionConfig, ConversionSession, UpdateFlags};
use dissonance::source::{Cell, Epoch, Experiment, Protocol, Response, Stimulus};
use dissonance::spikes::{SpikeDetector, ThresholdDetector};
use dissonance::value::{Parameters, Value};
use std::collections::BTreeMap;
use tempfile::TempDir;

/// Synthetic spike trace: flat baseline with a spike every `period` samples
fn spike_trace(samples: usize, period: usize) -> Vec<f64> {
    (0..samples)
        .map(|i| if i % period == period / 2 { 60.0 } else { (i % 7) as f64 * 0.1 })
        .collect()
}

/// One cell, two protocols, `epochs` spike-trace epochs of `samples` samples each
fn generate_experiment(epochs: usize, samples: usize) -> Experiment {
    let start = DateTime::parse_from_rfc3339("2020-01-26T10:00:00+00:00").unwrap();

    let mut parameters = Parameters::new();
    parameters.insert("led".into(), Value::from("Green_570nm"));
    parameters.insert("lightMean".into(), Value::Float(0.5));
    parameters.insert("sampleRate".into(), Value::Int(10_000));

    let make_epoch = |i: usize| {
        let startdate = start + Duration::seconds(i as i64 * 2);
        let mut protocol_parameters = Parameters::new();
        protocol_parameters.insert("lightAmplitude".into(), Value::Float(i as f64));

        Epoch {
            path: format!("/c1/e{}", i),
            startdate,
            enddate: startdate + Duration::seconds(1),
            tracetype: "spiketrace".into(),
            holdingpotential: 0.0,
            backgrounds: BTreeMap::new(),
            protocol_parameters,
            responses: vec![Response {
                name: "Amp1".into(),
                path: format!("/c1/e{}/Amp1", i),
                data: spike_trace(samples, 250),
            }],
            stimuli: vec![Stimulus {
                name: "Green_570nm_LED".into(),
                parameters: Parameters::new(),
            }],
        }
    };

    let half = epochs / 2;
    Experiment {
        cells: vec![Cell {
            cellkey: "c1".into(),
            celltype: "RGC\\ON-alpha".into(),
            protocols: vec![
                Protocol {
                    name: "LedPulseFamily".into(),
                    parameters: parameters.clone(),
                    epochs: (0..half).map(make_epoch).collect(),
                },
                Protocol {
                    name: "ChirpStimulusLED".into(),
                    parameters,
                    epochs: (half..epochs).map(make_epoch).collect(),
                },
            ],
        }],
    }
}

fn bench_full_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_rebuild");
    group.sample_size(10);

    for &(epochs, samples) in &[(20usize, 10_000usize), (100, 10_000), (20, 100_000)] {
        let experiment = generate_experiment(epochs, samples);
        group.throughput(Throughput::Elements((epochs * samples) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", epochs, samples)),
            &experiment,
            |b, experiment| {
                b.iter_batched(
                    || {
                        let temp_dir = TempDir::new().unwrap();
                        let session = ConversionSession::from_experiment(
                            temp_dir.path().join("WT").join("2020-01-26A.json"),
                            experiment.clone(),
                            &ConversionConfig::default(),
                        )
                        .unwrap();
                        (temp_dir, session)
                    },
                    |(temp_dir, mut session)| {
                        session
                            .to_container(temp_dir.path().join("2020-01-26A.dsn"))
                            .unwrap();
                        temp_dir
                    },
                    criterion::BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_selective_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("selective_update");
    group.sample_size(10);

    let experiment = generate_experiment(50, 10_000);
    let flags = UpdateFlags {
        responses: true,
        ..UpdateFlags::default()
    };

    group.bench_function("responses_50x10000", |b| {
        b.iter_batched(
            || {
                let temp_dir = TempDir::new().unwrap();
                let source = temp_dir.path().join("WT").join("2020-01-26A.json");
                let output = temp_dir.path().join("2020-01-26A.dsn");
                ConversionSession::from_experiment(&source, experiment.clone(), &ConversionConfig::default())
                    .unwrap()
                    .to_container(&output)
                    .unwrap();
                let session =
                    ConversionSession::from_experiment(&source, experiment.clone(), &ConversionConfig::default())
                        .unwrap();
                (temp_dir, output, session)
            },
            |(temp_dir, output, mut session)| {
                session.update(&output, flags).unwrap();
                temp_dir
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn bench_spike_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("spike_detection");
    let detector = ThresholdDetector::default();

    for &samples in &[10_000usize, 100_000, 1_000_000] {
        let trace = spike_trace(samples, 250);
        group.throughput(Throughput::Elements(samples as u64));
        group.bench_with_input(BenchmarkId::from_parameter(samples), &trace, |b, trace| {
            b.iter(|| detector.detect(trace));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_full_rebuild,
    bench_selective_update,
    bench_spike_detection
);
criterion_main!(benches);
