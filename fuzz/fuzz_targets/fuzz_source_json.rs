#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Malformed exports must be rejected with an error, never a panic
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(experiment) = dissonance::source::Experiment::from_json_str(json) {
        for (_, protocol, epoch) in experiment.epochs() {
            let _ = epoch.start_timestamp();
            let _ = dissonance::mapping::select(&protocol.name).params(protocol, epoch);
        }
    }
});
