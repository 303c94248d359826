//! JSON trace written by a short run.

use jointctl_sim::trace::TraceRecorder;

use super::fixtures::{autobox, core_for};

#[test]
fn trace_file_holds_decimated_samples() {
    let (controller, mut sim) = autobox();
    sim.duration = 0.6;
    let mut core = core_for(&(controller, sim)).with_trace(TraceRecorder::new(100));
    core.run();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("autobox_trace.json");
    core.trace().unwrap().write_json(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let samples: serde_json::Value = serde_json::from_str(&text).unwrap();
    let samples = samples.as_array().unwrap();
    assert_eq!(samples.len(), 6);

    let first = &samples[0];
    assert_eq!(first["phase"], 0);
    assert_eq!(first["joints"].as_array().unwrap().len(), 3);
    assert_eq!(first["joints"][0]["name"], "Box");
    // Button 3 is pressed from 0.5 s on.
    assert_eq!(samples[5]["phase"], 1);
}
