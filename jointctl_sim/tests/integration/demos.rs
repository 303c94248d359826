//! Bundled demos run to completion on the simulated body.

use jointctl_common::controller::state::SequencePhase;
use jointctl_common::host::Host;
use jointctl_sim::trace::TraceRecorder;

use super::fixtures::{autobox, core_for, cylinder_lights};

#[test]
fn autobox_action_runs_every_phase_and_returns_idle() {
    let configs = autobox();
    let mut core = core_for(&configs).with_trace(TraceRecorder::new(1));
    let summary = core.run();

    assert!(!summary.interrupted);
    assert_eq!(summary.final_phase, SequencePhase::Idle);
    assert!(!core.controller().is_action_active());

    let mut labels: Vec<u8> = core
        .trace()
        .unwrap()
        .samples()
        .iter()
        .map(|s| s.phase)
        .collect();
    labels.dedup();
    labels.retain(|&l| l != 0);
    assert_eq!(labels, vec![1, 2, 3, 4, 5, 6, 8, 7, 9]);
}

#[test]
fn autobox_targets_return_to_start() {
    let configs = autobox();
    let mut core = core_for(&configs);
    core.run();

    let ctrl = core.controller();
    for name in ["Box", "SmallBox", "Robo"] {
        let j = ctrl.joint(name).unwrap();
        assert_eq!(j.q_ref, 0.0, "{name}");
    }
    let body_box = core.body().joint_by_name("Box").unwrap();
    assert!(body_box.angle().abs() < 1e-5, "Box at {}", body_box.angle());
}

#[test]
fn shorter_run_stops_mid_ramp() {
    let (controller, mut sim) = autobox();
    sim.duration = 1.0;
    let mut core = core_for(&(controller, sim));
    let summary = core.run();

    assert_eq!(summary.ticks, 1000);
    assert_eq!(summary.final_phase, SequencePhase::Ramp);
    // Button 3 selects the smallest ramp step.
    let seq = core.controller().sequencer().unwrap();
    assert_eq!(seq.move_distance(), -0.0001);
    assert!(core.controller().joint("Box").unwrap().q_ref < 0.0);
}

#[test]
fn cylinder_pushed_past_boundary_lights_green() {
    let configs = cylinder_lights();
    let mut core = core_for(&configs);
    core.run();
    let body = core.body();
    let io = body.io();

    let cyl3 = body.joint_by_name("Cylinder3").unwrap();
    assert!(cyl3.angle() >= 35f64.to_radians(), "Cylinder3 at {}", cyl3.angle());

    let green = io.lamp(io.lamp_index("GreenLight").unwrap()).unwrap();
    assert!(green.on);
    assert!(green.notifications >= 1);

    // Follows the push: target ends where the joint was left.
    let ctrl3 = core.controller().joint("Cylinder3").unwrap();
    assert!(ctrl3.q_ref > 35f64.to_radians());
}

#[test]
fn cylinder_short_push_stays_inside_boundary() {
    let configs = cylinder_lights();
    let mut core = core_for(&configs);
    core.run();
    let io = core.body().io();

    let green2 = io.lamp(io.lamp_index("GreenLight2").unwrap()).unwrap();
    assert!(!green2.on);
    assert_eq!(green2.notifications, 0);

    // Untouched cylinder never moves.
    let cyl2 = core.body().find_joint("Cylinder2").unwrap();
    assert_eq!(core.body().joint_angle(cyl2), 0.0);
}

#[test]
fn lit_lamps_are_switched_off_at_startup() {
    let configs = cylinder_lights();
    let core = core_for(&configs);
    let io = core.body().io();

    for name in ["YellowLight", "YellowLight1", "YellowLight2"] {
        let lamp = io.lamp(io.lamp_index(name).unwrap()).unwrap();
        assert!(!lamp.on, "{name}");
        assert_eq!(lamp.notifications, 1, "{name}");
    }
    assert_eq!(io.total_notifications(), 3);
}
