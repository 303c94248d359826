//! Scripted action end to end: trigger, ramp, holds, returns, completion.

use jointctl_common::prelude::*;
use jointctl_controller::Controller;

use super::mock_host::{DT, autobox_config, autobox_host};

const MAX_TICKS: usize = 30_000;

/// Tick until the phase changes, returning the ticks spent.
fn run_until_phase_changes(
    host: &mut super::mock_host::MockHost,
    ctrl: &mut Controller,
) -> usize {
    let start = ctrl.phase();
    for n in 1..=MAX_TICKS {
        ctrl.tick(host);
        host.step();
        if ctrl.phase() != start {
            return n;
        }
    }
    panic!("stuck in {start:?}");
}

#[test]
fn ramp_scenario_with_smallest_step() {
    let mut host = autobox_host();
    let mut ctrl = Controller::initialize(&mut host, &autobox_config()).unwrap();

    host.buttons = ButtonSet::BUTTON_3;
    ctrl.tick(&mut host);
    host.step();
    host.buttons = ButtonSet::empty();
    assert!(ctrl.is_action_active());
    assert_eq!(ctrl.sequencer().unwrap().move_distance(), -0.0001);

    // Phase 1: target moves by -0.0001 per tick for one second.
    let ramp_ticks = 1 + run_until_phase_changes(&mut host, &mut ctrl);
    assert_eq!(ctrl.phase(), SequencePhase::RampHold);
    let box_target = ctrl.joint("Box").unwrap().q_ref;
    let expected = -0.0001 * (1.0 / DT);
    assert!((box_target - expected).abs() < 3.0 * 0.0001, "{box_target}");
    assert!((box_target + 0.0001 * ramp_ticks as f64).abs() < 1e-9);

    // Untouched until the ramp joint returns.
    // The entry action of a phase runs on the tick after the transition, so
    // the target is still untouched on the tick RampReturn is entered.
    while ctrl.phase() != SequencePhase::RampReturn {
        run_until_phase_changes(&mut host, &mut ctrl);
        assert_eq!(ctrl.joint("Box").unwrap().q_ref, box_target, "{:?}", ctrl.phase());
    }
    ctrl.tick(&mut host);
    host.step();
    assert_eq!(ctrl.phase(), SequencePhase::RampReturn);
    assert_eq!(ctrl.joint("Box").unwrap().q_ref, 0.0);

    // Waits for convergence, then goes idle.
    run_until_phase_changes(&mut host, &mut ctrl);
    assert_eq!(ctrl.phase(), SequencePhase::Idle);
    assert!(!ctrl.is_action_active());
    let b = ctrl.joint("Box").unwrap();
    assert!((b.q_ref - b.q).abs() < 1e-6);
}

#[test]
fn phases_execute_in_schedule_order() {
    let mut host = autobox_host();
    let mut ctrl = Controller::initialize(&mut host, &autobox_config()).unwrap();
    host.buttons = ButtonSet::BUTTON_0;
    ctrl.tick(&mut host);
    host.step();
    host.buttons = ButtonSet::empty();

    let mut labels = vec![ctrl.phase().label()];
    while ctrl.is_action_active() {
        run_until_phase_changes(&mut host, &mut ctrl);
        labels.push(ctrl.phase().label());
    }
    assert_eq!(labels, vec![1, 2, 3, 4, 5, 6, 8, 7, 9, 0]);
}

#[test]
fn jump_and_rotate_targets_applied() {
    let mut host = autobox_host();
    let mut ctrl = Controller::initialize(&mut host, &autobox_config()).unwrap();
    host.buttons = ButtonSet::BUTTON_1;
    ctrl.tick(&mut host);
    host.step();
    host.buttons = ButtonSet::empty();

    while ctrl.phase() != SequencePhase::RotateHold {
        run_until_phase_changes(&mut host, &mut ctrl);
    }
    assert_eq!(ctrl.joint("SmallBox").unwrap().q_ref, 0.005);
    let robo = ctrl.joint("Robo").unwrap();
    assert!((robo.q_ref - 45f64.to_radians()).abs() < 1e-12);
    // One second of tracking gets the rotate joint close to its target.
    assert!(host.joint("Robo").q > 0.5);

    while ctrl.phase() != SequencePhase::RampReturn {
        run_until_phase_changes(&mut host, &mut ctrl);
    }
    assert_eq!(ctrl.joint("SmallBox").unwrap().q_ref, 0.0);
    assert_eq!(ctrl.joint("Robo").unwrap().q_ref, 0.0);
}

#[test]
fn held_button_does_not_restart_action() {
    let mut host = autobox_host();
    let mut ctrl = Controller::initialize(&mut host, &autobox_config()).unwrap();
    host.buttons = ButtonSet::BUTTON_0;

    host.run(&mut ctrl, 500);
    let seq = ctrl.sequencer().unwrap();
    assert_eq!(seq.phase(), SequencePhase::Ramp);
    // Elapsed keeps growing although the button never released.
    assert!((seq.elapsed() - 500.0 * DT).abs() < 1e-9);

    // Pressing another menu button mid-action changes nothing.
    host.buttons = ButtonSet::BUTTON_1;
    host.run(&mut ctrl, 10);
    assert_eq!(ctrl.sequencer().unwrap().move_distance(), -0.00025);
}

#[test]
fn unmapped_button_leaves_controller_idle() {
    let mut host = autobox_host();
    let mut ctrl = Controller::initialize(&mut host, &autobox_config()).unwrap();
    host.buttons = ButtonSet::BUTTON_2;
    host.run(&mut ctrl, 100);

    assert!(!ctrl.is_action_active());
    for j in ctrl.joints() {
        assert_eq!(j.q_ref, j.q_initial);
        assert_eq!(j.u_cmd, 0.0);
    }
}
