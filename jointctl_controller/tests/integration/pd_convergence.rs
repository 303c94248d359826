//! Closed-loop PD behavior on a simulated joint.
//!
//! Verifies convergence on a constant target for both reference gain sets
//! and the velocity estimate under constant-rate motion.

use jointctl_common::prelude::*;
use jointctl_controller::Controller;
use jointctl_controller::control::pd::{PdGains, pd_compute, velocity_estimate};

use super::mock_host::{DT, autobox_config, autobox_host};

/// Simulated joint: `v += (u - damping * v) / inertia * dt`, `q += v * dt`.
struct SimulatedJoint {
    q: f64,
    v: f64,
    inertia: f64,
    damping: f64,
}

impl SimulatedJoint {
    fn new(q: f64, inertia: f64, damping: f64) -> Self {
        Self {
            q,
            v: 0.0,
            inertia,
            damping,
        }
    }

    fn step(&mut self, torque: f64, dt: f64) {
        let accel = (torque - self.damping * self.v) / self.inertia;
        self.v += accel * dt;
        self.q += self.v * dt;
    }
}

/// Run a step response and return the final absolute error.
fn run_step_response(gains: &PdGains, target: f64, cycles: usize, inertia: f64) -> f64 {
    let mut joint = SimulatedJoint::new(0.0, inertia, 0.0);
    let mut q_prev = joint.q;
    for _ in 0..cycles {
        let q = joint.q;
        let u = pd_compute(gains, q, q_prev, target, DT);
        q_prev = q;
        joint.step(u, DT);
    }
    (target - joint.q).abs()
}

#[test]
fn scripted_gains_converge_on_constant_target() {
    let gains = PdGains { kp: 200.0, kd: 50.0 };
    let err = run_step_response(&gains, 45f64.to_radians(), 10_000, 1.0);
    assert!(err < 1e-6, "final error {err}");
}

#[test]
fn reactive_gains_converge_on_constant_target() {
    let gains = PdGains { kp: 0.5, kd: 0.04 };
    let err = run_step_response(&gains, 0.3, 10_000, 0.01);
    assert!(err < 1e-6, "final error {err}");
}

#[test]
fn error_shrinks_monotonically_in_envelope() {
    let gains = PdGains { kp: 200.0, kd: 50.0 };
    let e1 = run_step_response(&gains, 0.1, 1_000, 1.0);
    let e2 = run_step_response(&gains, 0.1, 2_000, 1.0);
    let e4 = run_step_response(&gains, 0.1, 4_000, 1.0);
    assert!(e1 > e2 && e2 > e4, "{e1} {e2} {e4}");
}

#[test]
fn velocity_estimate_tracks_constant_rate_inside_controller() {
    let mut host = autobox_host();
    host.frozen = true;
    let mut ctrl = Controller::initialize(&mut host, &autobox_config()).unwrap();

    let v = 0.2;
    let kd = 50.0;
    let kp = 200.0;
    for k in 1..=20 {
        let q = v * DT * k as f64;
        host.joint_mut("Robo").q = q;
        ctrl.tick(&mut host);
        let u = host.joint("Robo").u_cmd;
        // q_ref stays 0: u = kp * (0 - q) - kd * v
        let expected = kp * (0.0 - q) - kd * v;
        assert!((u - expected).abs() < 1e-6, "tick {k}: {u} vs {expected}");
        let robo = ctrl.joint("Robo").unwrap();
        assert_eq!(robo.q_prev, q);
    }
}

#[test]
fn velocity_estimate_is_backward_difference() {
    assert!((velocity_estimate(0.0012, 0.001, DT) - 0.2).abs() < 1e-9);
}

#[test]
fn commanded_torque_mirrors_host_write() {
    let mut host = autobox_host();
    let mut ctrl = Controller::initialize(&mut host, &autobox_config()).unwrap();
    host.buttons = ButtonSet::BUTTON_0;
    host.run(&mut ctrl, 50);

    for j in ctrl.joints() {
        assert_eq!(host.joint(&j.name).u_cmd, j.u_cmd);
    }
    assert!((ctrl.joint("Box").unwrap().q_ref + 0.00025 * 50.0).abs() < 1e-12);
}
