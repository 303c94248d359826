//! In-memory host with a second-order joint plant.
//!
//! `a = (u_cmd + u_ext - damping * v) / inertia`, semi-implicit Euler.
//! The torque sensor reads `u_cmd + u_ext`. With `frozen` set the plant
//! does not move and tests drive angles directly.

#![allow(dead_code)]

use jointctl_common::prelude::*;
use jointctl_controller::Controller;

pub const DT: f64 = 0.001;

#[derive(Debug, Clone)]
pub struct MockJoint {
    pub name: String,
    pub q: f64,
    pub v: f64,
    pub inertia: f64,
    pub damping: f64,
    pub u_cmd: f64,
    pub u_ext: f64,
    pub mode: ActuationMode,
    pub io_enabled: bool,
    pub torque_writes: u64,
}

#[derive(Debug, Clone)]
pub struct MockLamp {
    pub name: String,
    pub on: bool,
    pub notifications: u32,
}

#[derive(Debug, Clone)]
pub struct MockHost {
    pub dt: f64,
    pub joints: Vec<MockJoint>,
    pub lamps: Vec<MockLamp>,
    pub buttons: ButtonSet,
    pub frozen: bool,
    pub button_polls: u64,
}

impl MockHost {
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            joints: Vec::new(),
            lamps: Vec::new(),
            buttons: ButtonSet::empty(),
            frozen: false,
            button_polls: 0,
        }
    }

    pub fn with_joint(mut self, name: &str, q: f64, inertia: f64, damping: f64) -> Self {
        self.joints.push(MockJoint {
            name: name.to_string(),
            q,
            v: 0.0,
            inertia,
            damping,
            u_cmd: 0.0,
            u_ext: 0.0,
            mode: ActuationMode::Off,
            io_enabled: false,
            torque_writes: 0,
        });
        self
    }

    pub fn with_lamp(mut self, name: &str, on: bool) -> Self {
        self.lamps.push(MockLamp {
            name: name.to_string(),
            on,
            notifications: 0,
        });
        self
    }

    pub fn joint_mut(&mut self, name: &str) -> &mut MockJoint {
        self.joints
            .iter_mut()
            .find(|j| j.name == name)
            .unwrap_or_else(|| panic!("no joint {name}"))
    }

    pub fn joint(&self, name: &str) -> &MockJoint {
        self.joints
            .iter()
            .find(|j| j.name == name)
            .unwrap_or_else(|| panic!("no joint {name}"))
    }

    pub fn lamp(&self, name: &str) -> &MockLamp {
        self.lamps
            .iter()
            .find(|l| l.name == name)
            .unwrap_or_else(|| panic!("no lamp {name}"))
    }

    pub fn total_notifications(&self) -> u32 {
        self.lamps.iter().map(|l| l.notifications).sum()
    }

    /// Advance the plant by one timestep.
    pub fn step(&mut self) {
        if self.frozen {
            return;
        }
        let dt = self.dt;
        for j in self.joints.iter_mut() {
            let applied = if j.mode == ActuationMode::JointTorque {
                j.u_cmd
            } else {
                0.0
            };
            let a = (applied + j.u_ext - j.damping * j.v) / j.inertia;
            j.v += a * dt;
            j.q += j.v * dt;
        }
    }

    /// Tick the controller and step the plant `ticks` times.
    pub fn run(&mut self, ctrl: &mut Controller, ticks: usize) {
        for _ in 0..ticks {
            ctrl.tick(self);
            self.step();
        }
    }
}

impl Host for MockHost {
    fn timestep(&self) -> f64 {
        self.dt
    }

    fn find_joint(&self, name: &str) -> Option<JointHandle> {
        self.joints
            .iter()
            .position(|j| j.name == name)
            .map(|i| JointHandle(i as u16))
    }

    fn find_lamp(&self, name: &str) -> Option<LampHandle> {
        self.lamps
            .iter()
            .position(|l| l.name == name)
            .map(|i| LampHandle(i as u16))
    }

    fn set_actuation_mode(&mut self, joint: JointHandle, mode: ActuationMode) {
        self.joints[joint.0 as usize].mode = mode;
    }

    fn enable_io(&mut self, joint: JointHandle) {
        self.joints[joint.0 as usize].io_enabled = true;
    }

    fn joint_angle(&self, joint: JointHandle) -> f64 {
        self.joints[joint.0 as usize].q
    }

    fn joint_torque(&self, joint: JointHandle) -> f64 {
        let j = &self.joints[joint.0 as usize];
        j.u_cmd + j.u_ext
    }

    fn set_joint_torque(&mut self, joint: JointHandle, torque: f64) {
        let j = &mut self.joints[joint.0 as usize];
        j.u_cmd = torque;
        j.torque_writes += 1;
    }

    fn buttons(&mut self) -> ButtonSet {
        self.button_polls += 1;
        self.buttons
    }

    fn lamp_is_on(&self, lamp: LampHandle) -> bool {
        self.lamps[lamp.0 as usize].on
    }

    fn set_lamp(&mut self, lamp: LampHandle, on: bool) {
        let l = &mut self.lamps[lamp.0 as usize];
        l.on = on;
        l.notifications += 1;
    }
}

// ─── Reference Layouts ──────────────────────────────────────────────

pub const AUTOBOX_TOML: &str = r#"
mode = "scripted"

[shared]
service_name = "autobox"

[gains]
kp = 200.0
kd = 50.0

[[joints]]
name = "Box"

[[joints]]
name = "SmallBox"

[[joints]]
name = "Robo"

[sequence]
ramp_joint = "Box"
jump_joint = "SmallBox"
rotate_joint = "Robo"
jump_target = 0.005
rotate_target_deg = 45.0
hold_duration = 1.0
convergence_epsilon = 1e-6
triggers = [
    { button = 0, move_distance = -0.00025 },
    { button = 1, move_distance = -0.0004 },
    { button = 3, move_distance = -0.0001 },
]
"#;

pub const CYLINDER_TOML: &str = r#"
mode = "reactive"

[shared]
service_name = "cylinder_lights"

[gains]
kp = 0.5
kd = 0.04

[[joints]]
name = "Cylinder"

[[joints]]
name = "Cylinder2"

[[joints]]
name = "Cylinder3"

[disturbance]
torque_threshold = 0.1

[indicators]
boundary_deg = 35.0

[[indicators.groups]]
joint = "Cylinder3"
lamps = [ { name = "GreenLight", lit_in = ["beyond"] }, { name = "YellowLight" }, { name = "RedLight" } ]

[[indicators.groups]]
joint = "Cylinder2"
lamps = [ { name = "GreenLight1", lit_in = ["beyond"] }, { name = "YellowLight1" }, { name = "RedLight1" } ]

[[indicators.groups]]
joint = "Cylinder"
lamps = [ { name = "GreenLight2", lit_in = ["beyond"] }, { name = "YellowLight2" }, { name = "RedLight2" } ]
"#;

pub fn autobox_config() -> ControllerConfig {
    jointctl_controller::config::load_config_from_str(AUTOBOX_TOML).unwrap()
}

pub fn cylinder_config() -> ControllerConfig {
    jointctl_controller::config::load_config_from_str(CYLINDER_TOML).unwrap()
}

/// Box, SmallBox and Robo at rest at zero, unit inertia.
pub fn autobox_host() -> MockHost {
    MockHost::new(DT)
        .with_joint("Box", 0.0, 1.0, 0.0)
        .with_joint("SmallBox", 0.0, 1.0, 0.0)
        .with_joint("Robo", 0.0, 1.0, 0.0)
}

/// Three cylinders at rest with nine lamps, all off.
pub fn cylinder_host() -> MockHost {
    let mut host = MockHost::new(DT)
        .with_joint("Cylinder", 0.0, 0.01, 0.0)
        .with_joint("Cylinder2", 0.0, 0.01, 0.0)
        .with_joint("Cylinder3", 0.0, 0.01, 0.0);
    for suffix in ["", "1", "2"] {
        for color in ["Green", "Yellow", "Red"] {
            host = host.with_lamp(&format!("{color}Light{suffix}"), false);
        }
    }
    host
}
