//! Simulated body: joints, panel and lamps behind the `Host` trait.

use std::collections::HashSet;

use tracing::debug;

use jointctl_common::consts::MAX_JOINTS;
use jointctl_common::host::{
    ActuationMode, ButtonSet, Host, HostError, JointHandle, LampHandle,
};

use crate::config::{PushConfig, SimConfig};
use crate::io::IoSimulator;
use crate::physics::JointSimulator;

/// External push resolved to a joint index.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScheduledPush {
    joint: usize,
    start: f64,
    end: f64,
    torque: f64,
}

/// Simulated host.
#[derive(Debug, Clone)]
pub struct SimBody {
    dt: f64,
    step_count: u64,
    joints: Vec<JointSimulator>,
    io: IoSimulator,
    pushes: Vec<ScheduledPush>,
}

impl SimBody {
    /// Build the body described by `config`.
    ///
    /// # Errors
    /// - [`HostError::DuplicateDevice`] if two joints or two lamps share a name.
    /// - [`HostError::TooManyDevices`] if handles cannot address every device.
    /// - [`HostError::InvalidParameter`] for a push on an unknown joint or a
    ///   non-positive timestep.
    pub fn from_config(config: &SimConfig) -> Result<Self, HostError> {
        if !(config.timestep.is_finite() && config.timestep > 0.0) {
            return Err(HostError::InvalidParameter(format!(
                "timestep {}",
                config.timestep
            )));
        }
        if config.joints.len() > u16::MAX as usize {
            return Err(HostError::TooManyDevices("joint"));
        }
        if config.lamps.len() > u16::MAX as usize {
            return Err(HostError::TooManyDevices("lamp"));
        }
        if config.joints.len() > MAX_JOINTS {
            debug!(
                "body has {} joints, more than one controller can drive",
                config.joints.len()
            );
        }

        let mut seen = HashSet::new();
        for j in &config.joints {
            if !seen.insert(j.name.as_str()) {
                return Err(HostError::DuplicateDevice {
                    kind: "joint",
                    name: j.name.clone(),
                });
            }
        }
        let mut seen = HashSet::new();
        for l in &config.lamps {
            if !seen.insert(l.name.as_str()) {
                return Err(HostError::DuplicateDevice {
                    kind: "lamp",
                    name: l.name.clone(),
                });
            }
        }

        let joints: Vec<JointSimulator> = config.joints.iter().map(JointSimulator::new).collect();
        let pushes = config
            .pushes
            .iter()
            .map(|p| resolve_push(p, &joints))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            dt: config.timestep,
            step_count: 0,
            joints,
            io: IoSimulator::new(&config.presses, &config.lamps),
            pushes,
        })
    }

    /// Simulated time [s].
    #[inline]
    pub fn time(&self) -> f64 {
        self.step_count as f64 * self.dt
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Apply scheduled pushes for the current time and advance every joint
    /// by one timestep.
    pub fn step(&mut self) {
        let t = self.time();
        for j in self.joints.iter_mut() {
            j.set_external_torque(0.0);
        }
        for p in &self.pushes {
            if t >= p.start && t < p.end {
                if let Some(j) = self.joints.get_mut(p.joint) {
                    j.set_external_torque(p.torque);
                }
            }
        }
        for j in self.joints.iter_mut() {
            j.step(self.dt);
        }
        self.step_count += 1;
    }

    pub fn joints(&self) -> &[JointSimulator] {
        &self.joints
    }

    pub fn joint_by_name(&self, name: &str) -> Option<&JointSimulator> {
        self.joints.iter().find(|j| j.name() == name)
    }

    pub fn io(&self) -> &IoSimulator {
        &self.io
    }
}

fn resolve_push(push: &PushConfig, joints: &[JointSimulator]) -> Result<ScheduledPush, HostError> {
    let joint = joints
        .iter()
        .position(|j| j.name() == push.joint)
        .ok_or_else(|| HostError::InvalidParameter(format!("push on unknown joint '{}'", push.joint)))?;
    Ok(ScheduledPush {
        joint,
        start: push.start,
        end: push.start + push.duration,
        torque: push.torque,
    })
}

impl Host for SimBody {
    fn timestep(&self) -> f64 {
        self.dt
    }

    fn find_joint(&self, name: &str) -> Option<JointHandle> {
        self.joints
            .iter()
            .position(|j| j.name() == name)
            .map(|i| JointHandle(i as u16))
    }

    fn find_lamp(&self, name: &str) -> Option<LampHandle> {
        self.io.lamp_index(name).map(|i| LampHandle(i as u16))
    }

    fn set_actuation_mode(&mut self, joint: JointHandle, mode: ActuationMode) {
        if let Some(j) = self.joints.get_mut(joint.0 as usize) {
            j.set_mode(mode);
        }
    }

    fn enable_io(&mut self, joint: JointHandle) {
        if let Some(j) = self.joints.get_mut(joint.0 as usize) {
            j.enable_io();
        }
    }

    fn joint_angle(&self, joint: JointHandle) -> f64 {
        self.joints.get(joint.0 as usize).map_or(0.0, JointSimulator::angle)
    }

    fn joint_torque(&self, joint: JointHandle) -> f64 {
        self.joints
            .get(joint.0 as usize)
            .map_or(0.0, JointSimulator::measured_torque)
    }

    fn set_joint_torque(&mut self, joint: JointHandle, torque: f64) {
        if let Some(j) = self.joints.get_mut(joint.0 as usize) {
            j.command_torque(torque);
        }
    }

    fn buttons(&mut self) -> ButtonSet {
        self.io.buttons_at(self.time())
    }

    fn lamp_is_on(&self, lamp: LampHandle) -> bool {
        self.io.lamp(lamp.0 as usize).is_some_and(|l| l.on)
    }

    fn set_lamp(&mut self, lamp: LampHandle, on: bool) {
        self.io.set_lamp(lamp.0 as usize, on);
    }
}
