//! Per-tick control cycle.
//!
//! [`Controller::initialize`] resolves every configured device on the host,
//! binds the joints in torque mode, seeds the joint state and drives all
//! lamps off. [`Controller::tick`] then runs once per host timestep:
//!
//! 1. Poll the button panel and read every joint's angle and torque.
//! 2. Scripted mode: accept a trigger if idle, then step the sequencer.
//!    Reactive mode: run the disturbance detector on every joint.
//! 3. Compute and write the PD torque of every joint.
//! 4. Commit `q_prev := q` for every joint.
//! 5. Update the indicator lamps from the angles read in step 1.
//!
//! Nothing inside a tick allocates, blocks or fails.

use heapless::Vec;
use tracing::{debug, error, info, trace};

use jointctl_common::consts::{MAX_JOINTS, MAX_TRIGGERS};
use jointctl_common::controller::config::ControllerConfig;
use jointctl_common::controller::error::InitError;
use jointctl_common::controller::state::{ControlMode, SequencePhase};
use jointctl_common::host::{ActuationMode, Host, JointHandle};

use crate::config::validate_controller_config;
use crate::control::disturbance::DisturbanceDetector;
use crate::control::pd::{PdGains, pd_compute};
use crate::indicator::{IndicatorBandMapper, Lamp, LampChanges, LampGroup};
use crate::joint::JointState;
use crate::state::sequencer::{ActionSequencer, RoleJoints, StepOutcome};

/// Target source selected by the configured mode.
// Built once at initialization and never moved inside the tick.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone)]
enum TargetSource {
    Scripted(ActionSequencer),
    Reactive(DisturbanceDetector),
}

/// Joint controller bound to one host.
#[derive(Debug, Clone)]
pub struct Controller {
    dt: f64,
    joints: Vec<JointState, MAX_JOINTS>,
    source: TargetSource,
    indicators: Option<IndicatorBandMapper>,
    tick_count: u64,
}

impl Controller {
    /// Validate `config`, resolve and bind every device on `host`, and
    /// return a controller ready for its first tick.
    ///
    /// # Errors
    /// - [`InitError::InvalidConfig`] if `config` fails validation.
    /// - [`InitError::InvalidTimestep`] if the host timestep is not finite and positive.
    /// - [`InitError::Unresolved`] naming every joint and lamp the host does not know.
    ///
    /// On error nothing has been written to the host.
    pub fn initialize<H: Host + ?Sized>(
        host: &mut H,
        config: &ControllerConfig,
    ) -> Result<Self, InitError> {
        let result = Self::try_initialize(host, config);
        match result {
            Ok(ref ctrl) => info!(
                service = %config.shared.service_name,
                joints = ctrl.joints.len(),
                dt = ctrl.dt,
                mode = ?config.mode,
                "initialization complete"
            ),
            Err(ref e) => error!(service = %config.shared.service_name, "initialization failed: {e}"),
        }
        result
    }

    fn try_initialize<H: Host + ?Sized>(
        host: &mut H,
        config: &ControllerConfig,
    ) -> Result<Self, InitError> {
        validate_controller_config(config).map_err(|e| InitError::InvalidConfig(e.to_string()))?;

        let dt = host.timestep();
        if !(dt.is_finite() && dt > 0.0) {
            return Err(InitError::InvalidTimestep(dt));
        }

        // ── Resolve every device before touching any ──
        let mut missing_joints = std::vec::Vec::new();
        let mut missing_lamps = std::vec::Vec::new();
        let mut joint_handles: std::vec::Vec<Option<JointHandle>> = std::vec::Vec::new();
        for joint in &config.joints {
            let handle = host.find_joint(&joint.name);
            if handle.is_none() {
                missing_joints.push(joint.name.clone());
            }
            joint_handles.push(handle);
        }
        let mut lamp_handles = std::vec::Vec::new();
        if let Some(ref indicators) = config.indicators {
            for group in &indicators.groups {
                for lamp in &group.lamps {
                    let handle = host.find_lamp(&lamp.name);
                    if handle.is_none() {
                        missing_lamps.push(lamp.name.clone());
                    }
                    lamp_handles.push(handle);
                }
            }
        }
        if let Some(err) = InitError::unresolved(missing_joints, missing_lamps) {
            return Err(err);
        }

        // ── Build runtime tables ──
        let mut joints: Vec<JointState, MAX_JOINTS> = Vec::new();
        for (joint, handle) in config.joints.iter().zip(joint_handles.into_iter().flatten()) {
            let gains = PdGains::from(joint.gains(&config.gains));
            let q = host.joint_angle(handle);
            joints
                .push(JointState::new(joint.name.clone(), handle, gains, q))
                .map_err(|j| InitError::InvalidConfig(format!("too many joints at '{}'", j.name)))?;
        }

        let source = match config.mode {
            ControlMode::Scripted => {
                let sequence = config.sequence.as_ref().ok_or_else(|| {
                    InitError::InvalidConfig("scripted mode requires a [sequence] section".into())
                })?;
                let role = |name: &str| {
                    config.joint_index(name).ok_or_else(|| {
                        InitError::InvalidConfig(format!("sequence joint '{name}' not configured"))
                    })
                };
                let roles = RoleJoints {
                    ramp: role(&sequence.ramp_joint)?,
                    jump: role(&sequence.jump_joint)?,
                    rotate: role(&sequence.rotate_joint)?,
                };
                let sequencer = ActionSequencer::new(sequence, roles).ok_or_else(|| {
                    InitError::InvalidConfig(format!("more than {MAX_TRIGGERS} triggers"))
                })?;
                TargetSource::Scripted(sequencer)
            }
            ControlMode::Reactive => {
                let disturbance = config.disturbance.as_ref().ok_or_else(|| {
                    InitError::InvalidConfig("reactive mode requires a [disturbance] section".into())
                })?;
                TargetSource::Reactive(DisturbanceDetector::from(disturbance))
            }
        };

        let indicators = match config.indicators {
            Some(ref cfg) => {
                let mut mapper = IndicatorBandMapper::new(cfg.boundary_deg);
                let mut handles = lamp_handles.into_iter().flatten();
                for group_cfg in &cfg.groups {
                    let joint = config.joint_index(&group_cfg.joint).ok_or_else(|| {
                        InitError::InvalidConfig(format!(
                            "indicator joint '{}' not configured",
                            group_cfg.joint
                        ))
                    })?;
                    let mut group = LampGroup::new(joint);
                    for lamp_cfg in &group_cfg.lamps {
                        let Some(handle) = handles.next() else {
                            return Err(InitError::InvalidConfig("lamp table mismatch".into()));
                        };
                        let lamp = Lamp::new(
                            lamp_cfg.name.clone(),
                            handle,
                            &lamp_cfg.lit_in,
                            host.lamp_is_on(handle),
                        );
                        group.push_lamp(lamp).map_err(|l| {
                            InitError::InvalidConfig(format!("too many lamps at '{}'", l.name))
                        })?;
                    }
                    mapper.push_group(group).map_err(|g| {
                        InitError::InvalidConfig(format!("too many lamp groups at joint {}", g.joint()))
                    })?;
                }
                Some(mapper)
            }
            None => None,
        };

        // ── Bind devices ──
        for joint in &joints {
            host.set_actuation_mode(joint.handle, ActuationMode::JointTorque);
            host.enable_io(joint.handle);
        }

        let mut ctrl = Self {
            dt,
            joints,
            source,
            indicators,
            tick_count: 0,
        };
        if let Some(ref mut mapper) = ctrl.indicators {
            let changes = mapper.all_off();
            apply_lamp_changes(host, mapper, &changes);
        }
        Ok(ctrl)
    }

    /// Run one control tick against `host`.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H) {
        let dt = self.dt;

        // ── Read ──
        let buttons = host.buttons();
        for index in buttons.pressed_indices() {
            debug!("button {index} pressed");
        }
        for joint in self.joints.iter_mut() {
            joint.q = host.joint_angle(joint.handle);
            joint.u_measured = host.joint_torque(joint.handle);
        }

        // ── Targets ──
        match self.source {
            TargetSource::Scripted(ref mut seq) => {
                if let Some(trigger) = seq.try_trigger(buttons) {
                    info!(
                        button = trigger.button,
                        move_distance = trigger.move_distance,
                        "action triggered"
                    );
                }
                match seq.step(&mut self.joints, dt) {
                    StepOutcome::Advanced { from, to } => {
                        debug!(from = from.label(), to = to.label(), "phase transition");
                    }
                    StepOutcome::Completed => info!("action complete"),
                    StepOutcome::Idle | StepOutcome::Stayed(_) => {}
                }
            }
            TargetSource::Reactive(ref detector) => {
                for joint in self.joints.iter_mut() {
                    if detector.apply(joint) {
                        trace!(
                            joint = %joint.name,
                            torque = joint.u_measured,
                            q_ref = joint.q_ref,
                            "disturbance, target reassigned"
                        );
                    }
                }
            }
        }

        // ── PD + write ──
        for joint in self.joints.iter_mut() {
            joint.u_cmd = pd_compute(&joint.gains, joint.q, joint.q_prev, joint.q_ref, dt);
            host.set_joint_torque(joint.handle, joint.u_cmd);
        }

        // ── Commit ──
        for joint in self.joints.iter_mut() {
            joint.q_prev = joint.q;
        }

        // ── Indicators ──
        if let Some(ref mut mapper) = self.indicators {
            let joints = &self.joints;
            let changes = mapper.update(|i| joints.get(i).map_or(0.0, |j| j.q.to_degrees()));
            apply_lamp_changes(host, mapper, &changes);
        }

        self.tick_count += 1;
    }

    /// Host timestep cached at initialization [s].
    #[inline]
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    #[inline]
    pub const fn mode(&self) -> ControlMode {
        match self.source {
            TargetSource::Scripted(_) => ControlMode::Scripted,
            TargetSource::Reactive(_) => ControlMode::Reactive,
        }
    }

    /// Ticks run since initialization.
    #[inline]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn joints(&self) -> &[JointState] {
        &self.joints
    }

    pub fn joint(&self, name: &str) -> Option<&JointState> {
        self.joints.iter().find(|j| j.name == name)
    }

    /// Sequencer, in scripted mode.
    pub fn sequencer(&self) -> Option<&ActionSequencer> {
        match self.source {
            TargetSource::Scripted(ref seq) => Some(seq),
            TargetSource::Reactive(_) => None,
        }
    }

    /// Current phase; always `Idle` in reactive mode.
    pub fn phase(&self) -> SequencePhase {
        self.sequencer().map_or(SequencePhase::Idle, ActionSequencer::phase)
    }

    /// Whether a scripted action is in progress.
    pub fn is_action_active(&self) -> bool {
        self.sequencer().is_some_and(ActionSequencer::is_active)
    }

    pub fn indicators(&self) -> Option<&IndicatorBandMapper> {
        self.indicators.as_ref()
    }
}

fn apply_lamp_changes<H: Host + ?Sized>(
    host: &mut H,
    mapper: &IndicatorBandMapper,
    changes: &LampChanges,
) {
    for change in changes {
        host.set_lamp(change.handle, change.on);
        if let Some(lamp) = mapper.lamp(change) {
            info!(lamp = %lamp.name, on = change.on, "lamp switched");
        }
    }
}
