//! Scripted action sequencer.
//!
//! A button-triggered action that moves three joints through a fixed
//! schedule:
//!
//! ```text
//! Idle ─trigger→ Ramp → RampHold → Jump → JumpHold → Rotate → RotateHold
//!      → JumpReturn → RotateReset → RampReturn ─converged→ Idle
//! ```
//!
//! Each phase has an entry action, re-applied on every tick while the phase
//! is current, and an exit condition checked on the same tick after the
//! action. Time-gated phases leave once `elapsed >= hold_duration`;
//! convergence-gated phases leave once `|q_ref - q| < epsilon` for their
//! joint. On exit `elapsed` resets to zero and the successor becomes
//! current; otherwise `elapsed` grows by `dt`.
//!
//! A convergence target the joint never reaches keeps the sequencer in that
//! phase for good. There is no timeout and no cancellation.

use heapless::Vec;

use jointctl_common::consts::MAX_TRIGGERS;
use jointctl_common::controller::config::{SequenceConfig, TriggerConfig};
use jointctl_common::controller::state::SequencePhase;
use jointctl_common::host::ButtonSet;

use crate::joint::JointState;

// ─── Transition Table ───────────────────────────────────────────────

/// Which of the three scripted joints a phase acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointRole {
    /// Target ramped by the trigger's move distance.
    Ramp,
    /// Target jumped to a fixed absolute value.
    Jump,
    /// Target rotated to a fixed absolute angle.
    Rotate,
}

/// Action re-applied every tick while a phase is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    /// Leave all targets alone.
    Hold,
    /// `q_ref += move_distance`.
    Step(JointRole),
    /// `q_ref = fixed target of the role`.
    SetFixed(JointRole),
    /// `q_ref = q_initial`.
    SetInitial(JointRole),
    /// `q_ref = 0`.
    SetZero(JointRole),
}

/// Condition that ends a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCondition {
    /// `elapsed >= hold_duration`.
    Elapsed,
    /// `|q_ref - q| < epsilon` for the role's joint.
    Converged(JointRole),
}

/// Row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSpec {
    pub entry: EntryAction,
    pub exit: ExitCondition,
    /// Successor; `Idle` marks the terminal phase.
    pub next: SequencePhase,
}

/// Transition table row of `phase`, `None` for `Idle`.
pub const fn phase_spec(phase: SequencePhase) -> Option<PhaseSpec> {
    use EntryAction as A;
    use ExitCondition as X;
    use JointRole as R;
    use SequencePhase as P;

    let (entry, exit, next) = match phase {
        P::Idle => return None,
        P::Ramp => (A::Step(R::Ramp), X::Elapsed, P::RampHold),
        P::RampHold => (A::Hold, X::Elapsed, P::Jump),
        P::Jump => (A::SetFixed(R::Jump), X::Elapsed, P::JumpHold),
        P::JumpHold => (A::Hold, X::Elapsed, P::Rotate),
        P::Rotate => (A::SetFixed(R::Rotate), X::Elapsed, P::RotateHold),
        P::RotateHold => (A::Hold, X::Elapsed, P::JumpReturn),
        P::JumpReturn => (A::SetInitial(R::Jump), X::Converged(R::Jump), P::RotateReset),
        P::RotateReset => (A::SetZero(R::Rotate), X::Elapsed, P::RampReturn),
        P::RampReturn => (A::SetInitial(R::Ramp), X::Converged(R::Ramp), P::Idle),
    };
    Some(PhaseSpec { entry, exit, next })
}

// ─── Sequencer ──────────────────────────────────────────────────────

/// Indices of the scripted joints in the controller's joint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleJoints {
    pub ramp: usize,
    pub jump: usize,
    pub rotate: usize,
}

impl RoleJoints {
    #[inline]
    const fn index(&self, role: JointRole) -> usize {
        match role {
            JointRole::Ramp => self.ramp,
            JointRole::Jump => self.jump,
            JointRole::Rotate => self.rotate,
        }
    }
}

/// Result of one sequencer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No action in progress.
    Idle,
    /// Phase still current.
    Stayed(SequencePhase),
    /// Phase exited into a non-terminal successor.
    Advanced {
        from: SequencePhase,
        to: SequencePhase,
    },
    /// Terminal phase exited; the sequencer is idle again.
    Completed,
}

/// Scripted action state machine.
#[derive(Debug, Clone)]
pub struct ActionSequencer {
    phase: SequencePhase,
    elapsed: f64,
    action_triggered: bool,
    move_distance: f64,
    roles: RoleJoints,
    triggers: Vec<TriggerConfig, MAX_TRIGGERS>,
    jump_target: f64,
    rotate_target: f64,
    hold_duration: f64,
    epsilon: f64,
}

impl ActionSequencer {
    /// Build an idle sequencer. Returns `None` when the trigger menu exceeds
    /// its fixed capacity.
    pub fn new(config: &SequenceConfig, roles: RoleJoints) -> Option<Self> {
        let triggers = Vec::from_slice(&config.triggers).ok()?;
        Some(Self {
            phase: SequencePhase::Idle,
            elapsed: 0.0,
            action_triggered: false,
            move_distance: 0.0,
            roles,
            triggers,
            jump_target: config.jump_target,
            rotate_target: config.rotate_target_deg.to_radians(),
            hold_duration: config.hold_duration,
            epsilon: config.convergence_epsilon,
        })
    }

    #[inline]
    pub const fn phase(&self) -> SequencePhase {
        self.phase
    }

    /// Time spent in the current phase [s].
    #[inline]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Whether an action is in progress.
    #[inline]
    pub const fn is_active(&self) -> bool {
        self.action_triggered
    }

    /// Ramp increment chosen by the last accepted trigger [rad].
    #[inline]
    pub const fn move_distance(&self) -> f64 {
        self.move_distance
    }

    pub fn triggers(&self) -> &[TriggerConfig] {
        &self.triggers
    }

    pub const fn roles(&self) -> RoleJoints {
        self.roles
    }

    /// Start an action if idle and a menu button is pressed.
    ///
    /// The menu is scanned in order and the first pressed entry wins.
    /// Returns the accepted entry; `None` while an action is in progress.
    pub fn try_trigger(&mut self, buttons: ButtonSet) -> Option<TriggerConfig> {
        if self.action_triggered {
            return None;
        }
        let trigger = *self.triggers.iter().find(|t| buttons.is_pressed(t.button))?;
        self.action_triggered = true;
        self.phase = SequencePhase::Ramp;
        self.elapsed = 0.0;
        self.move_distance = trigger.move_distance;
        Some(trigger)
    }

    /// Apply the current phase's entry action to `joints`, then evaluate its
    /// exit condition against the angles measured this tick.
    pub fn step(&mut self, joints: &mut [JointState], dt: f64) -> StepOutcome {
        if !self.action_triggered {
            return StepOutcome::Idle;
        }
        let Some(spec) = phase_spec(self.phase) else {
            // Active with no phase: treat as finished.
            self.finish();
            return StepOutcome::Completed;
        };

        self.apply_entry(spec.entry, joints);

        if !self.exit_reached(spec.exit, joints) {
            self.elapsed += dt;
            return StepOutcome::Stayed(self.phase);
        }

        let from = self.phase;
        self.elapsed = 0.0;
        if spec.next == SequencePhase::Idle {
            self.finish();
            StepOutcome::Completed
        } else {
            self.phase = spec.next;
            StepOutcome::Advanced {
                from,
                to: spec.next,
            }
        }
    }

    fn finish(&mut self) {
        self.action_triggered = false;
        self.phase = SequencePhase::Idle;
        self.elapsed = 0.0;
    }

    fn apply_entry(&self, action: EntryAction, joints: &mut [JointState]) {
        let (role, target) = match action {
            EntryAction::Hold => return,
            EntryAction::Step(role) => {
                if let Some(j) = joints.get_mut(self.roles.index(role)) {
                    j.q_ref += self.move_distance;
                }
                return;
            }
            EntryAction::SetFixed(role) => (role, self.fixed_target(role)),
            EntryAction::SetInitial(role) => match joints.get(self.roles.index(role)) {
                Some(j) => (role, j.q_initial),
                None => return,
            },
            EntryAction::SetZero(role) => (role, 0.0),
        };
        if let Some(j) = joints.get_mut(self.roles.index(role)) {
            j.q_ref = target;
        }
    }

    fn fixed_target(&self, role: JointRole) -> f64 {
        match role {
            JointRole::Jump => self.jump_target,
            JointRole::Rotate => self.rotate_target,
            JointRole::Ramp => 0.0,
        }
    }

    fn exit_reached(&self, exit: ExitCondition, joints: &[JointState]) -> bool {
        match exit {
            ExitCondition::Elapsed => self.elapsed >= self.hold_duration,
            ExitCondition::Converged(role) => joints
                .get(self.roles.index(role))
                .is_some_and(|j| j.tracking_error().abs() < self.epsilon),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
