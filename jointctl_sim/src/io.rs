//! I/O simulator: scripted button panel and lamp bank.
//!
//! The panel reports a button as pressed while the simulated time lies in
//! any of its scripted `[start, start + duration)` windows. Lamps hold their
//! on/off state and count state-change notifications.

use tracing::debug;

use jointctl_common::host::ButtonSet;

use crate::config::{ButtonPressConfig, SimLampConfig};

/// One simulated lamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LampState {
    pub name: String,
    pub on: bool,
    /// Notifications received since start.
    pub notifications: u32,
}

/// Button panel and lamp bank.
#[derive(Debug, Clone)]
pub struct IoSimulator {
    presses: Vec<ButtonPressConfig>,
    lamps: Vec<LampState>,
}

impl IoSimulator {
    pub fn new(presses: &[ButtonPressConfig], lamps: &[SimLampConfig]) -> Self {
        let lamps: Vec<LampState> = lamps
            .iter()
            .map(|l| LampState {
                name: l.name.clone(),
                on: l.initially_on,
                notifications: 0,
            })
            .collect();

        debug!(
            "IoSimulator initialized: {} scripted presses, {} lamps",
            presses.len(),
            lamps.len()
        );

        Self {
            presses: presses.to_vec(),
            lamps,
        }
    }

    /// Panel snapshot at simulated time `t` [s].
    pub fn buttons_at(&self, t: f64) -> ButtonSet {
        self.presses
            .iter()
            .filter(|p| t >= p.start && t < p.start + p.duration)
            .fold(ButtonSet::empty(), |set, p| set | ButtonSet::pressed(p.button))
    }

    pub fn lamp_index(&self, name: &str) -> Option<usize> {
        self.lamps.iter().position(|l| l.name == name)
    }

    pub fn lamp(&self, index: usize) -> Option<&LampState> {
        self.lamps.get(index)
    }

    pub fn lamps(&self) -> &[LampState] {
        &self.lamps
    }

    /// Switch a lamp and record the notification.
    pub fn set_lamp(&mut self, index: usize, on: bool) {
        if let Some(lamp) = self.lamps.get_mut(index) {
            lamp.on = on;
            lamp.notifications += 1;
            debug!(lamp = %lamp.name, on, "lamp notified");
        }
    }

    /// Sum of notifications over all lamps.
    pub fn total_notifications(&self) -> u32 {
        self.lamps.iter().map(|l| l.notifications).sum()
    }
}
