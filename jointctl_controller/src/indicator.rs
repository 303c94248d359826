//! Indicator band mapping with edge-triggered lamp output.
//!
//! Every tick each group's joint angle [deg] is classified into an
//! [`IndicatorBand`]. Each lamp's desired state is recomputed from scratch
//! from that band; a lamp whose band does not match is driven off rather than
//! left as it was. A [`LampChange`] is produced only when the desired state
//! differs from the held one, so the host sees one set + notification per
//! actual transition.

use heapless::Vec;

use jointctl_common::consts::{MAX_JOINTS, MAX_LAMPS_PER_GROUP};
use jointctl_common::controller::state::IndicatorBand;
use jointctl_common::host::LampHandle;

/// Upper bound on lamps across all groups.
pub const MAX_LAMPS: usize = MAX_JOINTS * MAX_LAMPS_PER_GROUP;

/// One on/off lamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Lamp {
    /// Host name of the lamp.
    pub name: String,
    /// Handle resolved at initialization.
    pub handle: LampHandle,
    lit_within: bool,
    lit_beyond: bool,
    on: bool,
}

impl Lamp {
    /// `lit_in` lists the bands in which the lamp is on; `on` is the state
    /// currently held by the device.
    pub fn new(name: impl Into<String>, handle: LampHandle, lit_in: &[IndicatorBand], on: bool) -> Self {
        Self {
            name: name.into(),
            handle,
            lit_within: lit_in.contains(&IndicatorBand::Within),
            lit_beyond: lit_in.contains(&IndicatorBand::Beyond),
            on,
        }
    }

    /// State the lamp should have in `band`.
    #[inline]
    pub const fn desired(&self, band: IndicatorBand) -> bool {
        match band {
            IndicatorBand::Within => self.lit_within,
            IndicatorBand::Beyond => self.lit_beyond,
        }
    }

    #[inline]
    pub const fn is_on(&self) -> bool {
        self.on
    }
}

/// Lamps mirroring the band of one joint.
#[derive(Debug, Clone)]
pub struct LampGroup {
    joint: usize,
    band: Option<IndicatorBand>,
    lamps: Vec<Lamp, MAX_LAMPS_PER_GROUP>,
}

impl LampGroup {
    /// Empty group observing the joint at index `joint`.
    pub const fn new(joint: usize) -> Self {
        Self {
            joint,
            band: None,
            lamps: Vec::new(),
        }
    }

    /// Add a lamp. Returns the lamp back when the group is full.
    pub fn push_lamp(&mut self, lamp: Lamp) -> Result<(), Lamp> {
        self.lamps.push(lamp)
    }

    /// Index of the observed joint.
    #[inline]
    pub const fn joint(&self) -> usize {
        self.joint
    }

    /// Band computed on the last update, `None` before the first one.
    #[inline]
    pub const fn band(&self) -> Option<IndicatorBand> {
        self.band
    }

    pub fn lamps(&self) -> &[Lamp] {
        &self.lamps
    }
}

/// A lamp switched by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampChange {
    /// Group index.
    pub group: usize,
    /// Lamp index within the group.
    pub lamp: usize,
    /// Handle to switch on the host.
    pub handle: LampHandle,
    /// New state.
    pub on: bool,
}

/// Changes produced by one update.
pub type LampChanges = Vec<LampChange, MAX_LAMPS>;

/// Maps joint angles to bands and lamp transitions.
#[derive(Debug, Clone)]
pub struct IndicatorBandMapper {
    boundary_deg: f64,
    groups: Vec<LampGroup, MAX_JOINTS>,
}

impl IndicatorBandMapper {
    pub const fn new(boundary_deg: f64) -> Self {
        Self {
            boundary_deg,
            groups: Vec::new(),
        }
    }

    /// Add a group. Returns the group back when the mapper is full.
    pub fn push_group(&mut self, group: LampGroup) -> Result<(), LampGroup> {
        self.groups.push(group)
    }

    pub fn groups(&self) -> &[LampGroup] {
        &self.groups
    }

    /// Lamp addressed by a change.
    pub fn lamp(&self, change: &LampChange) -> Option<&Lamp> {
        self.groups.get(change.group)?.lamps.get(change.lamp)
    }

    /// Drive every lamp off. Only lamps currently on produce a change.
    pub fn all_off(&mut self) -> LampChanges {
        self.drive(|_, _| false)
    }

    /// Classify each group's joint angle and switch lamps whose desired
    /// state differs from the held one.
    ///
    /// `angle_deg` maps a joint index to its current angle in degrees.
    pub fn update(&mut self, angle_deg: impl Fn(usize) -> f64) -> LampChanges {
        let boundary = self.boundary_deg;
        for group in self.groups.iter_mut() {
            group.band = Some(IndicatorBand::classify(angle_deg(group.joint), boundary));
        }
        self.drive(|group, lamp| group.band.is_some_and(|band| lamp.desired(band)))
    }

    fn drive(&mut self, desired: impl Fn(&LampGroup, &Lamp) -> bool) -> LampChanges {
        let mut changes = LampChanges::new();
        for (g, group) in self.groups.iter_mut().enumerate() {
            let wanted: Vec<bool, MAX_LAMPS_PER_GROUP> =
                group.lamps.iter().map(|lamp| desired(group, lamp)).collect();
            for (l, (lamp, want)) in group.lamps.iter_mut().zip(wanted).enumerate() {
                if lamp.on != want {
                    lamp.on = want;
                    // Capacity covers every lamp of every group.
                    let _ = changes.push(LampChange {
                        group: g,
                        lamp: l,
                        handle: lamp.handle,
                        on: want,
                    });
                }
            }
        }
        changes
    }
}
