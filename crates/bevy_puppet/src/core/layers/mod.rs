//! Procedural motion layers.
//!
//! Every layer is a function of elapsed time and its assigned bones, wrapped
//! in an explicit Running/Stopped state advanced by the single frame driver.
//! Stopping a layer snaps the channels it owns back to the neutral pose;
//! stale partial offsets never persist. A layer whose required roles are
//! absent from the bound skeleton becomes a permanent no-op (warned once at
//! construction, not every frame).
//!
//! Channel ownership is partitioned by construction: at most one layer owns
//! a given (bone, channel) pair at any time. The two overlaps the source rig
//! invites are arbitrated by the behavior state machine: the hip pitch
//! channel belongs to idle sway only while gait is stopped, and gesture
//! clips take over arm channels through blend weights.

mod arm_sway;
mod blink;
mod breathing;
mod eye_tracking;
mod gait;
mod head_look;
mod horn_sway;
mod sway;

pub use arm_sway::ArmSway;
pub use blink::Blink;
pub use breathing::Breathing;
pub use eye_tracking::EyeTracking;
pub use gait::Gait;
pub use head_look::HeadLook;
pub use horn_sway::HornSway;
pub use sway::IdleSway;

use crate::core::config::PuppetConfig;
use crate::core::skeleton::{RoleMap, Skeleton};
use bevy::math::Vec2;

/// Per-layer run state, advanced only by the frame driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayerState {
    pub running: bool,
    pub elapsed: f32,
}

impl LayerState {
    pub fn running() -> Self {
        Self {
            running: true,
            elapsed: 0.0,
        }
    }

    /// Advance the layer clock and return the new elapsed time.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        self.elapsed
    }
}

/// The full set of procedural layers for one bound skeleton.
pub struct LayerStack {
    pub breathing: Breathing,
    pub sway: IdleSway,
    pub gait: Gait,
    pub arm_sway: ArmSway,
    pub horn_sway: HornSway,
    pub head_look: HeadLook,
    pub eye_tracking: EyeTracking,
    pub blink: Blink,
}

impl LayerStack {
    /// Build all layers from the bound role map. The base layers start
    /// running; gait starts stopped and is toggled by the behavior machine.
    pub fn new(config: &PuppetConfig, roles: &RoleMap, skeleton: &mut Skeleton) -> Self {
        Self {
            breathing: Breathing::new(config.breathing.clone(), roles, skeleton),
            sway: IdleSway::new(config.sway.clone(), roles),
            gait: Gait::new(config.gait.clone(), roles),
            arm_sway: ArmSway::new(config.arm_sway.clone(), roles, skeleton),
            horn_sway: HornSway::new(config.horn_sway.clone(), roles),
            head_look: HeadLook::new(config.head_look.clone(), roles),
            eye_tracking: EyeTracking::new(config.eyes.clone(), roles),
            blink: Blink::new(config.eyes.clone(), roles),
        }
    }

    /// Advance every running layer. `cursor` is the latest normalized
    /// cursor sample consumed by look-at and eye tracking.
    pub fn update(&mut self, dt: f32, cursor: Vec2, skeleton: &mut Skeleton) {
        self.breathing.update(dt, skeleton);
        self.sway.update(dt, skeleton);
        self.gait.update(dt, skeleton);
        self.arm_sway.update(dt, skeleton);
        self.horn_sway.update(dt, skeleton);
        self.head_look.update(cursor, skeleton);
        self.eye_tracking.update(cursor, skeleton);
        self.blink.update(dt, skeleton);
    }

    /// Stop every layer, restoring neutral pose on all owned channels.
    pub fn stop_all(&mut self, skeleton: &mut Skeleton) {
        self.breathing.set_running(false, skeleton);
        self.sway.set_running(false, skeleton);
        self.gait.set_running(false, skeleton);
        self.arm_sway.set_running(false, skeleton);
        self.horn_sway.set_running(false, skeleton);
        self.head_look.set_running(false, skeleton);
        self.eye_tracking.set_running(false, skeleton);
        self.blink.set_running(false, skeleton);
    }
}
