use super::LayerState;
use crate::core::config::EyeConfig;
use crate::core::skeleton::{BoneId, Role, RoleMap, Side, Skeleton};

/// Blink: on a timer, the eye bones' vertical scale snaps to a near-zero
/// value and recovers after a short fixed delay. An independent oscillator,
/// not phase-locked to eye tracking.
///
/// Owned channels: eye scale.y.
pub struct Blink {
    config: EyeConfig,
    state: LayerState,
    eyes: Vec<BoneId>,
    since_blink: f32,
    closed_for: Option<f32>,
}

impl Blink {
    pub fn new(config: EyeConfig, roles: &RoleMap) -> Self {
        let mut eyes = Vec::new();
        eyes.extend_from_slice(roles.bones(Role::Eye(Side::Left)));
        eyes.extend_from_slice(roles.bones(Role::Eye(Side::Right)));
        Self {
            config,
            state: LayerState::running(),
            eyes,
            since_blink: 0.0,
            closed_for: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn eyes_closed(&self) -> bool {
        self.closed_for.is_some()
    }

    pub fn set_running(&mut self, running: bool, skeleton: &mut Skeleton) {
        if self.state.running && !running {
            self.open_eyes(skeleton);
            self.closed_for = None;
            self.since_blink = 0.0;
        }
        self.state.running = running;
    }

    pub fn update(&mut self, dt: f32, skeleton: &mut Skeleton) {
        if !self.state.running || self.eyes.is_empty() {
            return;
        }
        self.state.advance(dt);

        match &mut self.closed_for {
            Some(elapsed) => {
                *elapsed += dt;
                if *elapsed >= self.config.blink_duration {
                    self.open_eyes(skeleton);
                    self.closed_for = None;
                    self.since_blink = 0.0;
                }
            }
            None => {
                self.since_blink += dt;
                if self.since_blink >= self.config.blink_interval {
                    for &id in &self.eyes {
                        skeleton.bone_mut(id).local.scale.y = self.config.closed_scale;
                    }
                    self.closed_for = Some(0.0);
                }
            }
        }
    }

    fn open_eyes(&self, skeleton: &mut Skeleton) {
        for &id in &self.eyes {
            skeleton.bone_mut(id).local.scale.y = 1.0;
        }
    }
}
