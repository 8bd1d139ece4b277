use super::LayerState;
use crate::core::config::HornSwayConfig;
use crate::core::skeleton::{BoneId, Role, RoleMap, Side, Skeleton};

/// Decorative horn sway: base horn bones oscillate around a splayed-out
/// resting angle, mirrored left/right.
///
/// Owned channels: horn base rotation.z.
pub struct HornSway {
    config: HornSwayConfig,
    state: LayerState,
    left: Option<BoneId>,
    right: Option<BoneId>,
}

impl HornSway {
    pub fn new(config: HornSwayConfig, roles: &RoleMap) -> Self {
        // Creature-specific decoration; most humanoid rigs simply have no
        // horn bones and the layer stays inert without a warning.
        Self {
            config,
            state: LayerState::running(),
            left: roles.first(Role::HornBase(Side::Left)),
            right: roles.first(Role::HornBase(Side::Right)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn set_running(&mut self, running: bool, skeleton: &mut Skeleton) {
        if self.state.running && !running {
            self.restore_neutral(skeleton);
        }
        if !self.state.running && running {
            self.state.elapsed = 0.0;
        }
        self.state.running = running;
    }

    pub fn update(&mut self, dt: f32, skeleton: &mut Skeleton) {
        if !self.state.running {
            return;
        }
        let t = self.state.advance(dt);
        let wobble = (t * self.config.speed).sin() * self.config.amplitude;

        if let Some(id) = self.left {
            skeleton.bone_mut(id).local.rotation.z = -self.config.rest_angle + wobble;
        }
        if let Some(id) = self.right {
            skeleton.bone_mut(id).local.rotation.z = self.config.rest_angle - wobble;
        }
    }

    fn restore_neutral(&self, skeleton: &mut Skeleton) {
        for id in [self.left, self.right].into_iter().flatten() {
            skeleton.bone_mut(id).local.rotation.z = 0.0;
        }
    }
}
