use super::LayerState;
use crate::core::config::EyeConfig;
use crate::core::skeleton::{BoneId, Role, RoleMap, Side, Skeleton};
use bevy::log::warn;
use bevy::math::Vec2;

/// Eye tracking: eye bones turn toward the cursor through an exponential
/// smoothing filter, `next = current·(1−k) + target·k`. The target is
/// clamped to the maximum deflection *before* smoothing so a saccade
/// overshoot cannot feed back into the filter.
///
/// Owned channels: eye rotation.x/.y. The smoothing accumulator is the only
/// cross-frame state beyond the layer clock.
pub struct EyeTracking {
    config: EyeConfig,
    state: LayerState,
    eyes: Vec<BoneId>,
    current: Vec2,
}

impl EyeTracking {
    pub fn new(config: EyeConfig, roles: &RoleMap) -> Self {
        let mut eyes = Vec::new();
        eyes.extend_from_slice(roles.bones(Role::Eye(Side::Left)));
        eyes.extend_from_slice(roles.bones(Role::Eye(Side::Right)));
        if eyes.is_empty() {
            // the blink layer shares this bone set, so warn here only
            warn!("eye layers disabled: no eye bones in skeleton");
        }
        Self {
            config,
            state: LayerState::running(),
            eyes,
            current: Vec2::ZERO,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Smoothed deflection currently applied, as (yaw, pitch) radians.
    pub fn current_deflection(&self) -> Vec2 {
        self.current
    }

    pub fn set_running(&mut self, running: bool, skeleton: &mut Skeleton) {
        if self.state.running && !running {
            self.restore_neutral(skeleton);
            self.current = Vec2::ZERO;
        }
        self.state.running = running;
    }

    /// `cursor` is the latest normalized (−1..1) input sample.
    pub fn update(&mut self, cursor: Vec2, skeleton: &mut Skeleton) {
        if !self.state.running {
            return;
        }
        let max = self.config.max_eye_movement;
        let target = Vec2::new(
            (cursor.x * max).clamp(-max, max),
            (cursor.y * max).clamp(-max, max),
        );
        let k = self.config.smoothing_factor;
        self.current = self.current * (1.0 - k) + target * k;

        for &id in &self.eyes {
            let bone = skeleton.bone_mut(id);
            bone.local.rotation.x = self.current.y;
            bone.local.rotation.y = self.current.x;
        }
    }

    fn restore_neutral(&self, skeleton: &mut Skeleton) {
        for &id in &self.eyes {
            let bone = skeleton.bone_mut(id);
            bone.local.rotation.x = 0.0;
            bone.local.rotation.y = 0.0;
        }
    }
}
