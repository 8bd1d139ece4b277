use super::LayerState;
use crate::core::config::BreathingConfig;
use crate::core::skeleton::{BoneId, Role, RoleMap, Skeleton};
use bevy::log::warn;
use std::f32::consts::TAU;

/// Breathing: the root bone rises and falls on a sinusoid with matching
/// small pitch/roll, and chest-role bones swell on a slower scale cycle.
/// Intended to run continuously.
///
/// Owned channels: root position.y, root rotation.x/.z, chest scale.x/.y.
pub struct Breathing {
    config: BreathingConfig,
    state: LayerState,
    root: Option<BoneId>,
    chest: Vec<BoneId>,
    rest_y: f32,
}

const ROLL_AMPLITUDE: f32 = 0.015;
const PITCH_AMPLITUDE: f32 = 0.01;

impl Breathing {
    pub fn new(config: BreathingConfig, roles: &RoleMap, skeleton: &Skeleton) -> Self {
        let root = roles.first(Role::Root);
        let chest = roles.bones(Role::ChestBreath).to_vec();
        if root.is_none() && chest.is_empty() {
            warn!("breathing layer disabled: no root or chest bones in skeleton");
        }
        let rest_y = root.map(|id| skeleton.bone(id).rest().position.y).unwrap_or(0.0);
        Self {
            config,
            state: LayerState::running(),
            root,
            chest,
            rest_y,
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

        if let Some(root) = self.root {
            let breath = (t * self.config.speed).sin();
            let bone = skeleton.bone_mut(root);
            bone.local.position.y = self.rest_y + breath * self.config.intensity;
            bone.local.rotation.z = breath * ROLL_AMPLITUDE;
            bone.local.rotation.x = (t * self.config.speed * 0.5).sin() * PITCH_AMPLITUDE;
        }

        let phase = (t % self.config.chest_cycle) / self.config.chest_cycle;
        let swell = 1.0 + (phase * TAU).sin() * self.config.chest_scale_amplitude;
        for &id in &self.chest {
            let bone = skeleton.bone_mut(id);
            bone.local.scale.x = swell;
            bone.local.scale.y = swell;
        }
    }

    fn restore_neutral(&self, skeleton: &mut Skeleton) {
        if let Some(root) = self.root {
            let bone = skeleton.bone_mut(root);
            bone.local.position.y = self.rest_y;
            bone.local.rotation.z = 0.0;
            bone.local.rotation.x = 0.0;
        }
        for &id in &self.chest {
            let bone = skeleton.bone_mut(id);
            bone.local.scale.x = 1.0;
            bone.local.scale.y = 1.0;
        }
    }
}
