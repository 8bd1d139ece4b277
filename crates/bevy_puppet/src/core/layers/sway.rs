use super::LayerState;
use crate::core::config::SwayConfig;
use crate::core::skeleton::{BoneId, Role, RoleMap, Skeleton};
use bevy::log::warn;
use std::f32::consts::TAU;

/// Idle spine sway: torso bones roll on a fixed-duration repeating cycle
/// while hip bones rock at half the spread. The phase comes from the sway
/// cycle, not the breathing clock, so the two layers drift out of phase.
///
/// Owned channels: spine rotation.z; hip rotation.x (only while the hip
/// contribution is enabled — gait owns that channel while walking).
pub struct IdleSway {
    config: SwayConfig,
    state: LayerState,
    spine: Vec<BoneId>,
    hips: Vec<BoneId>,
    hips_enabled: bool,
}

impl IdleSway {
    pub fn new(config: SwayConfig, roles: &RoleMap) -> Self {
        let spine = roles.bones(Role::Spine).to_vec();
        let hips = roles.bones(Role::Hip).to_vec();
        if spine.is_empty() && hips.is_empty() {
            warn!("idle sway layer disabled: no spine or hip bones in skeleton");
        }
        Self {
            config,
            state: LayerState::running(),
            spine,
            hips,
            hips_enabled: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn set_running(&mut self, running: bool, skeleton: &mut Skeleton) {
        if self.state.running && !running {
            self.restore_spine(skeleton);
            if self.hips_enabled {
                self.restore_hips(skeleton);
            }
        }
        if !self.state.running && running {
            self.state.elapsed = 0.0;
        }
        self.state.running = running;
    }

    /// Hand the hip channel over to (or take it back from) the gait layer.
    pub fn set_hips_enabled(&mut self, enabled: bool, skeleton: &mut Skeleton) {
        if self.hips_enabled && !enabled {
            self.restore_hips(skeleton);
        }
        self.hips_enabled = enabled;
    }

    pub fn update(&mut self, dt: f32, skeleton: &mut Skeleton) {
        if !self.state.running {
            return;
        }
        let t = self.state.advance(dt);
        let phase = (t % self.config.cycle) / self.config.cycle;
        let angle = (phase * TAU).sin();

        for &id in &self.spine {
            skeleton.bone_mut(id).local.rotation.z = angle * self.config.spine_amplitude;
        }
        if self.hips_enabled {
            for &id in &self.hips {
                skeleton.bone_mut(id).local.rotation.x = angle * self.config.hip_amplitude;
            }
        }
    }

    fn restore_spine(&self, skeleton: &mut Skeleton) {
        for &id in &self.spine {
            skeleton.bone_mut(id).local.rotation.z = 0.0;
        }
    }

    fn restore_hips(&self, skeleton: &mut Skeleton) {
        for &id in &self.hips {
            skeleton.bone_mut(id).local.rotation.x = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ClassifierConfig;
    use crate::core::skeleton::classify;
    use crate::core::skeleton::BoneTransform;

    fn setup() -> (Skeleton, RoleMap) {
        let mut b = Skeleton::builder();
        let base = b.bone("base", None, BoneTransform::default());
        b.bone("base001", Some(base), BoneTransform::default());
        b.bone("piernal", Some(base), BoneTransform::default());
        b.bone("piernar", Some(base), BoneTransform::default());
        let skeleton = b.build();
        let roles = classify::bind(&skeleton, &ClassifierConfig::default());
        (skeleton, roles)
    }

    #[test]
    fn sways_spine_and_rocks_hips() {
        let (mut skeleton, roles) = setup();
        let mut layer = IdleSway::new(SwayConfig::default(), &roles);

        layer.update(0.3, &mut skeleton);
        let spine = skeleton.find("base001").unwrap();
        let hip = skeleton.find("piernal").unwrap();
        assert!(skeleton.bone(spine).local.rotation.z.abs() > 1e-4);
        assert!(skeleton.bone(hip).local.rotation.x.abs() > 1e-4);
        // hip rock is half the spread of the spine roll at equal phase
        let spine_z = skeleton.bone(spine).local.rotation.z;
        let hip_x = skeleton.bone(hip).local.rotation.x;
        assert!((hip_x * 2.0 - spine_z).abs() < 1e-5);
    }

    #[test]
    fn hip_handover_clears_only_the_hip_channel() {
        let (mut skeleton, roles) = setup();
        let mut layer = IdleSway::new(SwayConfig::default(), &roles);

        layer.update(0.3, &mut skeleton);
        layer.set_hips_enabled(false, &mut skeleton);

        let spine = skeleton.find("base001").unwrap();
        let hip = skeleton.find("piernal").unwrap();
        assert_eq!(skeleton.bone(hip).local.rotation.x, 0.0);
        assert!(skeleton.bone(spine).local.rotation.z.abs() > 1e-4);

        // with hips handed over, updates leave the hip channel alone
        layer.update(0.3, &mut skeleton);
        assert_eq!(skeleton.bone(hip).local.rotation.x, 0.0);
    }

    #[test]
    fn disabling_restores_neutral() {
        let (mut skeleton, roles) = setup();
        let mut layer = IdleSway::new(SwayConfig::default(), &roles);

        layer.update(0.3, &mut skeleton);
        layer.set_running(false, &mut skeleton);

        let spine = skeleton.find("base001").unwrap();
        let hip = skeleton.find("piernal").unwrap();
        assert_eq!(skeleton.bone(spine).local.rotation.z, 0.0);
        assert_eq!(skeleton.bone(hip).local.rotation.x, 0.0);
    }
}
