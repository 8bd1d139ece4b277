use super::LayerState;
use crate::core::config::ArmSwayConfig;
use crate::core::skeleton::{BoneId, Role, RoleMap, RotationOrder, Side, Skeleton};
use bevy::log::warn;

/// Arm sway: upper arms pivot gently about the pitch axis while the resting
/// yaw/roll pose stays untouched; forearms add a smaller complementary flex.
///
/// Upper-arm bones are fixed to YXZ rotation order at construction so that
/// writing only the pitch component leaves the rest pose decomposition
/// valid.
///
/// Owned channels: upper-arm rotation.x, forearm rotation.x.
pub struct ArmSway {
    config: ArmSwayConfig,
    state: LayerState,
    upper: Vec<BoneId>,
    lower: Vec<BoneId>,
}

impl ArmSway {
    pub fn new(config: ArmSwayConfig, roles: &RoleMap, skeleton: &mut Skeleton) -> Self {
        let mut upper = Vec::new();
        upper.extend_from_slice(roles.bones(Role::ArmUpper(Side::Left)));
        upper.extend_from_slice(roles.bones(Role::ArmUpper(Side::Right)));
        let mut lower = Vec::new();
        lower.extend_from_slice(roles.bones(Role::ArmLower(Side::Left)));
        lower.extend_from_slice(roles.bones(Role::ArmLower(Side::Right)));

        if upper.is_empty() {
            warn!("arm sway layer disabled: no upper arm bones in skeleton");
        }
        for &id in &upper {
            skeleton.bone_mut(id).local.rotation_order = RotationOrder::Yxz;
        }

        Self {
            config,
            state: LayerState::running(),
            upper,
            lower,
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
        let swing = (t * self.config.speed).sin() * self.config.amplitude;
        let flex = (t * self.config.speed).sin() * self.config.forearm_flex;

        for &id in &self.upper {
            skeleton.bone_mut(id).local.rotation.x = swing;
        }
        for &id in &self.lower {
            skeleton.bone_mut(id).local.rotation.x = flex;
        }
    }

    fn restore_neutral(&self, skeleton: &mut Skeleton) {
        for &id in self.upper.iter().chain(self.lower.iter()) {
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
    use bevy::math::Vec3;
    use std::f32::consts::FRAC_PI_2;

    fn setup() -> (Skeleton, RoleMap) {
        let mut b = Skeleton::builder();
        let base = b.bone("base", None, BoneTransform::default());
        let mut arm = BoneTransform::default();
        // arms resting along the body, as the rig's bind pose has them
        arm.rotation = Vec3::new(0.0, 0.0, FRAC_PI_2);
        b.bone("brazol", Some(base), arm);
        b.bone("brazo2l", Some(base), BoneTransform::default());
        b.bone("brazor", Some(base), arm);
        b.bone("brazo2r", Some(base), BoneTransform::default());
        let skeleton = b.build();
        let roles = classify::bind(&skeleton, &ClassifierConfig::default());
        (skeleton, roles)
    }

    #[test]
    fn swing_preserves_resting_yaw_and_roll() {
        let (mut skeleton, roles) = setup();
        let mut layer = ArmSway::new(ArmSwayConfig::default(), &roles, &mut skeleton);

        layer.update(0.5, &mut skeleton);
        let arm = skeleton.find("brazor").unwrap();
        let local = &skeleton.bone(arm).local;
        assert!(local.rotation.x.abs() > 1e-4);
        assert_eq!(local.rotation.z, FRAC_PI_2);
        assert_eq!(local.rotation.y, 0.0);
        assert_eq!(local.rotation_order, RotationOrder::Yxz);
    }

    #[test]
    fn forearm_flex_is_smaller_than_the_swing() {
        let (mut skeleton, roles) = setup();
        let mut layer = ArmSway::new(ArmSwayConfig::default(), &roles, &mut skeleton);

        layer.update(0.5, &mut skeleton);
        let arm = skeleton.find("brazol").unwrap();
        let forearm = skeleton.find("brazo2l").unwrap();
        let swing = skeleton.bone(arm).local.rotation.x.abs();
        let flex = skeleton.bone(forearm).local.rotation.x.abs();
        assert!(flex > 1e-5);
        assert!(flex < swing);
    }

    #[test]
    fn disabling_restores_neutral_pitch_only() {
        let (mut skeleton, roles) = setup();
        let mut layer = ArmSway::new(ArmSwayConfig::default(), &roles, &mut skeleton);

        layer.update(0.5, &mut skeleton);
        layer.set_running(false, &mut skeleton);

        let arm = skeleton.find("brazor").unwrap();
        assert_eq!(skeleton.bone(arm).local.rotation.x, 0.0);
        assert_eq!(skeleton.bone(arm).local.rotation.z, FRAC_PI_2);
    }
}
