use super::LayerState;
use crate::core::config::HeadLookConfig;
use crate::core::skeleton::{BoneId, Role, RoleMap, Skeleton};
use bevy::log::warn;
use bevy::math::Vec2;

/// Head look-at: head bones turn toward the latest normalized cursor sample,
/// mapped to bounded pitch/yaw/roll. Not a sinusoid — driven directly by the
/// input, clamped to the configured deflection ranges. Nose and forehead
/// landmark bones track the same target at reduced intensity.
///
/// Owned channels: head rotation.x/.y/.z, landmark rotation.x/.y.
pub struct HeadLook {
    config: HeadLookConfig,
    state: LayerState,
    heads: Vec<BoneId>,
    noses: Vec<BoneId>,
    foreheads: Vec<BoneId>,
}

impl HeadLook {
    pub fn new(config: HeadLookConfig, roles: &RoleMap) -> Self {
        let heads = roles.bones(Role::HeadMain).to_vec();
        if heads.is_empty() {
            warn!("head look-at layer disabled: no head bone in skeleton");
        }
        Self {
            config,
            state: LayerState::running(),
            heads,
            noses: roles.bones(Role::NoseCandidate).to_vec(),
            foreheads: roles.bones(Role::ForeheadCandidate).to_vec(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn set_running(&mut self, running: bool, skeleton: &mut Skeleton) {
        if self.state.running && !running {
            self.restore_neutral(skeleton);
        }
        self.state.running = running;
    }

    /// `cursor` is the latest normalized (−1..1) input sample.
    pub fn update(&mut self, cursor: Vec2, skeleton: &mut Skeleton) {
        if !self.state.running {
            return;
        }
        let pitch = (cursor.y * self.config.pitch_range)
            .clamp(-self.config.pitch_range, self.config.pitch_range);
        let yaw = (cursor.x * self.config.yaw_range)
            .clamp(-self.config.yaw_range, self.config.yaw_range);
        let roll = (cursor.x * self.config.roll_range)
            .clamp(-self.config.roll_range, self.config.roll_range);

        for &id in &self.heads {
            let bone = skeleton.bone_mut(id);
            bone.local.rotation.x = pitch;
            bone.local.rotation.y = yaw;
            bone.local.rotation.z = roll;
        }

        let intensity = self.config.landmark_intensity;
        for &id in &self.noses {
            let bone = skeleton.bone_mut(id);
            bone.local.rotation.x = cursor.y * intensity;
            bone.local.rotation.y = cursor.x * intensity;
        }
        for &id in &self.foreheads {
            let bone = skeleton.bone_mut(id);
            bone.local.rotation.x = cursor.y * intensity * 0.5;
            bone.local.rotation.y = cursor.x * intensity * 0.5;
        }
    }

    fn restore_neutral(&self, skeleton: &mut Skeleton) {
        for &id in &self.heads {
            skeleton.bone_mut(id).local.rotation = bevy::math::Vec3::ZERO;
        }
        for &id in self.noses.iter().chain(self.foreheads.iter()) {
            let bone = skeleton.bone_mut(id);
            bone.local.rotation.x = 0.0;
            bone.local.rotation.y = 0.0;
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
    use std::f32::consts::{FRAC_PI_3, FRAC_PI_4};

    fn setup() -> (Skeleton, RoleMap) {
        let mut b = Skeleton::builder();
        let head = b.bone("head", None, BoneTransform::default());
        b.bone(
            "nose_tip",
            Some(head),
            BoneTransform::from_position(Vec3::new(0.1, 7.0, 2.0)),
        );
        let skeleton = b.build();
        let roles = classify::bind(&skeleton, &ClassifierConfig::default());
        (skeleton, roles)
    }

    #[test]
    fn head_follows_the_cursor_within_bounds() {
        let (mut skeleton, roles) = setup();
        let mut layer = HeadLook::new(HeadLookConfig::default(), &roles);

        layer.update(Vec2::new(1.0, -1.0), &mut skeleton);
        let head = skeleton.find("head").unwrap();
        let rotation = skeleton.bone(head).local.rotation;
        assert!((rotation.x + FRAC_PI_4).abs() < 1e-5);
        assert!((rotation.y - FRAC_PI_3).abs() < 1e-5);
        assert!(rotation.z > 0.0);
    }

    #[test]
    fn landmarks_track_at_reduced_intensity() {
        let (mut skeleton, roles) = setup();
        let mut layer = HeadLook::new(HeadLookConfig::default(), &roles);

        layer.update(Vec2::new(0.5, 0.5), &mut skeleton);
        let nose = skeleton.find("nose_tip").unwrap();
        let rotation = skeleton.bone(nose).local.rotation;
        assert!((rotation.x - 0.1).abs() < 1e-5);
        assert!((rotation.y - 0.1).abs() < 1e-5);
    }

    #[test]
    fn disabling_restores_neutral() {
        let (mut skeleton, roles) = setup();
        let mut layer = HeadLook::new(HeadLookConfig::default(), &roles);

        layer.update(Vec2::new(1.0, 1.0), &mut skeleton);
        layer.set_running(false, &mut skeleton);

        let head = skeleton.find("head").unwrap();
        assert_eq!(skeleton.bone(head).local.rotation, Vec3::ZERO);
        let nose = skeleton.find("nose_tip").unwrap();
        assert_eq!(skeleton.bone(nose).local.rotation.x, 0.0);
    }
}
