use crate::core::config::SafetyConfig;
use crate::core::skeleton::{BoneId, Role, RoleMap, Side, Skeleton};
use bevy::math::Vec3;

/// Post-layer bone safety: clamps limb bones into a rectangular safe zone
/// and eases them toward it instead of snapping, so runaway drift from
/// layered sway corrects gradually. Runs once per frame after all layers
/// have written their transforms and before matrix propagation.
pub struct BoneSafety {
    config: SafetyConfig,
    targets: Vec<BoneId>,
}

impl BoneSafety {
    pub fn new(config: SafetyConfig, roles: &RoleMap) -> Self {
        let mut targets = Vec::new();
        for role in [
            Role::LegUpper(Side::Left),
            Role::LegLower(Side::Left),
            Role::LegUpper(Side::Right),
            Role::LegLower(Side::Right),
        ] {
            targets.extend_from_slice(roles.bones(role));
        }
        Self { config, targets }
    }

    pub fn apply(&self, skeleton: &mut Skeleton) {
        for &id in &self.targets {
            let raw = skeleton.bone(id).local.position;
            skeleton.bone_mut(id).local.position = self.constrain(raw);
        }
    }

    /// Clamp a position into the slackened safe zone, then blend the clamped
    /// value with the raw one so the correction is gradual. NaN components
    /// are treated as zero and never propagated back into the bone tree.
    pub fn constrain(&self, position: Vec3) -> Vec3 {
        let raw = sanitize(position);
        let safe_x = self.config.body_width / 2.0 * self.config.zone_slack;
        let safe_y = self.config.max_displacement * self.config.zone_slack;
        let k = self.config.smoothing_factor;

        let clamped_x = raw.x.clamp(-safe_x, safe_x);
        let clamped_y = raw.y.clamp(-safe_y, safe_y);

        Vec3::new(
            raw.x * (1.0 - k) + clamped_x * k,
            raw.y * (1.0 - k) + clamped_y * k,
            raw.z,
        )
    }
}

fn sanitize(v: Vec3) -> Vec3 {
    Vec3::new(finite_or_zero(v.x), finite_or_zero(v.y), finite_or_zero(v.z))
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}
