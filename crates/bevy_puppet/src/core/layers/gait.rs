use super::LayerState;
use crate::core::config::GaitConfig;
use crate::core::skeleton::{BoneId, Role, RoleMap, Side, Skeleton};
use bevy::log::warn;
use std::f32::consts::FRAC_PI_2;

/// Walking gait: upper legs swing in exact antiphase; lower legs flex by the
/// absolute value of a quarter-phase-shifted sine so the two knees never hit
/// maximum flex together.
///
/// Owned channels: upper/lower leg rotation.x. Starts stopped; the behavior
/// machine enables it while the wander target is out of reach.
pub struct Gait {
    config: GaitConfig,
    state: LayerState,
    upper: [Option<BoneId>; 2],
    lower: [Option<BoneId>; 2],
    inert: bool,
}

const LEFT: usize = 0;
const RIGHT: usize = 1;

impl Gait {
    pub fn new(config: GaitConfig, roles: &RoleMap) -> Self {
        let upper = [
            roles.first(Role::LegUpper(Side::Left)),
            roles.first(Role::LegUpper(Side::Right)),
        ];
        let lower = [
            roles.first(Role::LegLower(Side::Left)),
            roles.first(Role::LegLower(Side::Right)),
        ];
        let inert = upper[LEFT].is_none() || upper[RIGHT].is_none();
        if inert {
            warn!("gait layer disabled: upper leg bones missing from skeleton");
        }
        Self {
            config,
            state: LayerState::default(),
            upper,
            lower,
            inert,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn set_running(&mut self, running: bool, skeleton: &mut Skeleton) {
        if self.inert {
            return;
        }
        if self.state.running && !running {
            self.restore_neutral(skeleton);
        }
        if !self.state.running && running {
            self.state.elapsed = 0.0;
        }
        self.state.running = running;
    }

    pub fn update(&mut self, dt: f32, skeleton: &mut Skeleton) {
        if !self.state.running || self.inert {
            return;
        }
        let t = self.state.advance(dt);
        let swing = (t * self.config.speed).sin() * self.config.amplitude;

        if let Some(id) = self.upper[LEFT] {
            skeleton.bone_mut(id).local.rotation.x = swing;
        }
        if let Some(id) = self.upper[RIGHT] {
            skeleton.bone_mut(id).local.rotation.x = -swing;
        }
        // Lower-leg writes are skipped without error on rigs that lack them.
        if let Some(id) = self.lower[LEFT] {
            skeleton.bone_mut(id).local.rotation.x =
                (t * self.config.speed).sin().abs() * self.config.lower_flex;
        }
        if let Some(id) = self.lower[RIGHT] {
            skeleton.bone_mut(id).local.rotation.x =
                (t * self.config.speed + FRAC_PI_2).sin().abs() * self.config.lower_flex;
        }
    }

    fn restore_neutral(&self, skeleton: &mut Skeleton) {
        for id in self.upper.iter().chain(self.lower.iter()).flatten() {
            skeleton.bone_mut(*id).local.rotation.x = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ClassifierConfig;
    use crate::core::skeleton::classify;
    use crate::core::skeleton::BoneTransform;

    fn full_legs() -> (Skeleton, RoleMap) {
        let mut b = Skeleton::builder();
        let base = b.bone("base", None, BoneTransform::default());
        b.bone("piernal", Some(base), BoneTransform::default());
        b.bone("pierna2l", Some(base), BoneTransform::default());
        b.bone("piernar", Some(base), BoneTransform::default());
        b.bone("pierna2r", Some(base), BoneTransform::default());
        let skeleton = b.build();
        let roles = classify::bind(&skeleton, &ClassifierConfig::default());
        (skeleton, roles)
    }

    #[test]
    fn upper_legs_swing_in_exact_antiphase() {
        let (mut skeleton, roles) = full_legs();
        let mut gait = Gait::new(GaitConfig::default(), &roles);
        gait.set_running(true, &mut skeleton);

        let left = skeleton.find("piernal").unwrap();
        let right = skeleton.find("piernar").unwrap();
        for _ in 0..50 {
            gait.update(0.037, &mut skeleton);
            let l = skeleton.bone(left).local.rotation.x;
            let r = skeleton.bone(right).local.rotation.x;
            assert!((l + r).abs() < 1e-6, "expected exact negation, got {l} and {r}");
        }
    }

    #[test]
    fn knees_never_hit_max_flex_together() {
        let (mut skeleton, roles) = full_legs();
        let config = GaitConfig::default();
        let max_flex = config.lower_flex;
        let mut gait = Gait::new(config, &roles);
        gait.set_running(true, &mut skeleton);

        let left = skeleton.find("pierna2l").unwrap();
        let right = skeleton.find("pierna2r").unwrap();
        for _ in 0..500 {
            gait.update(0.016, &mut skeleton);
            let l = skeleton.bone(left).local.rotation.x;
            let r = skeleton.bone(right).local.rotation.x;
            let near_max = |v: f32| (max_flex - v).abs() < max_flex * 0.05;
            assert!(
                !(near_max(l) && near_max(r)),
                "both knees at max flex: {l} vs {r}"
            );
        }
    }

    #[test]
    fn partial_rig_moves_upper_legs_only() {
        let mut b = Skeleton::builder();
        let base = b.bone("base", None, BoneTransform::default());
        b.bone("piernal", Some(base), BoneTransform::default());
        b.bone("piernar", Some(base), BoneTransform::default());
        let mut skeleton = b.build();
        let roles = classify::bind(&skeleton, &ClassifierConfig::default());
        let mut gait = Gait::new(GaitConfig::default(), &roles);

        gait.set_running(true, &mut skeleton);
        gait.update(0.4, &mut skeleton);

        let left = skeleton.find("piernal").unwrap();
        assert!(skeleton.bone(left).local.rotation.x.abs() > 1e-4);
    }

    #[test]
    fn disabling_restores_neutral() {
        let (mut skeleton, roles) = full_legs();
        let mut gait = Gait::new(GaitConfig::default(), &roles);
        gait.set_running(true, &mut skeleton);
        gait.update(0.4, &mut skeleton);
        gait.set_running(false, &mut skeleton);

        for name in ["piernal", "piernar", "pierna2l", "pierna2r"] {
            let id = skeleton.find(name).unwrap();
            assert_eq!(skeleton.bone(id).local.rotation.x, 0.0, "bone {name}");
        }
    }
}
