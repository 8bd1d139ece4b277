use crate::core::clip::ClipLibrary;
use crate::core::clip_blend::{ClipBlendController, PlayOptions};
use crate::core::config::PuppetConfig;
use crate::core::constraints::BoneSafety;
use crate::core::errors::PuppetResult;
use crate::core::layers::LayerStack;
use crate::core::skeleton::{classify, RoleMap, Skeleton};
use crate::core::state_machine::{Behavior, BehaviorMachine};
use bevy::log::{debug, warn};
use bevy::math::{Vec2, Vec3};

/// The animation engine for one bound skeleton: role classification,
/// procedural layers, safety constraints, clip blending and behavior
/// arbitration behind a single `tick(dt)` frame driver.
///
/// The host owns the render loop; the puppet only mutates bone transforms.
/// Within one tick the order is fixed: behavior state machine, then enabled
/// procedural layers, then safety constraints, then the clip blend
/// controller — later steps read state written earlier in the same tick.
pub struct Puppet {
    config: PuppetConfig,
    skeleton: Skeleton,
    roles: RoleMap,
    layers: LayerStack,
    safety: BoneSafety,
    clips: ClipLibrary,
    blend: ClipBlendController,
    behavior: BehaviorMachine,
    cursor: Vec2,
    disposed: bool,
}

impl Puppet {
    /// Bind a skeleton: classify its bones once, build the layer stack and
    /// start the base layers and wandering.
    pub fn bind(mut skeleton: Skeleton, config: PuppetConfig) -> Self {
        let roles = classify::bind(&skeleton, &config.classifier);
        if roles.is_empty() {
            warn!("puppet bound to a skeleton with no recognizable bones; all layers inert");
        }
        let layers = LayerStack::new(&config, &roles, &mut skeleton);
        let safety = BoneSafety::new(config.safety.clone(), &roles);
        let behavior = BehaviorMachine::new(&config);
        let blend = ClipBlendController::new(config.clips.clone());
        Self {
            config,
            skeleton,
            roles,
            layers,
            safety,
            clips: ClipLibrary::with_builtins(),
            blend,
            behavior,
            cursor: Vec2::ZERO,
            disposed: false,
        }
    }

    pub fn config(&self) -> &PuppetConfig {
        &self.config
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    pub fn roles(&self) -> &RoleMap {
        &self.roles
    }

    pub fn behavior(&self) -> Behavior {
        self.behavior.behavior()
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn clips_mut(&mut self) -> &mut ClipLibrary {
        &mut self.clips
    }

    pub fn clip_weight(&self, name: &str) -> f32 {
        self.blend.weight_of(name)
    }

    /// Where the wander behavior has moved the body.
    pub fn body_position(&self) -> Vec3 {
        self.behavior.body_position()
    }

    /// Which way the body faces, toward the direction of travel.
    pub fn body_yaw(&self) -> f32 {
        self.behavior.body_yaw()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Advance one frame. Call once per host frame with the frame delta in
    /// seconds; non-finite or negative deltas are treated as zero.
    pub fn tick(&mut self, dt: f32) {
        if self.disposed {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let directives = self.behavior.update(dt);
        self.layers.gait.set_running(directives.gait, &mut self.skeleton);
        self.layers
            .sway
            .set_hips_enabled(directives.sway_hips, &mut self.skeleton);

        let scaled = dt * directives.time_scale;
        self.layers.update(scaled, self.cursor, &mut self.skeleton);

        self.safety.apply(&mut self.skeleton);

        self.blend.advance(dt, &self.clips);
        self.blend.apply(&self.clips, &mut self.skeleton);
    }

    /// Wave hello, then return to idling after the configured delay.
    pub fn play_greeting(&mut self) {
        if self.disposed {
            return;
        }
        self.behavior.trigger_greet();
        self.play_wave();
    }

    /// Conversation gesture: stop wandering and wave, base layers keep
    /// running.
    pub fn play_talk(&mut self) {
        if self.disposed {
            return;
        }
        self.behavior.trigger_talk();
        self.play_wave();
    }

    /// Resume idling (and wandering).
    pub fn play_idle(&mut self) {
        if self.disposed {
            return;
        }
        self.behavior.trigger_idle();
    }

    /// Ponder: wandering stops and layers run at reduced cadence.
    pub fn play_think(&mut self) {
        if self.disposed {
            return;
        }
        self.behavior.trigger_think();
    }

    /// Latest normalized cursor (or gaze) sample, both axes in −1..1.
    /// Non-finite components are treated as zero.
    pub fn set_cursor_target(&mut self, x: f32, y: f32) {
        if self.disposed {
            return;
        }
        let sanitize = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        self.cursor = Vec2::new(sanitize(x), sanitize(y));
    }

    /// Play a registered clip by name. Unknown names are reported and leave
    /// the controller untouched.
    pub fn play_clip(&mut self, name: &str, options: PlayOptions) -> PuppetResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.blend.play(&self.clips, name, options).inspect_err(|e| {
            warn!("{e}");
        })
    }

    fn play_wave(&mut self) {
        let _ = self.play_clip("wave", PlayOptions::once());
    }

    /// Tear down: stop every layer (restoring neutral pose), drop any clip
    /// actions and cancel timers. Idempotent; the puppet accepts no further
    /// commands afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            debug!("puppet already disposed");
            return;
        }
        self.layers.stop_all(&mut self.skeleton);
        self.blend.clear();
        // flush the rest-pose restore for any clip-touched channels
        self.blend.apply(&self.clips, &mut self.skeleton);
        self.behavior.shut_down();
        self.cursor = Vec2::ZERO;
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::skeleton::{BoneTransform, Role, Side};
    use bevy::math::Vec3;

    fn demon_rig() -> Skeleton {
        let mut b = Skeleton::builder();
        let base = b.bone("Base", None, BoneTransform::default());
        let spine = b.bone("Base001", Some(base), BoneTransform::default());
        let neck = b.bone("Cuello", Some(spine), BoneTransform::default());
        let head = b.bone("Head", Some(neck), BoneTransform::default());
        b.bone("EyeL", Some(head), BoneTransform::default());
        b.bone("EyeR", Some(head), BoneTransform::default());
        b.bone("PiernaL", Some(base), BoneTransform::default());
        b.bone("Pierna2L", Some(base), BoneTransform::default());
        b.bone("PiernaR", Some(base), BoneTransform::default());
        b.bone("Pierna2R", Some(base), BoneTransform::default());
        b.bone("BrazoL", Some(spine), BoneTransform::default());
        b.bone("Brazo2L", Some(spine), BoneTransform::default());
        b.bone("BrazoR", Some(spine), BoneTransform::default());
        b.bone("Brazo2R", Some(spine), BoneTransform::default());
        b.build()
    }

    fn seeded_config() -> PuppetConfig {
        PuppetConfig {
            seed: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn tick_animates_the_bound_skeleton() {
        let mut puppet = Puppet::bind(demon_rig(), seeded_config());
        for _ in 0..10 {
            puppet.tick(0.05);
        }
        let base = puppet.skeleton().find("base").unwrap();
        assert!(puppet.skeleton().bone(base).local.rotation.z.abs() > 1e-5);
    }

    #[test]
    fn wandering_walks_and_talking_stops() {
        let mut puppet = Puppet::bind(demon_rig(), seeded_config());
        puppet.tick(0.016);
        puppet.tick(0.016);
        assert!(matches!(
            puppet.behavior(),
            Behavior::Wandering { walking: true }
        ));
        assert!(puppet.layers().gait.is_running());

        puppet.play_talk();
        puppet.tick(0.016);
        assert_eq!(puppet.behavior(), Behavior::Talking);
        assert!(!puppet.layers().gait.is_running());
        assert!(puppet.clip_weight("wave") > 0.0);
    }

    #[test]
    fn greeting_waves_then_returns_to_idle() {
        let mut puppet = Puppet::bind(demon_rig(), seeded_config());
        puppet.play_greeting();
        puppet.tick(0.5);
        assert!(matches!(puppet.behavior(), Behavior::Greeting { .. }));
        assert!(puppet.clip_weight("wave") > 0.0);

        puppet.tick(0.6);
        puppet.tick(0.016);
        assert!(matches!(puppet.behavior(), Behavior::Wandering { .. }));
    }

    #[test]
    fn unknown_clip_is_nonfatal() {
        let mut puppet = Puppet::bind(demon_rig(), seeded_config());
        let result = puppet.play_clip("moonwalk", PlayOptions::default());
        assert!(result.is_err());
        puppet.tick(0.016);
    }

    #[test]
    fn cursor_input_drives_the_head_and_eyes() {
        let mut puppet = Puppet::bind(demon_rig(), seeded_config());
        puppet.set_cursor_target(1.0, 0.5);
        for _ in 0..30 {
            puppet.tick(0.016);
        }
        let head = puppet.skeleton().find("head").unwrap();
        let eye = puppet.skeleton().find("eyel").unwrap();
        assert!(puppet.skeleton().bone(head).local.rotation.y > 0.1);
        assert!(puppet.skeleton().bone(eye).local.rotation.y > 0.01);
    }

    #[test]
    fn nan_cursor_input_is_scrubbed() {
        let mut puppet = Puppet::bind(demon_rig(), seeded_config());
        puppet.set_cursor_target(f32::NAN, f32::INFINITY);
        puppet.tick(0.016);
        let head = puppet.skeleton().find("head").unwrap();
        assert!(puppet.skeleton().bone(head).local.rotation.y.abs() < 1e-6);
    }

    #[test]
    fn dispose_restores_neutral_and_is_idempotent() {
        let mut puppet = Puppet::bind(demon_rig(), seeded_config());
        puppet.set_cursor_target(1.0, 1.0);
        for _ in 0..20 {
            puppet.tick(0.05);
        }
        puppet.dispose();

        for name in ["base001", "head", "piernal", "brazor"] {
            let id = puppet.skeleton().find(name).unwrap();
            assert_eq!(
                puppet.skeleton().bone(id).local.rotation,
                Vec3::ZERO,
                "bone {name}"
            );
        }

        // disposed puppets ignore everything, including a second dispose
        puppet.dispose();
        puppet.play_talk();
        puppet.tick(0.05);
        assert_eq!(puppet.behavior(), Behavior::Disposed);
        assert_eq!(puppet.clip_weight("wave"), 0.0);
    }

    #[test]
    fn partial_rig_still_walks_on_upper_legs() {
        let mut b = Skeleton::builder();
        b.bone("base", None, BoneTransform::default());
        b.bone("piernal", None, BoneTransform::default());
        b.bone("piernar", None, BoneTransform::default());
        let mut puppet = Puppet::bind(b.build(), seeded_config());

        assert!(puppet.roles().has(Role::LegUpper(Side::Left)));
        assert!(!puppet.roles().has(Role::LegLower(Side::Left)));

        let leg = puppet.skeleton().find("piernal").unwrap();
        let mut walked = false;
        for _ in 0..50 {
            puppet.tick(0.05);
            if matches!(puppet.behavior(), Behavior::Wandering { walking: true })
                && puppet.skeleton().bone(leg).local.rotation.x.abs() > 1e-6
            {
                walked = true;
                break;
            }
        }
        assert!(walked, "gait never engaged on the partial rig");
    }

    #[test]
    fn malformed_dt_is_treated_as_zero() {
        let mut puppet = Puppet::bind(demon_rig(), seeded_config());
        puppet.tick(f32::NAN);
        puppet.tick(-5.0);
        let base = puppet.skeleton().find("base").unwrap();
        assert!(puppet.skeleton().bone(base).local.position.y.is_finite());
    }
}
