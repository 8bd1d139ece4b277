use crate::core::clip::{Clip, ClipLibrary, LoopMode};
use crate::core::config::ClipConfig;
use crate::core::errors::{PuppetError, PuppetResult};
use crate::core::skeleton::Skeleton;
use bevy::math::Vec3;
use bevy::platform::collections::HashMap;

/// Options for [`ClipBlendController::play`].
#[derive(Clone, Copy, Debug)]
pub struct PlayOptions {
    /// Cross-fade length in seconds; `None` uses the configured default.
    pub duration: Option<f32>,
    pub loop_mode: LoopMode,
    /// Playback speed multiplier.
    pub time_scale: f32,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            duration: None,
            loop_mode: LoopMode::default(),
            time_scale: 1.0,
        }
    }
}

impl PlayOptions {
    pub fn once() -> Self {
        Self {
            loop_mode: LoopMode::Once,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug)]
struct Action {
    name: String,
    time: f32,
    loop_mode: LoopMode,
    time_scale: f32,
    finished: bool,
}

impl Action {
    fn new(name: &str, options: PlayOptions) -> Self {
        Self {
            name: name.to_string(),
            time: 0.0,
            loop_mode: options.loop_mode,
            time_scale: if options.time_scale.is_finite() && options.time_scale > 0.0 {
                options.time_scale
            } else {
                1.0
            },
            finished: false,
        }
    }

    fn advance(&mut self, dt: f32, library: &ClipLibrary) {
        self.time += dt * self.time_scale;
        if self.loop_mode == LoopMode::Once {
            if let Some(clip) = library.get(&self.name) {
                if self.time >= clip.duration() {
                    self.time = clip.duration();
                    self.finished = true;
                }
            }
        }
    }
}

/// Manages discrete pre-authored clips on top of the procedural layers.
///
/// Holds at most one *current* action; a newly requested action cross-fades
/// in over a timed interval while the outgoing one fades out (linear
/// weights). A finished one-shot action clamps at its final frame, then
/// releases its influence back to the underlying pose over the configured
/// fade-back interval. At any settled point at most one action is
/// authoritative.
#[derive(Clone, Debug, Default)]
pub struct ClipBlendController {
    config: ClipConfig,
    current: Option<Action>,
    incoming: Option<Action>,
    fade_elapsed: f32,
    fade_duration: f32,
    fade_back: Option<f32>,
    /// Clips whose influence fully ended this tick; their touched channels
    /// snap back to the rest pose on the next apply.
    pending_restore: Vec<String>,
}

impl ClipBlendController {
    pub fn new(config: ClipConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn current_clip(&self) -> Option<&str> {
        self.current.as_ref().map(|a| a.name.as_str())
    }

    /// Start (or cross-fade to) the named clip. Unknown names are reported
    /// and mutate nothing.
    pub fn play(
        &mut self,
        library: &ClipLibrary,
        name: &str,
        options: PlayOptions,
    ) -> PuppetResult<()> {
        if !library.contains(name) {
            return Err(PuppetError::UnknownClip(name.to_string()));
        }

        let action = Action::new(name, options);
        match (&mut self.current, &mut self.incoming) {
            (None, _) => {
                self.current = Some(action);
                self.fade_back = None;
            }
            (Some(current), None) if current.name == name && self.fade_back.is_none() => {
                // replaying the active gesture restarts it in place
                *current = action;
            }
            (_, Some(incoming)) if incoming.name == name => {
                let elapsed = incoming.time;
                *incoming = action;
                incoming.time = elapsed;
            }
            _ => {
                self.incoming = Some(action);
                self.fade_elapsed = 0.0;
                self.fade_duration = options
                    .duration
                    .unwrap_or(self.config.default_fade)
                    .max(f32::EPSILON);
            }
        }
        Ok(())
    }

    /// Advance action clocks and fades by `dt` seconds.
    pub fn advance(&mut self, dt: f32, library: &ClipLibrary) {
        if let Some(fade_back) = &mut self.fade_back {
            *fade_back += dt;
            if *fade_back >= self.config.fade_back {
                if let Some(finished) = self.current.take() {
                    self.pending_restore.push(finished.name);
                }
                self.fade_back = None;
            }
        }

        if let Some(current) = &mut self.current {
            current.advance(dt, library);
        }
        if let Some(incoming) = &mut self.incoming {
            incoming.advance(dt, library);

            self.fade_elapsed += dt;
            if self.fade_elapsed >= self.fade_duration {
                if let Some(outgoing) = self.current.take() {
                    self.pending_restore.push(outgoing.name);
                }
                self.current = self.incoming.take();
                self.fade_back = None;
            }
        }

        // a finished one-shot starts releasing its influence next tick
        if self.incoming.is_none() {
            if let Some(current) = &self.current {
                if current.finished && self.fade_back.is_none() {
                    self.fade_back = Some(0.0);
                }
            }
        }
    }

    /// Blend weight of the named clip at this instant.
    pub fn weight_of(&self, name: &str) -> f32 {
        let fade_in = if self.incoming.is_some() {
            (self.fade_elapsed / self.fade_duration).clamp(0.0, 1.0)
        } else {
            0.0
        };

        if let Some(incoming) = &self.incoming {
            if incoming.name == name {
                return fade_in;
            }
        }
        if let Some(current) = &self.current {
            if current.name == name {
                let mut weight = 1.0 - fade_in;
                if let Some(fade_back) = self.fade_back {
                    weight *= 1.0 - (fade_back / self.config.fade_back).clamp(0.0, 1.0);
                }
                return weight;
            }
        }
        0.0
    }

    /// Sample the active actions and blend their channels into the skeleton,
    /// weighted against whatever the procedural layers already wrote. Bones
    /// whose clip influence ended since the last apply snap their touched
    /// channels back to the rest pose first.
    pub fn apply(&mut self, library: &ClipLibrary, skeleton: &mut Skeleton) {
        for name in std::mem::take(&mut self.pending_restore) {
            let Some(clip) = library.get(&name) else {
                continue;
            };
            for track in clip.tracks() {
                let Some(id) = skeleton.find(&track.target) else {
                    continue;
                };
                let rest = *skeleton.bone(id).rest();
                let bone = skeleton.bone_mut(id);
                if track.rotation.is_some() {
                    bone.local.rotation = rest.rotation;
                    bone.local.rotation_order = rest.rotation_order;
                }
                if track.translation.is_some() {
                    bone.local.position = rest.position;
                }
                if track.scale.is_some() {
                    bone.local.scale = rest.scale;
                }
            }
        }

        struct ChannelMix {
            sum: Vec3,
            weight: f32,
        }
        impl ChannelMix {
            fn add(&mut self, value: Vec3, weight: f32) {
                self.sum += value * weight;
                self.weight += weight;
            }
        }
        #[derive(Default)]
        struct BoneMix {
            rotation: Option<ChannelMix>,
            translation: Option<ChannelMix>,
            scale: Option<ChannelMix>,
            rotation_order: Option<crate::core::skeleton::RotationOrder>,
        }

        let mut mixes: HashMap<String, BoneMix> = HashMap::default();
        let mut accumulate = |clip: &Clip, action: &Action, weight: f32| {
            let time = clip.wrap_time(action.time, action.loop_mode);
            for track in clip.tracks() {
                let mix = mixes.entry(track.target.clone()).or_default();
                if let Some(channel) = &track.rotation {
                    mix.rotation
                        .get_or_insert(ChannelMix { sum: Vec3::ZERO, weight: 0.0 })
                        .add(channel.sample(time), weight);
                    mix.rotation_order = Some(track.rotation_order);
                }
                if let Some(channel) = &track.translation {
                    mix.translation
                        .get_or_insert(ChannelMix { sum: Vec3::ZERO, weight: 0.0 })
                        .add(channel.sample(time), weight);
                }
                if let Some(channel) = &track.scale {
                    mix.scale
                        .get_or_insert(ChannelMix { sum: Vec3::ZERO, weight: 0.0 })
                        .add(channel.sample(time), weight);
                }
            }
        };

        for action in [&self.current, &self.incoming].into_iter().flatten() {
            let weight = self.weight_of(&action.name);
            if weight <= 0.0 {
                continue;
            }
            let Some(clip) = library.get(&action.name) else {
                continue;
            };
            accumulate(clip, action, weight);
        }

        for (target, mix) in mixes {
            let Some(id) = skeleton.find(&target) else {
                continue;
            };
            let bone = skeleton.bone_mut(id);
            if let Some(channel) = mix.rotation {
                bone.local.rotation =
                    bone.local.rotation * (1.0 - channel.weight.min(1.0)) + channel.sum;
                if let Some(order) = mix.rotation_order {
                    bone.local.rotation_order = order;
                }
            }
            if let Some(channel) = mix.translation {
                bone.local.position =
                    bone.local.position * (1.0 - channel.weight.min(1.0)) + channel.sum;
            }
            if let Some(channel) = mix.scale {
                bone.local.scale =
                    bone.local.scale * (1.0 - channel.weight.min(1.0)) + channel.sum;
            }
        }
    }

    /// Drop all actions immediately, without fades. Touched channels return
    /// to rest on the next apply.
    pub fn clear(&mut self) {
        if let Some(current) = self.current.take() {
            self.pending_restore.push(current.name);
        }
        if let Some(incoming) = self.incoming.take() {
            self.pending_restore.push(incoming.name);
        }
        self.fade_back = None;
        self.fade_elapsed = 0.0;
    }
}
