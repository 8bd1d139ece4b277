use crate::core::skeleton::RotationOrder;
use crate::interpolation::InterpolateLinear;
use bevy::math::Vec3;
use bevy::platform::collections::HashMap;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Loop mode of a clip action.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum LoopMode {
    #[default]
    Repeat,
    /// Play once and clamp the pose at the final frame instead of resetting.
    Once,
}

/// One keyframed channel: times are strictly increasing, values are Euler
/// angles / positions / scales sampled with linear interpolation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Channel {
    pub times: Vec<f32>,
    pub values: Vec<Vec3>,
}

impl Channel {
    pub fn sample(&self, time: f32) -> Vec3 {
        debug_assert_eq!(self.times.len(), self.values.len());
        if self.times.is_empty() {
            return Vec3::ZERO;
        }
        if time <= self.times[0] {
            return self.values[0];
        }
        let last = self.times.len() - 1;
        if time >= self.times[last] {
            return self.values[last];
        }
        let next = self.times.partition_point(|&t| t <= time);
        let prev = next - 1;
        let span = self.times[next] - self.times[prev];
        let f = if span > 0.0 {
            (time - self.times[prev]) / span
        } else {
            0.0
        };
        self.values[prev].interpolate_linear(&self.values[next], f)
    }
}

/// Keyframe tracks for one target bone, addressed by lowercase bone name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoneTrack {
    pub target: String,
    pub rotation: Option<Channel>,
    pub translation: Option<Channel>,
    pub scale: Option<Channel>,
    pub rotation_order: RotationOrder,
}

impl BoneTrack {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into().to_lowercase(),
            rotation: None,
            translation: None,
            scale: None,
            rotation_order: RotationOrder::default(),
        }
    }
}

/// A pre-authored keyframe animation, played and blended as a unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Clip {
    name: String,
    duration: f32,
    tracks: Vec<BoneTrack>,
}

impl Clip {
    pub fn new(name: impl Into<String>, duration: f32, tracks: Vec<BoneTrack>) -> Self {
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Duration of the clip in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }

    /// Map a running action time onto the clip timeline for the given loop
    /// mode: `Repeat` wraps, `Once` clamps at the final frame.
    pub fn wrap_time(&self, time: f32, loop_mode: LoopMode) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        match loop_mode {
            LoopMode::Repeat => time.rem_euclid(self.duration),
            LoopMode::Once => time.clamp(0.0, self.duration),
        }
    }
}

/// Clip registry for one model. Actions are resolved by name; registering a
/// clip under an existing name replaces it.
#[derive(Clone, Debug, Default)]
pub struct ClipLibrary {
    clips: HashMap<String, Clip>,
}

impl ClipLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// A library pre-loaded with the built-in gesture clips (`"wave"`).
    pub fn with_builtins() -> Self {
        let mut library = Self::default();
        library.register(wave());
        library
    }

    pub fn register(&mut self, clip: Clip) {
        self.clips.insert(clip.name().to_string(), clip);
    }

    pub fn get(&self, name: &str) -> Option<&Clip> {
        self.clips.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }
}

/// The built-in right-arm wave gesture, authored as keyframes: the arm
/// raises and turns outward on a quadratic ease while the hand oscillates
/// with damped swings, and the elbow bends with a matching wiggle.
pub fn wave() -> Clip {
    const DURATION: f32 = 2.0;
    const SAMPLES: usize = 33;

    fn ease_in_out(t: f32) -> f32 {
        if t < 0.5 { 2.0 * t * t } else { -1.0 + (4.0 - 2.0 * t) * t }
    }

    let mut times = Vec::with_capacity(SAMPLES);
    let mut arm_values = Vec::with_capacity(SAMPLES);
    let mut forearm_values = Vec::with_capacity(SAMPLES);

    for i in 0..SAMPLES {
        let progress = i as f32 / (SAMPLES - 1) as f32;
        let eased = ease_in_out(progress);
        let swing = (progress * PI * 4.0).sin() * (1.0 - progress);

        times.push(progress * DURATION);
        arm_values.push(Vec3::new(
            PI * 0.3 * eased,
            PI * 0.2 * eased,
            swing * 0.3,
        ));
        forearm_values.push(Vec3::new(
            PI * 0.2 * eased,
            0.0,
            (progress * PI * 4.0).sin() * 0.2,
        ));
    }

    let arm = BoneTrack {
        rotation: Some(Channel {
            times: times.clone(),
            values: arm_values,
        }),
        rotation_order: RotationOrder::Yxz,
        ..BoneTrack::new("brazor")
    };
    let forearm = BoneTrack {
        rotation: Some(Channel {
            times,
            values: forearm_values,
        }),
        ..BoneTrack::new("brazo2r")
    };

    Clip::new("wave", DURATION, vec![arm, forearm])
}
