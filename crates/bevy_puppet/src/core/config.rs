use crate::core::errors::{PuppetError, PuppetResult};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_3, FRAC_PI_4, FRAC_PI_6, PI};

/// Engine configuration. Every field is enumerated with an explicit default;
/// there is no partial-override merging. Loadable from RON via
/// [`PuppetConfig::from_ron_str`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PuppetConfig {
    pub breathing: BreathingConfig,
    pub sway: SwayConfig,
    pub gait: GaitConfig,
    pub arm_sway: ArmSwayConfig,
    pub horn_sway: HornSwayConfig,
    pub head_look: HeadLookConfig,
    pub eyes: EyeConfig,
    pub wander: WanderConfig,
    pub safety: SafetyConfig,
    pub clips: ClipConfig,
    pub classifier: ClassifierConfig,
    /// Layer-clock multiplier while in the thinking behavior.
    pub thinking_time_scale: f32,
    /// Seconds spent in the greeting behavior before returning to idle.
    pub greeting_delay: f32,
    /// Seed for the wander target generator; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for PuppetConfig {
    fn default() -> Self {
        Self {
            breathing: BreathingConfig::default(),
            sway: SwayConfig::default(),
            gait: GaitConfig::default(),
            arm_sway: ArmSwayConfig::default(),
            horn_sway: HornSwayConfig::default(),
            head_look: HeadLookConfig::default(),
            eyes: EyeConfig::default(),
            wander: WanderConfig::default(),
            safety: SafetyConfig::default(),
            clips: ClipConfig::default(),
            classifier: ClassifierConfig::default(),
            thinking_time_scale: 0.5,
            greeting_delay: 1.0,
            seed: None,
        }
    }
}

impl PuppetConfig {
    pub fn from_ron_str(source: &str) -> PuppetResult<Self> {
        ron::from_str(source).map_err(|e| PuppetError::ConfigParse(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathingConfig {
    /// Vertical travel of the root bone, in model units.
    pub intensity: f32,
    /// Angular frequency of the breath sinusoid, radians/second.
    pub speed: f32,
    /// Peak scale gain on chest-role bones.
    pub chest_scale_amplitude: f32,
    /// Length of one chest scale cycle, seconds.
    pub chest_cycle: f32,
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            intensity: 0.03,
            speed: 1.5,
            chest_scale_amplitude: 0.05,
            chest_cycle: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwayConfig {
    /// Length of one sway cycle, seconds. Deliberately independent of the
    /// breathing clock so the two layers run out of phase.
    pub cycle: f32,
    /// Peak spine roll, radians.
    pub spine_amplitude: f32,
    /// Peak hip pitch, radians.
    pub hip_amplitude: f32,
}

impl Default for SwayConfig {
    fn default() -> Self {
        Self {
            cycle: 2.0,
            spine_amplitude: PI / 16.0,
            hip_amplitude: PI / 32.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitConfig {
    /// Peak upper-leg swing, radians.
    pub amplitude: f32,
    /// Angular frequency of the stride, radians/second.
    pub speed: f32,
    /// Peak lower-leg flex, radians.
    pub lower_flex: f32,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.1,
            speed: 1.5,
            lower_flex: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmSwayConfig {
    /// Peak upper-arm swing, radians.
    pub amplitude: f32,
    /// Angular frequency of the swing, radians/second.
    pub speed: f32,
    /// Peak forearm flex, radians.
    pub forearm_flex: f32,
}

impl Default for ArmSwayConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.05,
            speed: 1.5,
            forearm_flex: 0.03,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HornSwayConfig {
    /// Splayed-out resting angle of the horn bases, radians. The left horn
    /// rests at the negated angle.
    pub rest_angle: f32,
    /// Peak oscillation around the rest angle, radians.
    pub amplitude: f32,
    /// Angular frequency of the oscillation, radians/second.
    pub speed: f32,
}

impl Default for HornSwayConfig {
    fn default() -> Self {
        Self {
            rest_angle: FRAC_PI_3,
            amplitude: 0.05,
            speed: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadLookConfig {
    /// Maximum head pitch for a full-deflection cursor, radians.
    pub pitch_range: f32,
    /// Maximum head yaw for a full-deflection cursor, radians.
    pub yaw_range: f32,
    /// Maximum head roll for a full-deflection cursor, radians.
    pub roll_range: f32,
    /// Rotation gain on nose-landmark bones; forehead landmarks use half.
    pub landmark_intensity: f32,
}

impl Default for HeadLookConfig {
    fn default() -> Self {
        Self {
            pitch_range: FRAC_PI_4,
            yaw_range: FRAC_PI_3,
            roll_range: PI / 12.0,
            landmark_intensity: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeConfig {
    /// Hard bound on eye deflection, radians. Targets are clamped to this
    /// before smoothing so a saccade overshoot cannot feed back into the
    /// filter.
    pub max_eye_movement: f32,
    /// Per-tick exponential smoothing factor in (0, 1].
    pub smoothing_factor: f32,
    /// Seconds between blinks.
    pub blink_interval: f32,
    /// Seconds the lids stay closed.
    pub blink_duration: f32,
    /// Vertical eye scale while closed.
    pub closed_scale: f32,
}

impl Default for EyeConfig {
    fn default() -> Self {
        Self {
            max_eye_movement: FRAC_PI_6,
            smoothing_factor: 0.2,
            blink_interval: 5.0,
            blink_duration: 0.1,
            closed_scale: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    /// Radius of the disk around the origin that targets are drawn from.
    pub radius: f32,
    /// Movement speed, model units/second.
    pub move_speed: f32,
    /// Distance at which a target counts as reached.
    pub arrival_epsilon: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            move_speed: 1.2,
            arrival_epsilon: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Half-height of the safe zone, model units.
    pub max_displacement: f32,
    /// Body width; half of it is the safe zone's half-width.
    pub body_width: f32,
    /// Per-tick blend factor toward the clamped position.
    pub smoothing_factor: f32,
    /// Safe zone slack multiplier.
    pub zone_slack: f32,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            max_displacement: 1.2,
            body_width: 1.8,
            smoothing_factor: 0.15,
            zone_slack: 1.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Cross-fade length when `play` does not specify one, seconds.
    pub default_fade: f32,
    /// Seconds over which a finished one-shot clip releases its influence.
    pub fade_back: f32,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            default_fade: 0.3,
            fade_back: 0.5,
        }
    }
}

/// Criteria for one facial-landmark role, combined into a confidence score:
/// keyword match 0.4, height-in-range 0.3, depth-in-range 0.2, and (when
/// `lateral_max` is set) lateral-offset-in-bound 0.1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkCriteria {
    pub keywords: Vec<String>,
    pub height_min: f32,
    pub height_max: f32,
    pub depth_min: f32,
    pub depth_max: f32,
    pub lateral_max: Option<f32>,
    /// Minimum confidence score for the role to be assigned.
    pub threshold: f32,
    /// Lowercase names that can never hold this role.
    pub exclude_names: Vec<String>,
}

impl Default for LandmarkCriteria {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            height_min: 0.0,
            height_max: 0.0,
            depth_min: 0.0,
            depth_max: 0.0,
            lateral_max: None,
            threshold: 1.0,
            exclude_names: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub nose: LandmarkCriteria,
    pub forehead: LandmarkCriteria,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            nose: LandmarkCriteria {
                keywords: [
                    "nose",
                    "nariz",
                    "naris",
                    "punta_nariz",
                    "nose_tip",
                    "centro_nariz",
                    "nose_center",
                    "puente_nariz",
                    "nose_bridge",
                    "nariz_punta",
                    "nariz_centro",
                    "bone001",
                    "nose_bone",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                height_min: 6.5,
                height_max: 8.0,
                depth_min: 1.5,
                depth_max: 3.0,
                lateral_max: Some(0.5),
                threshold: 0.7,
                exclude_names: Vec::new(),
            },
            forehead: LandmarkCriteria {
                keywords: [
                    "forehead",
                    "frente",
                    "brow",
                    "brow_bone",
                    "hueso_frente",
                    "parte_superior_cabeza",
                    "top_head",
                    "frontal",
                    "frontal_bone",
                    "cabeza_superior",
                    "head_top",
                    "head",
                    "cabeza",
                    "bone",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                height_min: 5.5,
                height_max: 7.0,
                depth_min: 1.0,
                depth_max: 2.5,
                lateral_max: None,
                threshold: 0.6,
                exclude_names: vec!["bone001".to_string()],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PuppetConfig::default();
        assert_eq!(config.breathing.intensity, 0.03);
        assert_eq!(config.wander.radius, 5.0);
        assert_eq!(config.eyes.blink_interval, 5.0);
        assert_eq!(config.classifier.nose.threshold, 0.7);
        assert_eq!(config.classifier.forehead.exclude_names, vec!["bone001"]);
        assert_eq!(config.greeting_delay, 1.0);
    }

    #[test]
    fn partial_ron_falls_back_to_defaults() {
        let config = PuppetConfig::from_ron_str("(wander: (radius: 2.5))").unwrap();
        assert_eq!(config.wander.radius, 2.5);
        // untouched sections keep their defaults
        assert_eq!(config.wander.move_speed, 1.2);
        assert_eq!(config.gait.amplitude, 0.1);
    }

    #[test]
    fn malformed_ron_is_reported() {
        let err = PuppetConfig::from_ron_str("(wander: (radius: oops))").unwrap_err();
        assert!(matches!(err, PuppetError::ConfigParse(_)));
    }
}
