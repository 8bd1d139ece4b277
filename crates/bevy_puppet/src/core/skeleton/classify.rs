use super::roles::{Role, RoleMap, Side};
use super::skeleton::Skeleton;
use crate::core::config::{ClassifierConfig, LandmarkCriteria};
use bevy::log::debug;
use bevy::math::Vec3;

/// Name predicate of one classification rule.
#[derive(Clone, Copy, Debug)]
pub enum NamePredicate {
    /// The whole lowercased name equals one of the candidates.
    Exact(&'static [&'static str]),
    /// The lowercased name contains one of the candidates.
    Contains(&'static [&'static str]),
    /// Limb-style match: the name contains one of `stems`, a marker decides
    /// the segment (upper/base vs. lower/tip), and a trailing `l`/`r` or an
    /// embedded `left`/`right` decides the side.
    Segmented {
        stems: &'static [&'static str],
        second_markers: &'static [&'static str],
        second: bool,
        side: Side,
    },
}

impl NamePredicate {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePredicate::Exact(candidates) => candidates.contains(&name),
            NamePredicate::Contains(candidates) => candidates.iter().any(|c| name.contains(c)),
            NamePredicate::Segmented {
                stems,
                second_markers,
                second,
                side,
            } => {
                stems.iter().any(|s| name.contains(s))
                    && second_markers.iter().any(|m| name.contains(m)) == *second
                    && side_of(name) == Some(*side)
            }
        }
    }
}

fn side_of(name: &str) -> Option<Side> {
    if name.contains("left") || name.ends_with('l') || name.contains("_l") {
        Some(Side::Left)
    } else if name.contains("right") || name.ends_with('r') || name.contains("_r") {
        Some(Side::Right)
    } else {
        None
    }
}

/// One entry of the classification rule table.
#[derive(Clone, Copy, Debug)]
pub struct RoleRule {
    pub role: Role,
    pub predicate: NamePredicate,
    /// Evaluation order; lower runs first. Multiple rules may match one
    /// bone, and the bone then holds all of the matched roles.
    pub priority: u8,
}

const LEG_STEMS: &[&str] = &["pierna", "leg"];
const ARM_STEMS: &[&str] = &["brazo", "arm"];
const HORN_STEMS: &[&str] = &["cuerno", "horn"];
const EYE_STEMS: &[&str] = &["eye", "ojo", "pupil", "iris"];
const SEGMENT_MARKERS: &[&str] = &["2", "lower", "fore"];

/// The fixed rule table, in priority order: exact primary-skeleton rules
/// first, then limb/horn/eye rules, then the broad torso keyword rules.
pub fn rule_table() -> &'static [RoleRule] {
    use NamePredicate::*;
    use Role::*;
    const TABLE: &[RoleRule] = &[
        RoleRule { role: Root, predicate: Exact(&["base", "root"]), priority: 0 },
        RoleRule { role: Spine, predicate: Exact(&["base001", "cuello"]), priority: 1 },
        RoleRule { role: HeadMain, predicate: Exact(&["head", "cabeza"]), priority: 2 },
        RoleRule {
            role: LegUpper(Side::Left),
            predicate: Segmented { stems: LEG_STEMS, second_markers: SEGMENT_MARKERS, second: false, side: Side::Left },
            priority: 3,
        },
        RoleRule {
            role: LegUpper(Side::Right),
            predicate: Segmented { stems: LEG_STEMS, second_markers: SEGMENT_MARKERS, second: false, side: Side::Right },
            priority: 3,
        },
        RoleRule {
            role: LegLower(Side::Left),
            predicate: Segmented { stems: LEG_STEMS, second_markers: SEGMENT_MARKERS, second: true, side: Side::Left },
            priority: 3,
        },
        RoleRule {
            role: LegLower(Side::Right),
            predicate: Segmented { stems: LEG_STEMS, second_markers: SEGMENT_MARKERS, second: true, side: Side::Right },
            priority: 3,
        },
        RoleRule {
            role: ArmUpper(Side::Left),
            predicate: Segmented { stems: ARM_STEMS, second_markers: SEGMENT_MARKERS, second: false, side: Side::Left },
            priority: 4,
        },
        RoleRule {
            role: ArmUpper(Side::Right),
            predicate: Segmented { stems: ARM_STEMS, second_markers: SEGMENT_MARKERS, second: false, side: Side::Right },
            priority: 4,
        },
        RoleRule {
            role: ArmLower(Side::Left),
            predicate: Segmented { stems: ARM_STEMS, second_markers: SEGMENT_MARKERS, second: true, side: Side::Left },
            priority: 4,
        },
        RoleRule {
            role: ArmLower(Side::Right),
            predicate: Segmented { stems: ARM_STEMS, second_markers: SEGMENT_MARKERS, second: true, side: Side::Right },
            priority: 4,
        },
        RoleRule {
            role: HornBase(Side::Left),
            predicate: Segmented { stems: HORN_STEMS, second_markers: SEGMENT_MARKERS, second: false, side: Side::Left },
            priority: 5,
        },
        RoleRule {
            role: HornBase(Side::Right),
            predicate: Segmented { stems: HORN_STEMS, second_markers: SEGMENT_MARKERS, second: false, side: Side::Right },
            priority: 5,
        },
        RoleRule {
            role: HornTip(Side::Left),
            predicate: Segmented { stems: HORN_STEMS, second_markers: SEGMENT_MARKERS, second: true, side: Side::Left },
            priority: 5,
        },
        RoleRule {
            role: HornTip(Side::Right),
            predicate: Segmented { stems: HORN_STEMS, second_markers: SEGMENT_MARKERS, second: true, side: Side::Right },
            priority: 5,
        },
        RoleRule {
            role: Eye(Side::Left),
            predicate: Segmented { stems: EYE_STEMS, second_markers: SEGMENT_MARKERS, second: false, side: Side::Left },
            priority: 6,
        },
        RoleRule {
            role: Eye(Side::Right),
            predicate: Segmented { stems: EYE_STEMS, second_markers: SEGMENT_MARKERS, second: false, side: Side::Right },
            priority: 6,
        },
        RoleRule {
            role: Spine,
            predicate: Contains(&["spine", "columna", "espalda", "torso"]),
            priority: 7,
        },
        RoleRule {
            role: Hip,
            predicate: Contains(&["hip", "cadera", "pelvis"]),
            priority: 8,
        },
        RoleRule {
            role: Hip,
            predicate: Exact(&["piernal", "piernar", "pierna2l", "pierna2r"]),
            priority: 8,
        },
        RoleRule {
            role: ChestBreath,
            predicate: Contains(&["chest", "pecho", "torax", "ribcage", "cuello"]),
            priority: 9,
        },
    ];
    TABLE
}

/// Confidence that a bone is the given facial landmark, in [0, 1].
///
/// Weighted sum: keyword in name 0.4, height in range 0.3, |z| in range 0.2,
/// |x| within bound 0.1 (only for criteria that set `lateral_max`).
pub fn landmark_confidence(name: &str, position: Vec3, criteria: &LandmarkCriteria) -> f32 {
    let mut confidence = 0.0;

    if criteria.keywords.iter().any(|k| name.contains(k.as_str())) {
        confidence += 0.4;
    }
    if position.y >= criteria.height_min && position.y <= criteria.height_max {
        confidence += 0.3;
    }
    let depth = position.z.abs();
    if depth >= criteria.depth_min && depth <= criteria.depth_max {
        confidence += 0.2;
    }
    if let Some(lateral_max) = criteria.lateral_max {
        if position.x.abs() <= lateral_max {
            confidence += 0.1;
        }
    }

    confidence
}

/// Whether a bone qualifies as the given landmark: not excluded by name, and
/// confidence at or above the criteria threshold.
pub fn matches_landmark(name: &str, position: Vec3, criteria: &LandmarkCriteria) -> bool {
    if criteria.exclude_names.iter().any(|e| e == name) {
        return false;
    }
    landmark_confidence(name, position, criteria) >= criteria.threshold
}

/// Classify every bone of a skeleton into its semantic roles.
///
/// Walks the arena once. Primary-skeleton, limb, horn and eye roles come
/// from the declarative rule table; nose/forehead landmark roles use the
/// confidence score so approximate, inconsistently named rigs still match.
pub fn bind(skeleton: &Skeleton, config: &ClassifierConfig) -> RoleMap {
    let mut roles = RoleMap::default();
    let mut rules: Vec<&RoleRule> = rule_table().iter().collect();
    rules.sort_by_key(|r| r.priority);

    for (id, bone) in skeleton.iter() {
        let name = bone.name();
        for rule in &rules {
            if rule.predicate.matches(name) {
                roles.assign(rule.role, id);
            }
        }

        let position = bone.local.position;
        if matches_landmark(name, position, &config.nose) {
            roles.assign(Role::NoseCandidate, id);
        }
        if matches_landmark(name, position, &config.forehead) {
            roles.assign(Role::ForeheadCandidate, id);
        }

        let held = roles.roles_of(id);
        if !held.is_empty() {
            debug!(
                "classified bone {:?} as {}",
                name,
                held.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ")
            );
        }
    }

    roles
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::skeleton::BoneTransform;

    fn demon_skeleton() -> Skeleton {
        let mut b = Skeleton::builder();
        let base = b.bone("Base", None, BoneTransform::default());
        let spine = b.bone("Base001", Some(base), BoneTransform::default());
        let neck = b.bone("Cuello", Some(spine), BoneTransform::default());
        let head = b.bone("Head", Some(neck), BoneTransform::default());
        b.bone("EyeL", Some(head), BoneTransform::default());
        b.bone("EyeR", Some(head), BoneTransform::default());
        b.bone("CuernoL", Some(head), BoneTransform::default());
        b.bone("Cuerno2L", Some(head), BoneTransform::default());
        b.bone("CuernoR", Some(head), BoneTransform::default());
        b.bone("Cuerno2R", Some(head), BoneTransform::default());
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

    #[test]
    fn classifies_the_reference_rig() {
        let skeleton = demon_skeleton();
        let roles = bind(&skeleton, &ClassifierConfig::default());

        assert_eq!(roles.first(Role::Root), skeleton.find("base"));
        assert_eq!(roles.first(Role::HeadMain), skeleton.find("head"));
        assert_eq!(roles.first(Role::LegUpper(Side::Left)), skeleton.find("piernal"));
        assert_eq!(roles.first(Role::LegLower(Side::Right)), skeleton.find("pierna2r"));
        assert_eq!(roles.first(Role::ArmUpper(Side::Right)), skeleton.find("brazor"));
        assert_eq!(roles.first(Role::ArmLower(Side::Left)), skeleton.find("brazo2l"));
        assert_eq!(roles.first(Role::HornBase(Side::Left)), skeleton.find("cuernol"));
        assert_eq!(roles.first(Role::HornTip(Side::Right)), skeleton.find("cuerno2r"));
        assert_eq!(roles.first(Role::Eye(Side::Left)), skeleton.find("eyel"));
    }

    #[test]
    fn bones_can_hold_several_roles() {
        let skeleton = demon_skeleton();
        let roles = bind(&skeleton, &ClassifierConfig::default());

        // cuello is both a sway target and a chest-breath target
        let neck = skeleton.find("cuello").unwrap();
        assert!(roles.bones(Role::Spine).contains(&neck));
        assert!(roles.bones(Role::ChestBreath).contains(&neck));

        // upper legs double as hip-rock targets
        let leg = skeleton.find("piernal").unwrap();
        assert!(roles.bones(Role::Hip).contains(&leg));
        assert!(roles.bones(Role::LegUpper(Side::Left)).contains(&leg));
    }

    #[test]
    fn nose_tip_scores_above_threshold() {
        let config = ClassifierConfig::default();
        let position = Vec3::new(0.1, 7.0, 2.0);
        let score = landmark_confidence("nose_tip", position, &config.nose);
        assert!(score >= 0.7, "score was {score}");
        assert!(matches_landmark("nose_tip", position, &config.nose));
    }

    #[test]
    fn generic_bone_name_follows_scoring_and_exclusion_paths() {
        let config = ClassifierConfig::default();
        let position = Vec3::new(0.1, 7.0, 2.0);

        // "bone001" is a nose keyword, so it scores the same way nose_tip
        // does and is not excluded from the nose role...
        assert!(matches_landmark("bone001", position, &config.nose));
        // ...but the forehead rules exclude it by name before scoring.
        assert!(!matches_landmark("bone001", position, &config.forehead));
    }

    #[test]
    fn landmark_weights_partition_as_documented() {
        let criteria = ClassifierConfig::default().nose;
        // keyword only
        let score = landmark_confidence("nose", Vec3::new(9.0, 0.0, 0.0), &criteria);
        assert!((score - 0.4).abs() < 1e-6);
        // height only
        let score = landmark_confidence("xyz", Vec3::new(9.0, 7.0, 0.0), &criteria);
        assert!((score - 0.3).abs() < 1e-6);
        // depth only
        let score = landmark_confidence("xyz", Vec3::new(9.0, 0.0, -2.0), &criteria);
        assert!((score - 0.2).abs() < 1e-6);
        // lateral only
        let score = landmark_confidence("xyz", Vec3::new(0.2, 0.0, 0.0), &criteria);
        assert!((score - 0.1).abs() < 1e-6);
    }

    #[test]
    fn missing_roles_leave_the_map_partial() {
        let mut b = Skeleton::builder();
        b.bone("base", None, BoneTransform::default());
        b.bone("piernal", None, BoneTransform::default());
        b.bone("piernar", None, BoneTransform::default());
        let skeleton = b.build();
        let roles = bind(&skeleton, &ClassifierConfig::default());

        assert!(roles.has(Role::Root));
        assert!(roles.has(Role::LegUpper(Side::Left)));
        assert!(roles.has(Role::LegUpper(Side::Right)));
        assert!(!roles.has(Role::LegLower(Side::Left)));
        assert!(!roles.has(Role::HeadMain));
        assert!(!roles.has(Role::Eye(Side::Left)));
    }
}
