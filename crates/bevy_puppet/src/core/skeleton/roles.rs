use super::skeleton::BoneId;
use bevy::platform::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Semantic role of a bone. A bone may hold several roles at once; a role
/// may be held by several bones.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Role {
    /// Root of the body; carries the breathing sinusoid.
    Root,
    /// Torso bones swayed by the idle layer.
    Spine,
    /// Pelvis-area bones rocked by the idle layer while not walking.
    Hip,
    /// Chest bones scaled by the breath cycle.
    ChestBreath,
    /// Main head bone, driven by look-at.
    HeadMain,
    LegUpper(Side),
    LegLower(Side),
    ArmUpper(Side),
    ArmLower(Side),
    HornBase(Side),
    HornTip(Side),
    Eye(Side),
    /// Facial landmark picked by confidence scoring.
    NoseCandidate,
    /// Facial landmark picked by confidence scoring.
    ForeheadCandidate,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Root => write!(f, "root"),
            Role::Spine => write!(f, "spine"),
            Role::Hip => write!(f, "hip"),
            Role::ChestBreath => write!(f, "chestBreath"),
            Role::HeadMain => write!(f, "headMain"),
            Role::LegUpper(s) => write!(f, "legUpper:{s}"),
            Role::LegLower(s) => write!(f, "legLower:{s}"),
            Role::ArmUpper(s) => write!(f, "armUpper:{s}"),
            Role::ArmLower(s) => write!(f, "armLower:{s}"),
            Role::HornBase(s) => write!(f, "hornBase:{s}"),
            Role::HornTip(s) => write!(f, "hornTip:{s}"),
            Role::Eye(s) => write!(f, "eye:{s}"),
            Role::NoseCandidate => write!(f, "noseCandidate"),
            Role::ForeheadCandidate => write!(f, "foreheadCandidate"),
        }
    }
}

/// Role assignment for a bound skeleton: role → set of bone indices.
///
/// Computed once at bind time and immutable thereafter; rebinding a model
/// replaces the whole map.
#[derive(Clone, Debug, Default)]
pub struct RoleMap {
    assignments: HashMap<Role, Vec<BoneId>>,
}

impl RoleMap {
    pub(crate) fn assign(&mut self, role: Role, id: BoneId) {
        let bones = self.assignments.entry(role).or_default();
        if !bones.contains(&id) {
            bones.push(id);
        }
    }

    pub fn bones(&self, role: Role) -> &[BoneId] {
        self.assignments.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, role: Role) -> Option<BoneId> {
        self.bones(role).first().copied()
    }

    pub fn has(&self, role: Role) -> bool {
        !self.bones(role).is_empty()
    }

    /// All roles held by the given bone.
    pub fn roles_of(&self, id: BoneId) -> Vec<Role> {
        let mut roles: Vec<Role> = self
            .assignments
            .iter()
            .filter(|(_, bones)| bones.contains(&id))
            .map(|(role, _)| *role)
            .collect();
        roles.sort_by_key(|r| r.to_string());
        roles
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.values().all(Vec::is_empty)
    }
}
