use bevy::math::{EulerRot, Mat4, Quat, Vec3};
use bevy::platform::collections::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Stable index of a bone within a [`Skeleton`] arena.
///
/// Layers and role maps hold `BoneId`s, never references into the arena, so
/// rebinding a skeleton cannot leave anything holding a stale bone.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct BoneId(pub(crate) usize);

impl BoneId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Order in which the three Euler angles of a bone are applied.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum RotationOrder {
    #[default]
    Xyz,
    Yxz,
}

impl RotationOrder {
    pub fn quat(self, euler: Vec3) -> Quat {
        match self {
            RotationOrder::Xyz => Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z),
            RotationOrder::Yxz => Quat::from_euler(EulerRot::YXZ, euler.y, euler.x, euler.z),
        }
    }
}

/// Local transform of a bone: position, Euler rotation with an explicit
/// application order, and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneTransform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub rotation_order: RotationOrder,
    pub scale: Vec3,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            rotation_order: RotationOrder::Xyz,
            scale: Vec3::ONE,
        }
    }
}

impl BoneTransform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation_order.quat(self.rotation),
            self.position,
        )
    }
}

/// A named node in the bone tree. The world transform is derived, never
/// stored: it is recomputed from the root chain on demand.
#[derive(Clone, Debug)]
pub struct Bone {
    name: String,
    parent: Option<BoneId>,
    children: Vec<BoneId>,
    pub local: BoneTransform,
    rest: BoneTransform,
}

impl Bone {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<BoneId> {
        self.parent
    }

    pub fn children(&self) -> &[BoneId] {
        &self.children
    }

    /// The local transform captured when the skeleton was built.
    pub fn rest(&self) -> &BoneTransform {
        &self.rest
    }
}

/// Arena of bone records for one loaded model.
///
/// Bone names are stored lowercased for lookup; classification operates on
/// the same lowercased form.
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    roots: Vec<BoneId>,
    by_name: HashMap<String, BoneId>,
}

impl Skeleton {
    pub fn builder() -> SkeletonBuilder {
        SkeletonBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn roots(&self) -> &[BoneId] {
        &self.roots
    }

    pub fn bone(&self, id: BoneId) -> &Bone {
        &self.bones[id.0]
    }

    pub fn bone_mut(&mut self, id: BoneId) -> &mut Bone {
        &mut self.bones[id.0]
    }

    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoneId, &Bone)> {
        self.bones.iter().enumerate().map(|(i, b)| (BoneId(i), b))
    }

    /// World transform of a bone, recomputed from the root chain.
    pub fn world_transform(&self, id: BoneId) -> Mat4 {
        let bone = self.bone(id);
        let local = bone.local.matrix();
        match bone.parent {
            Some(parent) => self.world_transform(parent) * local,
            None => local,
        }
    }

    /// Reset a bone's local transform to the captured rest pose.
    pub fn reset_to_rest(&mut self, id: BoneId) {
        let rest = self.bones[id.0].rest;
        self.bones[id.0].local = rest;
    }
}

#[derive(Default)]
pub struct SkeletonBuilder {
    bones: Vec<Bone>,
    roots: Vec<BoneId>,
    by_name: HashMap<String, BoneId>,
}

impl SkeletonBuilder {
    /// Add a bone with the given (case-insensitive) name under `parent`.
    pub fn bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<BoneId>,
        local: BoneTransform,
    ) -> BoneId {
        let id = BoneId(self.bones.len());
        let name = name.into().to_lowercase();
        self.bones.push(Bone {
            name: name.clone(),
            parent,
            children: Vec::new(),
            local,
            rest: local,
        });
        match parent {
            Some(parent) => self.bones[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        self.by_name.insert(name, id);
        id
    }

    pub fn build(self) -> Skeleton {
        Skeleton {
            bones: self.bones,
            roots: self.roots,
            by_name: self.by_name,
        }
    }
}
