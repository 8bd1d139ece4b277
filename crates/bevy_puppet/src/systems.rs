use crate::core::prelude::*;
use bevy::ecs::prelude::*;
use bevy::log::warn;
use bevy::math::Quat;
use bevy::prelude::{Children, Name};
use bevy::time::Time;
use bevy::transform::components::Transform;
use std::collections::VecDeque;

/// Marks an entity hierarchy as a puppet rig. Bone entities are the `Name`d
/// descendants; on the first frame the rig is harvested into a bound
/// [`Puppet`] stored in a [`PuppetInstance`] on the same entity.
#[derive(Component, Clone, Debug, Default)]
pub struct PuppetRig {
    pub config: PuppetConfig,
}

impl PuppetRig {
    pub fn with_config(config: PuppetConfig) -> Self {
        Self { config }
    }
}

/// The bound engine plus the bone-index → entity mapping used to write the
/// animated pose back into the ECS hierarchy.
#[derive(Component)]
pub struct PuppetInstance {
    pub puppet: Puppet,
    bone_entities: Vec<(BoneId, Entity)>,
}

impl PuppetInstance {
    pub fn bone_entities(&self) -> &[(BoneId, Entity)] {
        &self.bone_entities
    }
}

/// Harvest newly added rigs: walk the `Name`d descendants breadth-first,
/// mirror them into a skeleton arena and bind a [`Puppet`] to it.
pub fn bind_rigs(
    mut commands: Commands,
    rigs: Query<(Entity, &PuppetRig), Without<PuppetInstance>>,
    names: Query<&Name>,
    children: Query<&Children>,
    transforms: Query<&Transform>,
) {
    for (root, rig) in &rigs {
        let mut builder = Skeleton::builder();
        let mut bone_entities = Vec::new();

        let mut queue: VecDeque<(Entity, Option<BoneId>)> = VecDeque::new();
        if let Ok(direct) = children.get(root) {
            for child in direct {
                queue.push_back((*child, None));
            }
        }

        while let Some((entity, parent)) = queue.pop_front() {
            let mut bone_parent = parent;
            if let Ok(name) = names.get(entity) {
                let local = transforms
                    .get(entity)
                    .map(bone_transform_from)
                    .unwrap_or_default();
                let id = builder.bone(name.as_str(), parent, local);
                bone_entities.push((id, entity));
                bone_parent = Some(id);
            }
            if let Ok(grandchildren) = children.get(entity) {
                for child in grandchildren {
                    queue.push_back((*child, bone_parent));
                }
            }
        }

        if bone_entities.is_empty() {
            warn!("puppet rig {root:?} has no named bone entities");
        }

        let puppet = Puppet::bind(builder.build(), rig.config.clone());
        commands.entity(root).insert(PuppetInstance {
            puppet,
            bone_entities,
        });
    }
}

/// Drive every bound puppet by the frame delta.
pub fn advance_rigs(time: Res<Time>, mut rigs: Query<&mut PuppetInstance>) {
    for mut instance in &mut rigs {
        instance.puppet.tick(time.delta_secs());
    }
}

/// Write the animated arena back into entity `Transform`s: bone locals onto
/// the bone entities, wander position and facing onto the rig root.
pub fn apply_rig_poses(
    rigs: Query<(Entity, &PuppetInstance)>,
    mut transforms: Query<&mut Transform>,
) {
    for (root, instance) in &rigs {
        if let Ok(mut transform) = transforms.get_mut(root) {
            transform.translation = instance.puppet.body_position();
            transform.rotation = Quat::from_rotation_y(instance.puppet.body_yaw());
        }

        let skeleton = instance.puppet.skeleton();
        for &(bone_id, entity) in &instance.bone_entities {
            let Ok(mut transform) = transforms.get_mut(entity) else {
                continue;
            };
            let local = &skeleton.bone(bone_id).local;
            transform.translation = local.position;
            transform.rotation = local.rotation_order.quat(local.rotation);
            transform.scale = local.scale;
        }
    }
}

fn bone_transform_from(transform: &Transform) -> BoneTransform {
    let (x, y, z) = transform.rotation.to_euler(bevy::math::EulerRot::XYZ);
    BoneTransform {
        position: transform.translation,
        rotation: bevy::math::Vec3::new(x, y, z),
        rotation_order: RotationOrder::Xyz,
        scale: transform.scale,
    }
}
