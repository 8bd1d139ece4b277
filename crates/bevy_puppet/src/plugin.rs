use crate::systems::{advance_rigs, apply_rig_poses, bind_rigs};
use bevy::prelude::*;
use bevy::transform::TransformSystem;

/// Adds puppet animation support to an app.
///
/// Rigs are harvested, advanced and written back in `PostUpdate`, before
/// transform propagation, so the host render step sees the finished pose.
#[derive(Default)]
pub struct PuppetPlugin;

impl Plugin for PuppetPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PostUpdate,
            (bind_rigs, advance_rigs, apply_rig_poses)
                .chain()
                .before(TransformSystem::TransformPropagate),
        );
    }
}
