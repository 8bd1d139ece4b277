pub mod clip;
pub mod clip_blend;
pub mod config;
pub mod constraints;
pub mod errors;
pub mod layers;
pub mod puppet;
pub mod skeleton;
pub mod state_machine;

pub mod prelude {
    pub use super::clip::{Clip, ClipLibrary, LoopMode};
    pub use super::clip_blend::{ClipBlendController, PlayOptions};
    pub use super::config::PuppetConfig;
    pub use super::errors::{PuppetError, PuppetResult};
    pub use super::puppet::Puppet;
    pub use super::skeleton::{
        BoneId, BoneTransform, Role, RoleMap, RotationOrder, Side, Skeleton,
    };
    pub use super::state_machine::Behavior;
}
