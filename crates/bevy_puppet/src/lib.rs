//! # Bevy Puppet
//!
//! **Bevy Puppet** animates a rigged humanoid/creature model in real time
//! without pre-authored locomotion animations: it classifies the skeleton's
//! bones by semantic role, layers procedural motion on top of them
//! (breathing, idle sway, gait, head look-at, eye tracking, blinking), and
//! arbitrates everything through a small behavior state machine (idle,
//! wander, walk, talk, think, greet).
//!
//! ## Core and integration
//!
//! The animation core is framework-neutral: bind a [`Skeleton`] built
//! through its builder API and drive the returned [`Puppet`] yourself:
//!
//! ```
//! use bevy_puppet::prelude::*;
//!
//! let mut builder = Skeleton::builder();
//! let base = builder.bone("Base", None, BoneTransform::default());
//! builder.bone("PiernaL", Some(base), BoneTransform::default());
//! builder.bone("PiernaR", Some(base), BoneTransform::default());
//!
//! let mut puppet = Puppet::bind(builder.build(), PuppetConfig::default());
//! puppet.set_cursor_target(0.3, -0.2);
//! puppet.tick(1.0 / 60.0);
//! puppet.dispose();
//! ```
//!
//! In a Bevy app, add [`PuppetPlugin`] and attach a [`PuppetRig`] component
//! to the root of a `Name`d bone hierarchy instead; the rig is harvested
//! and bound automatically, ticked from `Time`, and the animated pose is
//! written back to the bone entities' `Transform`s before transform
//! propagation.
//!
//! ## What runs when
//!
//! The behavior state machine decides per frame which layers are enabled:
//! wandering walks the body between random targets and engages the gait
//! layer while a target is out of reach; talking and greeting stop the
//! wander and play the built-in `"wave"` gesture clip through the
//! cross-fading clip controller; thinking slows the layer clocks. Layers
//! own disjoint (bone, channel) pairs by construction, and disabling a
//! layer restores its channels to the neutral pose.
//!
//! [`Skeleton`]: crate::core::skeleton::Skeleton
//! [`Puppet`]: crate::core::puppet::Puppet
//! [`PuppetPlugin`]: crate::plugin::PuppetPlugin
//! [`PuppetRig`]: crate::systems::PuppetRig

pub mod core;
pub mod interpolation;
pub mod plugin;
pub mod systems;

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::interpolation::InterpolateLinear;
    pub use super::plugin::PuppetPlugin;
    pub use super::systems::{PuppetInstance, PuppetRig};
}
