pub mod classify;
pub mod roles;
pub mod skeleton;

pub use classify::{landmark_confidence, matches_landmark, rule_table, NamePredicate, RoleRule};
pub use roles::{Role, RoleMap, Side};
pub use skeleton::{Bone, BoneId, BoneTransform, RotationOrder, Skeleton, SkeletonBuilder};
