//! The dancing stage
//!
//! - [`AnimationStateController`]: idle/dance state machine and the pose bake
//! - [`TransformSnapshot`]: a world pose observed on a node
//! - [`PlaybackTrigger`]: music toggle plus the auto-resume schedule
//! - [`StageContext`]: owns the scene, the mixer and the above; applies asset loads

pub mod context;
pub mod controller;
pub mod snapshot;
pub mod trigger;

pub use context::StageContext;
pub use controller::{AnimationStateController, ClipSlot, DanceState, SkipReason, Transition};
pub use snapshot::TransformSnapshot;
pub use trigger::{Playback, PlaybackToggle, PlaybackTrigger, TriggerRequest};
