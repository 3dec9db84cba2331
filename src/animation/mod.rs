//! Keyframe animation
//!
//! A loaded [`AnimationClip`] is bound to a model through an
//! [`AnimationMixer`], which hands out one [`AnimationAction`] per clip.
//! Each frame the mixer advances the running actions and writes the sampled
//! translation, rotation and scale into node transforms.

pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod mixer;
pub mod tracks;
mod values;

pub use action::{AnimationAction, LoopMode};
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use mixer::{ActionKey, AnimationMixer};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
