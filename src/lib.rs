#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod app;
pub mod assets;
pub mod cli;
pub mod config;
pub mod errors;
pub mod render;
pub mod scene;
pub mod stage;
pub mod utils;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
pub use app::App;
pub use assets::{AssetLoader, ModelAsset};
pub use config::ViewerConfig;
pub use errors::{Result, ViewerError};
pub use render::{Renderer, WgpuContext};
pub use scene::{Camera, Node, Scene, Transform};
pub use stage::{AnimationStateController, DanceState, PlaybackTrigger, StageContext, TransformSnapshot};
pub use utils::OrbitControls;
