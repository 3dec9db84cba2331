//! Asset loading
//!
//! - [`loaders`]: glTF and image decoders producing CPU-side data
//! - [`ModelAsset`]: a decoded model, instantiated into a [`Scene`](crate::scene::Scene) on demand
//! - [`AssetLoader`]: runs decoders on worker threads and hands results back to the frame loop

pub mod loaders;
pub mod model;
pub mod server;

pub use loaders::{load_image, load_model};
pub use model::{ModelAsset, NodeDesc, SkinDesc};
pub use server::{AssetLoader, AssetSlot, LoadEvent, LoadedAsset};
