//! Rendering
//!
//! - [`WgpuContext`]: device, queue, surface and depth buffer
//! - [`Renderer`]: draws a [`Scene`](crate::scene::Scene) into the window

pub mod context;
pub mod renderer;

pub use context::WgpuContext;
pub use renderer::Renderer;
