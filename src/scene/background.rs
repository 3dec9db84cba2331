use std::sync::Arc;

use glam::Vec4;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Image {
    /// A 1x1 image of the given colour.
    #[must_use]
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }
}

/// What fills the screen behind the scene.
#[derive(Debug, Clone)]
pub enum Background {
    Color(Vec4),
    /// Stretched over the whole viewport.
    Texture(Arc<Image>),
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(Vec4::new(0.0, 0.0, 0.0, 1.0))
    }
}
