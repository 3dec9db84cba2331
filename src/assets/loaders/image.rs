use std::path::Path;

use crate::errors::{Result, ViewerError};
use crate::scene::Image;

/// Decodes an image file into RGBA8.
pub fn load_image(path: impl AsRef<Path>) -> Result<Image> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ViewerError::AssetNotFound(path.to_path_buf()));
    }

    let rgba = image::open(path)?.into_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(Image {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}
