mod gltf;
mod image;

pub use self::gltf::load_model;
pub use self::image::load_image;
