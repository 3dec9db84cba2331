//! Scene graph module
//!
//! Manages the scene hierarchy and its components:
//! - [`Node`]: scene node (parent/child hierarchy plus transform)
//! - [`Transform`]: position, rotation and scale with cached matrices
//! - [`Scene`]: the container owning nodes, meshes and skins
//! - [`Camera`]: perspective camera
//! - [`transform_system`]: world matrix propagation, decoupled from `Scene`

pub mod background;
pub mod camera;
pub mod light;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use background::{Background, Image};
pub use camera::Camera;
pub use light::DirectionalLight;
pub use mesh::{Mesh, Primitive, Vertex};
pub use node::Node;
pub use scene::Scene;
pub use skeleton::Skeleton;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct SkeletonKey;
}
