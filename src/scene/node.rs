use glam::Affine3A;

use crate::scene::transform::Transform;
use crate::scene::{MeshKey, NodeHandle, SkeletonKey};

/// A scene node.
///
/// Carries the hierarchy links, the transform and optional references to a
/// mesh and the skeleton that deforms it. Animation tracks find their target
/// node by `name`.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    pub mesh: Option<MeshKey>,
    pub skin: Option<SkeletonKey>,

    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("")
    }

    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            mesh: None,
            skin: None,
            visible: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// World matrix as of the last transform system pass.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
