use crate::scene::NodeHandle;

/// Which part of a node's transform a track writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

/// Maps track `track_index` of a clip onto `node_handle` in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node_handle: NodeHandle,
    pub target: TargetPath,
}
