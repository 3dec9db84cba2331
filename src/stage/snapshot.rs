use glam::{Quat, Vec3};

use crate::scene::{NodeHandle, Scene, Transform};

/// A world-space pose observed on a scene node.
///
/// There is no public constructor from raw values: a snapshot always
/// describes a pose some node actually had.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSnapshot {
    position: Vec3,
    rotation: Quat,
}

impl TransformSnapshot {
    /// Refreshes the world matrices of `node`, its ancestors and its subtree,
    /// then records its world position and rotation. `None` if the node does
    /// not exist.
    pub fn observe(scene: &mut Scene, node: NodeHandle) -> Option<Self> {
        scene.update_subtree(node);
        Some(Self {
            position: scene.world_position(node)?,
            rotation: scene.world_rotation(node)?,
        })
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Writes the pose into a local transform. Scale is left alone.
    pub fn apply_to_local(&self, transform: &mut Transform) {
        transform.position = self.position;
        transform.rotation = self.rotation;
        transform.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;

    #[test]
    fn observe_sees_unpropagated_changes() {
        let mut scene = Scene::new();
        let root = scene.add_node(Node::with_name("stage"));
        let model = scene.add_to_parent(Node::with_name("model"), root);
        scene.update_matrix_world();

        scene.get_node_mut(root).unwrap().transform.position = Vec3::new(1.0, 0.0, 0.0);
        scene.get_node_mut(model).unwrap().transform.position = Vec3::new(0.0, 0.0, 2.0);

        let snap = TransformSnapshot::observe(&mut scene, model).unwrap();
        assert_eq!(snap.position(), Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn observe_missing_node_is_none() {
        let mut other = Scene::new();
        let node = other.add_node(Node::new());

        let mut scene = Scene::new();
        assert!(TransformSnapshot::observe(&mut scene, node).is_none());
    }
}
