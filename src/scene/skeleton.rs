use glam::{Affine3A, Mat4};
use slotmap::SlotMap;

use crate::scene::{Node, NodeHandle};

/// A glTF skin: an ordered bone list plus its inverse bind matrices.
///
/// `bones[i]` is the node driving joint index `i` in the vertex data.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,
    pub bones: Vec<NodeHandle>,

    // Static after load; maps mesh space into each bone's local space.
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,

    // Recomputed every frame.
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    #[must_use]
    pub fn new(name: &str, bones: Vec<NodeHandle>, inverse_bind_matrices: Vec<Affine3A>) -> Self {
        let count = bones.len();
        Self {
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            joint_matrices: vec![Mat4::IDENTITY; count],
        }
    }

    /// Joint matrices as of the last [`compute_joint_matrices`](Self::compute_joint_matrices).
    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// `joint[i] = world(bones[i]) * inverse_bind[i]`.
    ///
    /// The result maps bind-pose vertices straight to world space, so skinned
    /// geometry ignores the transform of the node that carries the mesh.
    pub fn compute_joint_matrices(&mut self, nodes: &SlotMap<NodeHandle, Node>) {
        self.joint_matrices.resize(self.bones.len(), Mat4::IDENTITY);

        for (i, &bone) in self.bones.iter().enumerate() {
            let Some(node) = nodes.get(bone) else {
                continue;
            };
            let ibm = self
                .inverse_bind_matrices
                .get(i)
                .copied()
                .unwrap_or(Affine3A::IDENTITY);
            self.joint_matrices[i] = Mat4::from(node.transform.world_matrix * ibm);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::transform_system;
    use glam::Vec3;

    #[test]
    fn joint_matrix_cancels_bind_pose() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let mut bone = Node::with_name("hip");
        bone.transform.position = Vec3::new(0.0, 1.0, 0.0);
        let handle = nodes.insert(bone);
        transform_system::update_hierarchy_iterative(&mut nodes, &[handle]);

        let ibm = Affine3A::from_translation(Vec3::new(0.0, -1.0, 0.0));
        let mut skeleton = Skeleton::new("rig", vec![handle], vec![ibm]);
        skeleton.compute_joint_matrices(&nodes);
        assert_eq!(skeleton.joint_matrices()[0], Mat4::IDENTITY);

        nodes[handle].transform.position = Vec3::new(2.0, 1.0, 0.0);
        transform_system::update_hierarchy_iterative(&mut nodes, &[handle]);
        skeleton.compute_joint_matrices(&nodes);
        let moved = skeleton.joint_matrices()[0].transform_point3(Vec3::ZERO);
        assert!((moved - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }
}
