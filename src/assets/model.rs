use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3};

use crate::animation::AnimationClip;
use crate::scene::{Mesh, MeshKey, Node, NodeHandle, Scene, Skeleton};

/// One glTF node, with indices into the owning [`ModelAsset`].
#[derive(Debug, Clone)]
pub struct NodeDesc {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

impl NodeDesc {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            children: Vec::new(),
            mesh: None,
            skin: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkinDesc {
    pub name: String,
    /// Node indices, in joint order.
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<Affine3A>,
}

/// A decoded model file that has not been added to any scene yet.
#[derive(Debug, Clone, Default)]
pub struct ModelAsset {
    pub name: String,
    pub nodes: Vec<NodeDesc>,
    /// Indices of the nodes in the file's default scene.
    pub roots: Vec<usize>,
    pub meshes: Vec<Mesh>,
    pub skins: Vec<SkinDesc>,
    pub animations: Vec<Arc<AnimationClip>>,
}

impl ModelAsset {
    /// The clip at `index`, in file order.
    #[must_use]
    pub fn clip(&self, index: usize) -> Option<Arc<AnimationClip>> {
        self.animations.get(index).cloned()
    }

    /// Creates the model's node tree under a new root node called `name` and
    /// returns that root. Nodes not reachable from the default scene are
    /// skipped.
    pub fn instantiate(&self, scene: &mut Scene, name: &str) -> NodeHandle {
        let group = scene.add_node(Node::with_name(name));
        let reachable = self.reachable_nodes();

        let mut mesh_keys: Vec<Option<MeshKey>> = vec![None; self.meshes.len()];
        let mut handles: Vec<Option<NodeHandle>> = vec![None; self.nodes.len()];

        for (index, desc) in self.nodes.iter().enumerate() {
            if !reachable[index] {
                continue;
            }

            let mut node = Node::with_name(desc.name.as_str());
            node.transform.position = desc.translation;
            node.transform.rotation = desc.rotation;
            node.transform.scale = desc.scale;
            if let Some(i) = desc.mesh
                && let Some(mesh) = self.meshes.get(i)
            {
                node.mesh = Some(*mesh_keys[i].get_or_insert_with(|| scene.add_mesh(mesh.clone())));
            }
            handles[index] = Some(scene.add_node(node));
        }

        for (desc, parent) in self.nodes.iter().zip(&handles) {
            let Some(parent) = *parent else { continue };
            for &child in &desc.children {
                if let Some(Some(child)) = handles.get(child) {
                    scene.attach(*child, parent);
                }
            }
        }

        for &root in &self.roots {
            if let Some(Some(handle)) = handles.get(root) {
                scene.attach(*handle, group);
            }
        }

        for (skin_index, skin) in self.skins.iter().enumerate() {
            let bones = skin
                .joints
                .iter()
                .filter_map(|&j| handles.get(j).copied().flatten())
                .collect();
            let key = scene.add_skeleton(Skeleton::new(
                &skin.name,
                bones,
                skin.inverse_bind_matrices.clone(),
            ));

            for (desc, handle) in self.nodes.iter().zip(&handles) {
                if desc.skin == Some(skin_index)
                    && let Some(node) = handle.and_then(|h| scene.get_node_mut(h))
                {
                    node.skin = Some(key);
                }
            }
        }

        log::debug!(
            "Instantiated '{}' as '{name}' ({} nodes)",
            self.name,
            handles.iter().flatten().count()
        );
        group
    }

    fn reachable_nodes(&self) -> Vec<bool> {
        let mut reachable = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = self.roots.clone();
        while let Some(index) = stack.pop() {
            let Some(seen) = reachable.get_mut(index) else {
                continue;
            };
            if *seen {
                continue;
            }
            *seen = true;
            stack.extend(&self.nodes[index].children);
        }
        reachable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_model() -> ModelAsset {
        let mut root = NodeDesc::new("Armature");
        root.children = vec![1];
        let mut hips = NodeDesc::new("Hips");
        hips.translation = Vec3::new(0.0, 1.0, 0.0);
        hips.mesh = Some(0);
        hips.skin = Some(0);

        ModelAsset {
            name: "rig".into(),
            nodes: vec![root, hips],
            roots: vec![0],
            meshes: vec![Mesh::default()],
            skins: vec![SkinDesc {
                name: "skin".into(),
                joints: vec![1],
                inverse_bind_matrices: vec![Affine3A::IDENTITY],
            }],
            animations: Vec::new(),
        }
    }

    #[test]
    fn instantiate_builds_tree_under_group() {
        let mut scene = Scene::new();
        let model = two_node_model();
        let group = model.instantiate(&mut scene, "character");

        assert_eq!(scene.root_nodes(), &[group]);
        let hips = scene.find_node_by_name(group, "Hips").unwrap();
        let hips_node = scene.get_node(hips).unwrap();
        assert!(hips_node.mesh.is_some());
        assert!(hips_node.skin.is_some());

        scene.update_matrix_world();
        assert_eq!(scene.world_position(hips), Some(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn nodes_outside_default_scene_are_dropped() {
        let mut scene = Scene::new();
        let mut model = two_node_model();
        model.nodes.push(NodeDesc::new("Orphan"));
        let group = model.instantiate(&mut scene, "character");

        assert_eq!(scene.root_nodes(), &[group]);
        assert!(scene.find_node_by_name(group, "Orphan").is_none());
    }
}
