use glam::{Quat, Vec3};
use slotmap::SlotMap;

use crate::scene::transform_system;
use crate::scene::{
    Background, Camera, DirectionalLight, Mesh, MeshKey, Node, NodeHandle, Skeleton, SkeletonKey,
    Transform,
};

/// The scene graph plus everything the renderer draws from it.
pub struct Scene {
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    pub(crate) root_nodes: Vec<NodeHandle>,

    pub(crate) meshes: SlotMap<MeshKey, Mesh>,
    pub(crate) skins: SlotMap<SkeletonKey, Skeleton>,

    camera: Option<(NodeHandle, Camera)>,

    pub background: Background,
    pub light: DirectionalLight,
    /// Flat ambient term added to every lit surface.
    pub ambient: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            skins: SlotMap::with_key(),
            camera: None,
            background: Background::default(),
            light: DirectionalLight::default(),
            ambient: 0.0,
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Adds a node at the root of the scene.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, child: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.nodes.insert(child);
        self.root_nodes.push(handle);
        self.attach(handle, parent);
        handle
    }

    /// Re-parents `child` under `parent`, detaching it from wherever it was.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself");
            return;
        }
        if !self.nodes.contains_key(parent) {
            log::error!("Parent node not found during attach");
            return;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Cannot attach node under its own descendant");
            return;
        }

        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p) {
                n.children.retain(|&c| c != child);
            }
        } else {
            self.root_nodes.retain(|&r| r != child);
        }

        self.nodes[parent].children.push(child);
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    /// True when `ancestor` lies on the parent chain of `handle`.
    fn is_ancestor(&self, ancestor: NodeHandle, handle: NodeHandle) -> bool {
        let mut current = self.nodes.get(handle).and_then(|n| n.parent);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn root_nodes(&self) -> &[NodeHandle] {
        &self.root_nodes
    }

    /// Depth-first search for the first node called `name` at or below `root`.
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let node = self.nodes.get(handle)?;
            if node.name == name {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshKey {
        self.meshes.insert(mesh)
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skins.insert(skeleton)
    }

    #[must_use]
    pub fn mesh(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    #[must_use]
    pub fn skeleton(&self, key: SkeletonKey) -> Option<&Skeleton> {
        self.skins.get(key)
    }

    /// Visible nodes that carry a mesh.
    pub fn mesh_nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node, &Mesh)> {
        self.nodes.iter().filter_map(|(handle, node)| {
            if !node.visible {
                return None;
            }
            let mesh = self.meshes.get(node.mesh?)?;
            Some((handle, node, mesh))
        })
    }

    /// Adds a root node carrying `camera` and makes it the active camera.
    pub fn add_camera(&mut self, camera: Camera, transform: Transform) -> NodeHandle {
        let mut node = Node::with_name("Camera");
        node.transform = transform;
        let handle = self.add_node(node);
        self.camera = Some((handle, camera));
        handle
    }

    #[must_use]
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref().map(|(_, cam)| cam)
    }

    /// The active camera together with its node's transform.
    pub fn query_main_camera_bundle(&mut self) -> Option<(&mut Transform, &mut Camera)> {
        let (handle, camera) = self.camera.as_mut()?;
        let transform = &mut self.nodes.get_mut(*handle)?.transform;
        Some((transform, camera))
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// World matrices for the whole graph, then the camera view.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(&mut self.nodes, &self.root_nodes);

        if let Some((handle, camera)) = self.camera.as_mut()
            && let Some(node) = self.nodes.get(*handle)
        {
            camera.update_view_projection(&node.transform.world_matrix);
        }
    }

    /// Refreshes world matrices below `root` immediately, taking pending
    /// changes on its ancestors into account.
    pub fn update_subtree(&mut self, root: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, root);
    }

    pub fn update_skeletons(&mut self) {
        let nodes = &self.nodes;
        for skeleton in self.skins.values_mut() {
            skeleton.compute_joint_matrices(nodes);
        }
    }

    pub fn update(&mut self) {
        self.update_matrix_world();
        self.update_skeletons();
    }

    // ========================================================================
    // World-space queries
    // ========================================================================

    #[must_use]
    pub fn world_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.nodes
            .get(handle)
            .map(|n| Vec3::from(n.transform.world_matrix.translation))
    }

    #[must_use]
    pub fn world_rotation(&self, handle: NodeHandle) -> Option<Quat> {
        self.nodes.get(handle).map(|n| {
            let (_, rotation, _) = n.transform.world_matrix.to_scale_rotation_translation();
            rotation
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(scene: &mut Scene) -> (NodeHandle, NodeHandle, NodeHandle) {
        let root = scene.add_node(Node::with_name("root"));
        let hips = scene.add_to_parent(Node::with_name("hips"), root);
        let head = scene.add_to_parent(Node::with_name("head"), hips);
        (root, hips, head)
    }

    #[test]
    fn find_node_by_name_searches_subtree_only() {
        let mut scene = Scene::new();
        let (root, hips, head) = chain(&mut scene);
        let stray = scene.add_node(Node::with_name("stray"));

        assert_eq!(scene.find_node_by_name(root, "head"), Some(head));
        assert_eq!(scene.find_node_by_name(root, "hips"), Some(hips));
        assert_eq!(scene.find_node_by_name(root, "stray"), None);
        assert_eq!(scene.find_node_by_name(stray, "stray"), Some(stray));
    }

    #[test]
    fn attach_moves_node_out_of_roots() {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::with_name("a"));
        let b = scene.add_node(Node::with_name("b"));
        scene.attach(b, a);

        assert_eq!(scene.root_nodes(), &[a]);
        assert_eq!(scene.get_node(b).unwrap().parent(), Some(a));
    }

    #[test]
    fn attach_under_own_descendant_is_refused() {
        let mut scene = Scene::new();
        let (root, hips, head) = chain(&mut scene);
        scene.attach(root, head);

        assert_eq!(scene.root_nodes(), &[root]);
        assert_eq!(scene.get_node(root).unwrap().parent(), None);
        assert!(scene.get_node(head).unwrap().children().is_empty());
        assert_eq!(scene.get_node(hips).unwrap().children(), &[head]);

        scene.attach(hips, head);
        assert_eq!(scene.get_node(hips).unwrap().parent(), Some(root));

        // The hierarchy stays walkable.
        scene.update_matrix_world();
        assert_eq!(scene.find_node_by_name(root, "head"), Some(head));
    }

    #[test]
    fn subtree_refresh_sees_moved_parent() {
        let mut scene = Scene::new();
        let (root, _, head) = chain(&mut scene);
        scene.update_matrix_world();

        scene.get_node_mut(root).unwrap().transform.position = Vec3::new(3.0, 0.0, 0.0);
        scene.update_subtree(head);

        assert_eq!(scene.world_position(head), Some(Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn world_position_composes_parents() {
        let mut scene = Scene::new();
        let (root, _, head) = chain(&mut scene);
        scene.get_node_mut(root).unwrap().transform.position = Vec3::new(1.0, 0.0, 0.0);
        scene.get_node_mut(head).unwrap().transform.position = Vec3::new(0.0, 2.0, 0.0);
        scene.update_matrix_world();

        assert_eq!(scene.world_position(head), Some(Vec3::new(1.0, 2.0, 0.0)));
    }
}
