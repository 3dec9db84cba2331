//! Transform system
//!
//! Propagates world matrices down the scene hierarchy. Decoupled from
//! [`Scene`](crate::scene::Scene): it only borrows the node storage and the
//! list of roots, so callers can update matrices while holding other parts of
//! the scene.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Updates world matrices for every tree below `roots`.
///
/// Uses an explicit stack instead of recursion. A node's world matrix is only
/// recomputed when its local TRS changed or an ancestor's world matrix did.
pub fn update_hierarchy_iterative(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    // (node, parent world matrix, parent changed)
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root_handle in roots.iter().rev() {
        stack.push((root_handle, Affine3A::IDENTITY, false));
    }

    propagate(nodes, &mut stack);
}

/// Force-refreshes the subtree rooted at `root_handle`.
///
/// The parent world matrix is rebuilt from the local TRS of every ancestor up
/// to the root, so edits made above `root_handle` since the last full pass are
/// seen too. Used when a world pose has to be exact right now, mid-frame.
pub fn update_subtree(nodes: &mut SlotMap<NodeHandle, Node>, root_handle: NodeHandle) {
    let Some(node) = nodes.get(root_handle) else {
        return;
    };

    let parent_world = ancestor_world(nodes, node.parent);

    let mut stack = vec![(root_handle, parent_world, true)];
    propagate(nodes, &mut stack);
}

/// World matrix of `handle` composed from the local TRS of its whole chain.
///
/// Ancestors keep their local dirty state, so the next full pass still
/// refreshes their other descendants.
fn ancestor_world(nodes: &mut SlotMap<NodeHandle, Node>, handle: Option<NodeHandle>) -> Affine3A {
    let mut chain = Vec::new();
    let mut current = handle;
    while let Some(h) = current {
        if chain.len() > nodes.len() {
            log::error!("Cycle in scene hierarchy");
            break;
        }
        chain.push(h);
        current = nodes.get(h).and_then(|n| n.parent);
    }

    let mut world = Affine3A::IDENTITY;
    for &h in chain.iter().rev() {
        let Some(node) = nodes.get_mut(h) else {
            continue;
        };
        let t = &node.transform;
        world = world * Affine3A::from_scale_rotation_translation(t.scale, t.rotation, t.position);
        node.transform.set_world_matrix(world);
    }
    world
}

fn propagate(nodes: &mut SlotMap<NodeHandle, Node>, stack: &mut Vec<(NodeHandle, Affine3A, bool)>) {
    while let Some((node_handle, parent_world_matrix, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(node_handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        if world_needs_update {
            let new_world = parent_world_matrix * *node.transform.local_matrix();
            node.transform.set_world_matrix(new_world);
        }

        let current_world = node.transform.world_matrix;

        // Reverse order keeps children processed first-to-last.
        for &child_handle in node.children.iter().rev() {
            stack.push((child_handle, current_world, world_needs_update));
        }
    }
}
