use std::collections::HashMap;
use std::sync::Arc;

use slotmap::{SlotMap, new_key_type};

use crate::animation::action::AnimationAction;
use crate::animation::binder::Binder;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

new_key_type! {
    pub struct ActionKey;
}

/// Drives the actions of a single model.
///
/// The mixer is bound to the model's root node. Every clip handed to
/// [`clip_action`](Self::clip_action) is resolved against the nodes below
/// that root.
pub struct AnimationMixer {
    root: NodeHandle,
    actions: SlotMap<ActionKey, AnimationAction>,
    /// Keyed by clip identity. Clips from different files may share a name.
    by_clip: HashMap<usize, ActionKey>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new(root: NodeHandle) -> Self {
        Self {
            root,
            actions: SlotMap::with_key(),
            by_clip: HashMap::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Returns the action for `clip`, creating and binding it on first use.
    /// Asking twice for the same clip yields the same action.
    pub fn clip_action(&mut self, clip: Arc<AnimationClip>, scene: &Scene) -> ActionKey {
        let id = Arc::as_ptr(&clip) as usize;
        if let Some(&key) = self.by_clip.get(&id) {
            return key;
        }

        let bindings = Binder::bind(scene, self.root, &clip);
        log::debug!(
            "Bound clip '{}' ({:.2}s): {} of {} tracks",
            clip.name,
            clip.duration,
            bindings.len(),
            clip.tracks.len()
        );

        let key = self
            .actions
            .insert(AnimationAction::new(clip).with_bindings(bindings));
        self.by_clip.insert(id, key);
        key
    }

    #[must_use]
    pub fn action(&self, key: ActionKey) -> Option<&AnimationAction> {
        self.actions.get(key)
    }

    pub fn action_mut(&mut self, key: ActionKey) -> Option<&mut AnimationAction> {
        self.actions.get_mut(key)
    }

    #[must_use]
    pub fn running_count(&self) -> usize {
        self.actions.values().filter(|a| a.is_running()).count()
    }

    /// Advances every running action by `dt`, then writes their poses into
    /// the scene.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        for action in self.actions.values_mut() {
            if !action.is_running() {
                continue;
            }
            action.update(dt);
            action.apply(scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{InterpolationMode, KeyframeTrack, Track};
    use crate::scene::Node;
    use glam::Vec3;

    fn slide(name: &str, node: &str) -> Arc<AnimationClip> {
        let track = KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)],
            InterpolationMode::Linear,
        );
        Arc::new(AnimationClip::new(name, vec![Track::translation(node, track)]))
    }

    #[test]
    fn clip_action_is_cached_per_clip() {
        let mut scene = Scene::new();
        let root = scene.add_node(Node::with_name("model"));
        let mut mixer = AnimationMixer::new(root);

        let clip = slide("mixamo.com", "model");
        let a = mixer.clip_action(Arc::clone(&clip), &scene);
        let b = mixer.clip_action(clip, &scene);
        assert_eq!(a, b);

        // Same name, different clip.
        let c = mixer.clip_action(slide("mixamo.com", "model"), &scene);
        assert_ne!(a, c);
    }

    #[test]
    fn update_writes_running_actions_only() {
        let mut scene = Scene::new();
        let root = scene.add_node(Node::with_name("model"));
        let hips = scene.add_to_parent(Node::with_name("hips"), root);
        let mut mixer = AnimationMixer::new(root);

        let key = mixer.clip_action(slide("dance", "hips"), &scene);
        mixer.update(0.5, &mut scene);
        assert_eq!(scene.get_node(hips).unwrap().transform.position, Vec3::ZERO);

        mixer.action_mut(key).unwrap().play();
        mixer.update(0.5, &mut scene);
        let pos = scene.get_node(hips).unwrap().transform.position;
        assert!((pos.x - 2.0).abs() < 1e-5);
        assert_eq!(mixer.running_count(), 1);

        mixer.action_mut(key).unwrap().stop();
        assert_eq!(mixer.running_count(), 0);
    }

    #[test]
    fn unknown_nodes_are_not_bound() {
        let mut scene = Scene::new();
        let root = scene.add_node(Node::with_name("model"));
        let mut mixer = AnimationMixer::new(root);

        let key = mixer.clip_action(slide("dance", "tail"), &scene);
        assert!(mixer.action(key).unwrap().bindings().is_empty());
    }
}
