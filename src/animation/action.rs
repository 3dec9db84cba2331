use std::sync::Arc;

use crate::animation::binding::{PropertyBinding, TargetPath};
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::tracks::KeyframeCursor;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
}

/// Playback state of one clip on one model.
///
/// An action only advances and writes to the scene while it is running.
/// `play`, `stop` and `reset` return `&mut Self` so they chain:
/// `action.reset().play()`.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    running: bool,

    pub(crate) bindings: Vec<PropertyBinding>,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            enabled: true,
            running: false,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: Vec<PropertyBinding>) -> Self {
        self.bindings = bindings;
        self
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }

    pub fn play(&mut self) -> &mut Self {
        self.running = true;
        self.enabled = true;
        self
    }

    /// Halts playback and rewinds.
    pub fn stop(&mut self) -> &mut Self {
        self.running = false;
        self.reset()
    }

    /// Rewinds to the start and clears a pause. Does not change whether the
    /// action is running.
    pub fn reset(&mut self) -> &mut Self {
        self.time = 0.0;
        self.paused = false;
        self.enabled = true;
        self.track_cursors.fill(KeyframeCursor::default());
        self
    }

    /// Scheduled, not paused and enabled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running && !self.paused && self.enabled
    }

    /// Advances local time by `dt`.
    pub fn update(&mut self, dt: f32) {
        if !self.is_running() {
            return;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time += dt;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                self.time = self.time.rem_euclid(duration);
            }
        }
    }

    /// Samples every bound track at the current time and writes the result
    /// into the target nodes, blended by `weight` against the current value.
    pub(crate) fn apply(&mut self, scene: &mut Scene) {
        let weight = self.weight.clamp(0.0, 1.0);
        if weight <= 0.0 {
            return;
        }

        for binding in &self.bindings {
            let Some(track) = self.clip.tracks.get(binding.track_index) else {
                continue;
            };
            let Some(cursor) = self.track_cursors.get_mut(binding.track_index) else {
                continue;
            };
            let Some(node) = scene.get_node_mut(binding.node_handle) else {
                continue;
            };
            let transform = &mut node.transform;

            match (&track.data, binding.target) {
                (TrackData::Vector3(t), TargetPath::Translation) => {
                    if let Some(v) = t.sample_with_cursor(self.time, cursor) {
                        transform.position = transform.position.lerp(v, weight);
                    }
                }
                (TrackData::Vector3(t), TargetPath::Scale) => {
                    if let Some(v) = t.sample_with_cursor(self.time, cursor) {
                        transform.scale = transform.scale.lerp(v, weight);
                    }
                }
                (TrackData::Quaternion(t), TargetPath::Rotation) => {
                    if let Some(q) = t.sample_with_cursor(self.time, cursor) {
                        transform.rotation = transform.rotation.slerp(q, weight);
                    }
                }
                (data, target) => {
                    log::warn!(
                        "Track {} of '{}' has data incompatible with {target:?}: {}",
                        binding.track_index,
                        self.clip.name,
                        match data {
                            TrackData::Vector3(_) => "vec3",
                            TrackData::Quaternion(_) => "quat",
                        }
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{InterpolationMode, KeyframeTrack, Track};
    use glam::Vec3;

    fn clip(duration: f32) -> Arc<AnimationClip> {
        let track = KeyframeTrack::new(
            vec![0.0, duration],
            vec![Vec3::ZERO, Vec3::X],
            InterpolationMode::Linear,
        );
        Arc::new(AnimationClip::new("walk", vec![Track::translation("hips", track)]))
    }

    #[test]
    fn idle_action_does_not_advance() {
        let mut action = AnimationAction::new(clip(2.0));
        action.update(0.5);
        assert_eq!(action.time, 0.0);
        assert!(!action.is_running());
    }

    #[test]
    fn loop_wraps_time() {
        let mut action = AnimationAction::new(clip(2.0));
        action.play();
        action.update(2.5);
        assert!((action.time - 0.5).abs() < 1e-6);
    }

    #[test]
    fn once_pauses_at_end() {
        let mut action = AnimationAction::new(clip(1.0));
        action.loop_mode = LoopMode::Once;
        action.play();
        action.update(3.0);
        assert_eq!(action.time, 1.0);
        assert!(!action.is_running());
    }

    #[test]
    fn stop_rewinds_and_reset_play_chains() {
        let mut action = AnimationAction::new(clip(2.0));
        action.play();
        action.update(1.0);
        action.stop();
        assert_eq!(action.time, 0.0);
        assert!(!action.is_running());

        action.update(1.0);
        action.reset().play();
        assert!(action.is_running());
        assert_eq!(action.time, 0.0);
    }
}
