//! Idle/dance state machine.
//!
//! The controller owns which clip plays and the pose bake done when dancing
//! stops. Clip readiness is tracked per clip: a transition requested before
//! both clips are ready is skipped without touching any state, so early
//! triggers are harmless and simply have to be repeated later.

use crate::animation::{ActionKey, AnimationMixer};
use crate::scene::{NodeHandle, Scene};
use crate::stage::snapshot::TransformSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DanceState {
    #[default]
    Idle,
    Dancing,
}

/// Readiness of one animation clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipSlot {
    /// Not requested, or the load failed.
    #[default]
    Absent,
    Loading,
    Ready(ActionKey),
}

impl ClipSlot {
    #[must_use]
    pub fn action(self) -> Option<ActionKey> {
        match self {
            ClipSlot::Ready(key) => Some(key),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, ClipSlot::Ready(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    IdleClipNotReady,
    DanceClipNotReady,
    NoModel,
    AlreadyIdle,
}

/// Outcome of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Skipped(SkipReason),
}

impl Transition {
    #[must_use]
    pub fn is_applied(self) -> bool {
        self == Transition::Applied
    }
}

#[derive(Debug, Default)]
pub struct AnimationStateController {
    state: DanceState,
    model: Option<NodeHandle>,
    idle: ClipSlot,
    dance: ClipSlot,
    snapshot: Option<TransformSnapshot>,
}

impl AnimationStateController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> DanceState {
        self.state
    }

    /// The pose recorded by the last bake, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<TransformSnapshot> {
        self.snapshot
    }

    #[must_use]
    pub fn model(&self) -> Option<NodeHandle> {
        self.model
    }

    #[must_use]
    pub fn idle_clip(&self) -> ClipSlot {
        self.idle
    }

    #[must_use]
    pub fn dance_clip(&self) -> ClipSlot {
        self.dance
    }

    /// The node whose pose is baked when dancing stops.
    pub fn bind_model(&mut self, model: NodeHandle) {
        self.model = Some(model);
    }

    pub fn set_idle_clip(&mut self, slot: ClipSlot) {
        self.idle = slot;
    }

    pub fn set_dance_clip(&mut self, slot: ClipSlot) {
        self.dance = slot;
    }

    fn clips(&self) -> Result<(ActionKey, ActionKey), SkipReason> {
        let idle = self.idle.action().ok_or(SkipReason::IdleClipNotReady)?;
        let dance = self.dance.action().ok_or(SkipReason::DanceClipNotReady)?;
        Ok((idle, dance))
    }

    fn skip(&self, what: &str, reason: SkipReason) -> Transition {
        log::debug!("{what} skipped in {:?}: {reason:?}", self.state);
        Transition::Skipped(reason)
    }

    /// Starts the idle clip as soon as it is ready, before the dance clip
    /// exists. Leaves the state at `Idle`.
    pub fn start_idle(&mut self, mixer: &mut AnimationMixer) -> Transition {
        let Some(idle) = self.idle.action() else {
            return self.skip("start_idle", SkipReason::IdleClipNotReady);
        };

        if let Some(dance) = self.dance.action()
            && let Some(action) = mixer.action_mut(dance)
        {
            action.stop();
        }
        if let Some(action) = mixer.action_mut(idle) {
            action.reset().play();
        }

        self.state = DanceState::Idle;
        log::info!("Idle animation started");
        Transition::Applied
    }

    /// Stops idle and plays the dance clip from its start. While already
    /// dancing this just restarts the dance.
    pub fn enter_dancing(&mut self, mixer: &mut AnimationMixer) -> Transition {
        let (idle, dance) = match self.clips() {
            Ok(keys) => keys,
            Err(reason) => return self.skip("enter_dancing", reason),
        };

        if let Some(action) = mixer.action_mut(idle) {
            action.stop();
        }
        if let Some(action) = mixer.action_mut(dance) {
            action.reset().play();
        }

        if self.state == DanceState::Dancing {
            log::debug!("Dance restarted");
        } else {
            log::info!("Dancing");
        }
        self.state = DanceState::Dancing;
        Transition::Applied
    }

    /// Bakes the model's current world pose into its local transform, then
    /// swaps the dance clip for idle. No-op while already idle.
    pub fn enter_idle(&mut self, scene: &mut Scene, mixer: &mut AnimationMixer) -> Transition {
        let (idle, dance) = match self.clips() {
            Ok(keys) => keys,
            Err(reason) => return self.skip("enter_idle", reason),
        };
        if self.state == DanceState::Idle {
            return self.skip("enter_idle", SkipReason::AlreadyIdle);
        }
        let Some(model) = self.model else {
            return self.skip("enter_idle", SkipReason::NoModel);
        };
        let Some(snapshot) = TransformSnapshot::observe(scene, model) else {
            return self.skip("enter_idle", SkipReason::NoModel);
        };

        self.snapshot = Some(snapshot);
        if let Some(node) = scene.get_node_mut(model) {
            snapshot.apply_to_local(&mut node.transform);
        }
        scene.update_subtree(model);

        if let Some(action) = mixer.action_mut(dance) {
            action.stop();
        }
        if let Some(action) = mixer.action_mut(idle) {
            action.reset().play();
        }

        self.state = DanceState::Idle;
        log::info!(
            "Idle, holding position {:?}",
            snapshot.position().to_array()
        );
        Transition::Applied
    }
}
