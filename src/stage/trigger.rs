use crate::config::AutoResumeConfig;
use crate::utils::timer::{Countdown, Interval};

/// An audio-like play/pause switch.
pub trait Playback {
    fn is_paused(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
}

/// A [`Playback`] that only tracks and logs its state.
#[derive(Debug, Clone)]
pub struct PlaybackToggle {
    label: String,
    paused: bool,
}

impl PlaybackToggle {
    #[must_use]
    pub fn new(label: impl Into<String>, playing: bool) -> Self {
        Self {
            label: label.into(),
            paused: !playing,
        }
    }
}

impl Playback for PlaybackToggle {
    fn is_paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) {
        self.paused = false;
        log::info!("Music '{}' playing", self.label);
    }

    fn pause(&mut self) {
        self.paused = true;
        log::info!("Music '{}' paused", self.label);
    }
}

/// What the stage should do in response to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerRequest {
    EnterDancing,
    EnterIdle,
}

/// Turns the manual music toggle and the auto-resume schedule into
/// [`TriggerRequest`]s.
///
/// Auto-resume: every `interval` seconds, if playback is paused and no resume
/// is already pending, a resume is scheduled `delay` seconds later. When it
/// comes due and playback is still paused, playback resumes and
/// `EnterDancing` is returned once.
pub struct PlaybackTrigger<P: Playback> {
    playback: P,
    auto_resume: bool,
    interval: Interval,
    countdown: Countdown,
}

impl<P: Playback> PlaybackTrigger<P> {
    pub fn new(playback: P, config: &AutoResumeConfig) -> Self {
        Self {
            playback,
            auto_resume: config.enabled,
            interval: Interval::new(config.interval_secs),
            countdown: Countdown::new(config.delay_secs),
        }
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    pub fn is_paused(&self) -> bool {
        self.playback.is_paused()
    }

    pub fn resume_pending(&self) -> bool {
        self.countdown.is_active()
    }

    /// Flips playback. Starting playback asks for dancing, pausing asks for
    /// idle.
    pub fn toggle(&mut self) -> TriggerRequest {
        if self.playback.is_paused() {
            self.playback.play();
            self.countdown.cancel();
            TriggerRequest::EnterDancing
        } else {
            self.playback.pause();
            TriggerRequest::EnterIdle
        }
    }

    /// Advances the auto-resume schedule by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Option<TriggerRequest> {
        if !self.auto_resume {
            return None;
        }

        let mut request = None;

        if self.countdown.tick(dt) && self.playback.is_paused() {
            log::info!("Auto-resuming playback");
            self.playback.play();
            request = Some(TriggerRequest::EnterDancing);
        }

        if self.interval.tick(dt) && self.playback.is_paused() && !self.countdown.is_active() {
            log::debug!("Playback paused, resume scheduled");
            self.countdown.start();
        }

        request
    }
}
