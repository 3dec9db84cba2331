//! Playback trigger tests
//!
//! Tests for:
//! - Manual toggle requests
//! - Auto-resume: interval, delay, exactly one EnterDancing per paused period
//! - Manual play cancelling a pending resume

use dancehall::config::AutoResumeConfig;
use dancehall::stage::{Playback, PlaybackToggle, PlaybackTrigger, TriggerRequest};

const DT: f32 = 0.5;

fn paused_trigger() -> PlaybackTrigger<PlaybackToggle> {
    PlaybackTrigger::new(PlaybackToggle::new("test", false), &AutoResumeConfig::default())
}

/// Ticks for `seconds` and collects every request.
fn run_for(trigger: &mut PlaybackTrigger<PlaybackToggle>, seconds: f32) -> Vec<TriggerRequest> {
    let steps = (seconds / DT).round() as usize;
    (0..steps).filter_map(|_| trigger.tick(DT)).collect()
}

#[test]
fn toggle_alternates_requests() {
    let mut trigger = paused_trigger();
    assert!(trigger.is_paused());

    assert_eq!(trigger.toggle(), TriggerRequest::EnterDancing);
    assert!(!trigger.is_paused());
    assert_eq!(trigger.toggle(), TriggerRequest::EnterIdle);
    assert!(trigger.is_paused());
}

#[test]
fn auto_resume_fires_after_interval_plus_delay() {
    let mut trigger = paused_trigger();

    // Nothing before the first interval boundary at 5 s.
    assert!(run_for(&mut trigger, 4.5).is_empty());
    assert!(!trigger.resume_pending());

    // At 5 s a resume is scheduled 3 s out.
    assert!(run_for(&mut trigger, 0.5).is_empty());
    assert!(trigger.resume_pending());
    assert!(trigger.is_paused());

    assert!(run_for(&mut trigger, 2.5).is_empty());
    assert_eq!(trigger.tick(DT), Some(TriggerRequest::EnterDancing));
    assert!(!trigger.is_paused());
    assert!(!trigger.playback().is_paused());
}

#[test]
fn no_duplicate_fires_while_playing() {
    let mut trigger = paused_trigger();
    let requests = run_for(&mut trigger, 8.0);
    assert_eq!(requests, vec![TriggerRequest::EnterDancing]);

    assert!(run_for(&mut trigger, 60.0).is_empty());
    assert!(!trigger.resume_pending());
}

#[test]
fn one_resume_per_paused_period() {
    let mut trigger = paused_trigger();
    let mut fired = 0;

    for _ in 0..3 {
        let requests = run_for(&mut trigger, 10.0);
        fired += requests
            .iter()
            .filter(|r| **r == TriggerRequest::EnterDancing)
            .count();
        assert!(!trigger.is_paused());
        // Pause again, as the user would.
        assert_eq!(trigger.toggle(), TriggerRequest::EnterIdle);
    }

    assert_eq!(fired, 3);
}

#[test]
fn manual_play_cancels_pending_resume() {
    let mut trigger = paused_trigger();
    run_for(&mut trigger, 5.0);
    assert!(trigger.resume_pending());

    assert_eq!(trigger.toggle(), TriggerRequest::EnterDancing);
    assert!(!trigger.resume_pending());
    assert!(run_for(&mut trigger, 10.0).is_empty());
}

#[test]
fn disabled_auto_resume_never_fires() {
    let config = AutoResumeConfig {
        enabled: false,
        ..AutoResumeConfig::default()
    };
    let mut trigger = PlaybackTrigger::new(PlaybackToggle::new("test", false), &config);
    assert!(run_for(&mut trigger, 30.0).is_empty());
    assert!(trigger.is_paused());
}
