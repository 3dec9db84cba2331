//! Utilities
//!
//! - [`OrbitControls`]: mouse-driven orbit camera
//! - [`FrameClock`]: capped wall-clock frame delta
//! - [`Interval`] / [`Countdown`]: delta-driven timers used by the auto-resume schedule

pub mod orbit_control;
pub mod time;
pub mod timer;

pub use orbit_control::OrbitControls;
pub use time::FrameClock;
pub use timer::{Countdown, Interval};
