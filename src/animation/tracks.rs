use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// How far the cursor scans linearly before falling back to binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the keyframe interval found by the previous sample, so steady
/// playback resolves the next one in O(1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    /// For `CubicSpline` this holds `(in_tangent, value, out_tangent)` triples,
    /// so its length is `times.len() * 3`.
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last keyframe.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Samples without a cursor. `None` for an empty track.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let next_idx = self.times.partition_point(|&t| t <= time);
        Some(self.sample_at_frame(next_idx.saturating_sub(1), time))
    }

    /// Samples using and updating `cursor`.
    ///
    /// Times before the first key clamp to the first value, times after the
    /// last key clamp to the last value.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        let len = self.times.len();
        match len {
            0 => return None,
            1 => return Some(self.value_at(0)),
            _ => {}
        }

        let i = cursor.last_index.min(len - 1);
        let found = if time >= self.times[i] {
            self.scan_forward(i, time)
        } else {
            self.scan_backward(i, time)
        };

        let index = found.unwrap_or_else(|| {
            // Large jump, e.g. a loop wrap or a reset.
            self.times.partition_point(|&t| t <= time).saturating_sub(1)
        });
        cursor.last_index = index;

        Some(self.sample_at_frame(index, time))
    }

    fn scan_forward(&self, start: usize, time: f32) -> Option<usize> {
        let len = self.times.len();
        for idx in start..=start + MAX_SCAN_OFFSET {
            if idx >= len - 1 {
                return Some(len - 1);
            }
            if time < self.times[idx + 1] {
                return Some(idx);
            }
        }
        None
    }

    fn scan_backward(&self, start: usize, time: f32) -> Option<usize> {
        for offset in 1..=MAX_SCAN_OFFSET {
            let idx = start.checked_sub(offset)?;
            if time >= self.times[idx] {
                return Some(idx);
            }
        }
        None
    }

    fn value_at(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();
        if index >= len - 1 {
            return self.value_at(len - 1);
        }

        let next = index + 1;
        let t0 = self.times[index];
        let dt = self.times[next] - t0;
        let t = if dt > 1e-6 { ((time - t0) / dt).clamp(0.0, 1.0) } else { 0.0 };

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.value_at(index), self.value_at(next), t)
            }
            InterpolationMode::CubicSpline => {
                let a = index * 3;
                let b = next * 3;
                T::interpolate_cubic(
                    self.values[a + 1],
                    self.values[a + 2],
                    self.values[b],
                    self.values[b + 1],
                    t,
                    dt,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn ramp() -> KeyframeTrack<Vec3> {
        KeyframeTrack::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
            (0..8).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect(),
            InterpolationMode::Linear,
        )
    }

    #[test]
    fn cursor_matches_binary_search() {
        let track = ramp();
        let mut cursor = KeyframeCursor::default();
        for step in 0..80 {
            let time = step as f32 * 0.1;
            let a = track.sample_with_cursor(time, &mut cursor).unwrap();
            let b = track.sample(time).unwrap();
            assert!((a - b).length() < 1e-5, "mismatch at {time}");
        }
    }

    #[test]
    fn cursor_survives_wrap_back_to_start() {
        let track = ramp();
        let mut cursor = KeyframeCursor::default();
        track.sample_with_cursor(6.5, &mut cursor);
        assert_eq!(cursor.last_index, 6);

        let v = track.sample_with_cursor(0.5, &mut cursor).unwrap();
        assert!((v.x - 0.5).abs() < 1e-5);
        assert_eq!(cursor.last_index, 0);
    }

    #[test]
    fn samples_clamp_outside_range() {
        let track = ramp();
        let mut cursor = KeyframeCursor::default();
        assert_eq!(track.sample_with_cursor(-1.0, &mut cursor), Some(Vec3::ZERO));
        assert_eq!(
            track.sample_with_cursor(100.0, &mut cursor),
            Some(Vec3::new(7.0, 0.0, 0.0))
        );
    }

    #[test]
    fn step_holds_previous_key() {
        let track = KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Vec3::ZERO, Vec3::ONE],
            InterpolationMode::Step,
        );
        assert_eq!(track.sample(0.99), Some(Vec3::ZERO));
        assert_eq!(track.sample(1.0), Some(Vec3::ONE));
    }

    #[test]
    fn empty_track_samples_nothing() {
        let track: KeyframeTrack<Vec3> =
            KeyframeTrack::new(Vec::new(), Vec::new(), InterpolationMode::Linear);
        assert!(track.sample(0.0).is_none());
        assert!(track.sample_with_cursor(0.0, &mut KeyframeCursor::default()).is_none());
    }
}
