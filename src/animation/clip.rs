use glam::{Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::tracks::KeyframeTrack;

#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub node_name: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

impl TrackData {
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            TrackData::Vector3(t) => t.end_time(),
            TrackData::Quaternion(t) => t.end_time(),
        }
    }
}

/// A track together with the node property it animates.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    #[must_use]
    pub fn translation(node_name: impl Into<String>, track: KeyframeTrack<Vec3>) -> Self {
        Self::new(node_name, TargetPath::Translation, TrackData::Vector3(track))
    }

    #[must_use]
    pub fn rotation(node_name: impl Into<String>, track: KeyframeTrack<Quat>) -> Self {
        Self::new(node_name, TargetPath::Rotation, TrackData::Quaternion(track))
    }

    #[must_use]
    pub fn scale(node_name: impl Into<String>, track: KeyframeTrack<Vec3>) -> Self {
        Self::new(node_name, TargetPath::Scale, TrackData::Vector3(track))
    }

    fn new(node_name: impl Into<String>, target: TargetPath, data: TrackData) -> Self {
        Self {
            meta: TrackMeta {
                node_name: node_name.into(),
                target,
            },
            data,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Duration is the latest keyframe time over all tracks.
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }
}
