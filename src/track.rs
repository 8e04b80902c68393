//!
//! Decoded pose data structures.
//!

use glam::{Quat, Vec3};

/// One decoded animation frame: a position and a rotation.
///
/// Rotations are rebuilt from fixed-point components and are not
/// re-normalized, so a sample carries exactly what the stream stored.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "rkyv", derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseSample {
    pub position: Vec3,
    pub rotation: Quat,
}

impl PoseSample {
    /// Creates a new `PoseSample`.
    #[inline]
    pub fn new(position: Vec3, rotation: Quat) -> PoseSample {
        PoseSample { position, rotation }
    }

    /// Compare two samples with a maximum difference per component.
    #[inline]
    pub fn abs_diff_eq(&self, other: &PoseSample, diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, diff) && self.rotation.abs_diff_eq(other.rotation, diff)
    }
}

/// One animation entry of a KYR container.
///
/// Frames are ordered by playback time, the first frame is frame 0.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "rkyv", derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KyrTrack {
    pub part_id: u16,
    pub asset_id: u16,
    pub frames: Vec<PoseSample>,
}

impl KyrTrack {
    /// The frame count of the track.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Track frames.
    #[inline]
    pub fn frames(&self) -> &[PoseSample] {
        &self.frames
    }
}
