//!
//! Reader for YKA streams written in the corrected layout.
//!
//! The stream does not store its joint count, so the caller supplies it.
//! Consecutive sub-records are joined until a frame holds its positional
//! block and every joint rotation.
//!

use glam::Vec3;

use crate::archive::Archive;
use crate::base::{YukeError, FRAME_SIZE_BIAS, INTERPOLATION_PLACEHOLDER, JOINT_COUNT_BIAS, MARKER_FLAG};
use crate::yka::{MARKER_BLOCK_SIZE, POSITION_BLOCK_SIZE, POSITION_REFERENCE, ROTATION_BLOCK_SIZE};

/// A frame read back from a YKA stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YkaFrame {
    /// Quantized X, Y, Z offsets from the reference baseline.
    pub position_offsets: [i16; 3],
    /// (yaw, pitch, roll) per joint in hierarchy pre-order.
    pub rotations: Vec<[i8; 3]>,
    /// (sprite, sound) of the frame marker.
    pub marker: Option<(u8, u8)>,
}

impl YkaFrame {
    /// Recovers the root position from the scale the frame was encoded with.
    pub fn position(&self, scale: f64) -> Vec3 {
        let [x, y, z] = self.position_offsets.map(|offset| (offset as f64 / scale) as f32);
        Vec3::new(x, y, z)
    }

    /// Joint rotations as XYZ Euler angles in radians.
    pub fn euler_rotations(&self) -> Vec<Vec3> {
        self.rotations
            .iter()
            .map(|angles| {
                let [yaw, pitch, roll] = angles.map(|angle| (angle as f32 / 128.0 * 180.0).to_radians());
                Vec3::new(pitch, roll, yaw)
            })
            .collect()
    }
}

/// Reads every frame of a stream encoded for `joint_count` joints.
pub fn decode(bytes: &[u8], joint_count: usize) -> Result<Vec<YkaFrame>, YukeError> {
    YukeError::check_joint_count(joint_count)?;
    let mut archive = Archive::new(bytes);
    let mut frames = Vec::new();
    while !archive.is_eof() {
        frames.push(decode_frame(&mut archive, joint_count)?);
    }
    log::debug!("YKA: read {} frames of {} joints", frames.len(), joint_count);
    Ok(frames)
}

fn decode_frame(archive: &mut Archive<'_>, joint_count: usize) -> Result<YkaFrame, YukeError> {
    let body_len = POSITION_BLOCK_SIZE + ROTATION_BLOCK_SIZE * joint_count;
    let mut body = Vec::with_capacity(body_len.min(archive.remaining()));
    let mut marker = None;

    while body.len() < body_len {
        let offset = archive.position();
        let size_byte: u8 = archive.read()?;
        let count_byte: u8 = archive.read()?;
        let malformed = || YukeError::MalformedHeader {
            offset,
            indicator: size_byte,
            frame_size: size_byte.wrapping_sub(FRAME_SIZE_BIAS) as u16,
        };

        let frame_size = size_byte.checked_sub(FRAME_SIZE_BIAS).ok_or_else(malformed)? as usize;
        let num_joints = count_byte.checked_sub(JOINT_COUNT_BIAS).ok_or_else(malformed)? as usize;
        if frame_size != num_joints + 1 {
            return Err(malformed());
        }

        let chunk_len = num_joints.min(body_len - body.len());
        body.extend_from_slice(archive.take(chunk_len)?);
        if archive.read::<u8>()? != INTERPOLATION_PLACEHOLDER {
            return Err(malformed());
        }

        let trailer_len = num_joints - chunk_len;
        if trailer_len > 0 {
            if trailer_len != MARKER_BLOCK_SIZE || body.len() < body_len {
                return Err(malformed());
            }
            let [flag, sprite, sound] = archive.read_array::<MARKER_BLOCK_SIZE>()?;
            if flag != MARKER_FLAG {
                return Err(malformed());
            }
            marker = Some((sprite, sound));
        }
    }

    let position_offsets = [0usize, 2, 4].map(|idx| body[idx] as i16 - POSITION_REFERENCE[idx] as i16);
    let rotations = body[POSITION_BLOCK_SIZE..]
        .chunks_exact(ROTATION_BLOCK_SIZE)
        .map(|bytes| [bytes[0] as i8, bytes[1] as i8, bytes[2] as i8])
        .collect();
    Ok(YkaFrame {
        position_offsets,
        rotations,
        marker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::HIERARCHY_MAX_JOINTS;
    use crate::marker::MarkerEntry;
    use crate::skeleton::{JointHierarchy, JointRotation};
    use crate::yka::{encode, position_scale, FrameInput};

    fn fan(joints: usize) -> JointHierarchy {
        let mut h = JointHierarchy::new();
        let root = h.add_root("root", JointRotation::default()).unwrap();
        for i in 1..joints {
            let euler = Vec3::new(0.0, 0.0, i as f32 * 0.01);
            h.add_child(root, &format!("joint{}", i), JointRotation::Euler(euler)).unwrap();
        }
        h
    }

    #[test]
    fn test_zero_round_trip() {
        let h = fan(4);
        let buf = encode(&FrameInput::new(Vec3::ZERO, &h)).unwrap();
        let frames = decode(&buf, 4).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].position_offsets, [0, 0, 0]);
        let (scale, _) = position_scale(Vec3::ZERO);
        assert!(frames[0].position(scale).abs_diff_eq(Vec3::ZERO, 1.0 / scale as f32));
        assert_eq!(frames[0].marker, None);
    }

    #[test]
    fn test_position_round_trip() {
        let h = fan(1);
        let position = Vec3::new(0.2, -0.07, 0.05);
        let buf = encode(&FrameInput::new(position, &h)).unwrap();
        let frame = &decode(&buf, 1).unwrap()[0];
        let (scale, _) = position_scale(position);
        // Y and Z stay inside the byte range around their reference bytes.
        let decoded = frame.position(scale);
        assert!((decoded.y - position.y).abs() <= 1.0 / scale as f32);
        assert!((decoded.z - position.z).abs() <= 1.0 / scale as f32);
        assert_eq!(frame.position_offsets[0], 0xFF - 0x66);
    }

    #[test]
    fn test_split_round_trip() {
        let h = fan(60);
        let marker = MarkerEntry::new(7, 0xCA, 1);
        let mut buf = encode(&FrameInput::new(Vec3::ZERO, &h).with_marker(Some(marker))).unwrap();
        buf.extend(encode(&FrameInput::new(Vec3::ZERO, &h)).unwrap());

        let frames = decode(&buf, 60).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].marker, Some((1, 0xCA)));
        assert_eq!(frames[1].marker, None);
        assert_eq!(frames[0].rotations.len(), 60);
        assert_eq!(frames[0].rotations, frames[1].rotations);

        let rotations = frames[0].euler_rotations();
        for (i, rotation) in rotations.iter().enumerate() {
            assert!((rotation.z - i as f32 * 0.01).abs() < 0.025, "joint {}", i);
        }
    }

    #[test]
    fn test_malformed() {
        let h = fan(1);
        let mut buf = encode(&FrameInput::new(Vec3::ZERO, &h)).unwrap();
        buf[0] = 0x8B;
        assert!(decode(&buf, 1).unwrap_err().is_malformed_header());

        let mut buf = encode(&FrameInput::new(Vec3::ZERO, &h)).unwrap();
        buf[11] = 0x00;
        assert!(decode(&buf, 1).unwrap_err().is_malformed_header());

        let buf = encode(&FrameInput::new(Vec3::ZERO, &h)).unwrap();
        assert!(decode(&buf[..buf.len() - 1], 1).unwrap_err().is_truncated_stream());
        assert!(decode(&buf, 0).unwrap_err().is_unsupported_hierarchy());
        assert!(decode(&buf, HIERARCHY_MAX_JOINTS + 1).unwrap_err().is_unsupported_hierarchy());
        assert!(decode(&buf, usize::MAX / 4).unwrap_err().is_unsupported_hierarchy());
    }

    #[test]
    fn test_joint_count_beyond_stream() {
        // A valid count larger than the stream runs out of bytes instead of
        // reserving the whole frame up front.
        let buf = encode(&FrameInput::new(Vec3::ZERO, &fan(1))).unwrap();
        assert!(decode(&buf, HIERARCHY_MAX_JOINTS).unwrap_err().is_truncated_stream());
    }
}
