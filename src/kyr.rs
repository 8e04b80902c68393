//!
//! KYR multi-track container decoder.
//!
//! ```text
//! [track_count u16]
//! per track, starting at the previous header's end + 10:
//!   [part_id u16][asset_id u16][toc_offset u16][raw_frame_count u16]
//! frame array of a track, at (end of its header) + toc_offset:
//!   (raw_frame_count / 16) x [position i16 x3][rotation i16 x3][4 unknown bytes]
//! ```
//!
//! Values are 8.8 fixed point; rotations are XYZ Euler angles in radians.
//!

use glam::Vec3;
use static_assertions::const_assert_eq;

use crate::archive::Archive;
use crate::base::YukeError;
use crate::math::{dequantize_fixed, quat_from_euler_xyz, KYR_SCALE};
use crate::track::{KyrTrack, PoseSample};

/// Size of one frame of a track.
pub const KYR_FRAME_SIZE: usize = 16;

/// Unknown trailing bytes of a frame.
const KYR_FRAME_TAIL: usize = 4;

/// Distance from the end of a track header to the next track header.
pub const KYR_NEXT_HEADER_OFFSET: usize = 10;

/// `raw_frame_count` counts bytes of frame data.
const KYR_FRAME_COUNT_DIVISOR: u16 = KYR_FRAME_SIZE as u16;

const_assert_eq!(KYR_FRAME_SIZE, 3 * 2 + 3 * 2 + KYR_FRAME_TAIL);

/// Decodes every track of a KYR container.
pub fn decode(bytes: &[u8]) -> Result<Vec<KyrTrack>, YukeError> {
    let mut archive = Archive::new(bytes);
    let track_count: u16 = archive.read()?;
    log::debug!("KYR: {} tracks in {} bytes", track_count, bytes.len());

    let mut tracks = Vec::with_capacity(track_count as usize);
    let mut next_header = archive.position();
    for track in 0..track_count as usize {
        seek_toc(&mut archive, track, next_header)?;

        let part_id: u16 = archive.read()?;
        let asset_id: u16 = archive.read()?;
        let toc_offset: u16 = archive.read()?;
        let raw_frame_count: u16 = archive.read()?;
        let frame_count = (raw_frame_count / KYR_FRAME_COUNT_DIVISOR) as usize;

        let current_pos = archive.position();
        seek_toc(&mut archive, track, current_pos + toc_offset as usize)?;
        log::debug!(
            "KYR: track {} part {} asset {}: {} frames at {}",
            track,
            part_id,
            asset_id,
            frame_count,
            archive.position()
        );

        let mut frames = Vec::with_capacity(frame_count.min(archive.remaining() / KYR_FRAME_SIZE));
        for _ in 0..frame_count {
            frames.push(read_frame(&mut archive)?);
        }
        tracks.push(KyrTrack {
            part_id,
            asset_id,
            frames,
        });

        next_header = current_pos + KYR_NEXT_HEADER_OFFSET;
    }
    Ok(tracks)
}

fn seek_toc(archive: &mut Archive<'_>, track: usize, target: usize) -> Result<(), YukeError> {
    if target > archive.len() {
        return Err(YukeError::CorruptToc {
            track,
            target,
            len: archive.len(),
        });
    }
    archive.seek(target)
}

fn read_frame(archive: &mut Archive<'_>) -> Result<PoseSample, YukeError> {
    let raw = archive.take(KYR_FRAME_SIZE)?;
    let mut frame = Archive::new(raw);
    let mut next = || -> Result<f32, YukeError> { Ok(dequantize_fixed(frame.read::<i16>()?, KYR_SCALE)) };

    let position = Vec3::new(next()?, next()?, next()?);
    let euler = Vec3::new(next()?, next()?, next()?);
    Ok(PoseSample::new(position, quat_from_euler_xyz(euler)))
}
