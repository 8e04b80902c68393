//!
//! JBI frame stream decoder.
//!
//! A JBI stream is a sequence of variable-length records:
//!
//! ```text
//! [indicator u8]
//! [extended block, 9 bytes]       only if indicator & 0x20
//! [position i16 x3][rotation i16 x4 (x, y, z, w)]
//! [padding, frame_size - bias bytes]
//! ```
//!
//! with `frame_size = ((indicator - 0x80) & 0xFF) << 1`. Values are 0.01 fixed
//! point. Record boundaries are only known from the previous record, so a
//! damaged record fails the whole decode.
//!

use glam::{Quat, Vec3};

use crate::archive::Archive;
use crate::base::{YukeError, FRAME_SIZE_BIAS};
use crate::config::JbiConfig;
use crate::math::{dequantize_fixed, FIXED_SCALE};
use crate::track::PoseSample;

/// Size of the opaque block preceding some frames.
pub const EXTENDED_BLOCK_SIZE: usize = 9;

/// Indicator bit announcing an extended block.
pub const EXTENDED_BLOCK_FLAG: u8 = 0x20;

/// Header derived from a record's indicator byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rkyv", derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JbiFrameHeader {
    pub frame_size: u16,
    pub has_extended_block: bool,
}

impl JbiFrameHeader {
    /// Decodes an indicator byte.
    #[inline]
    pub fn from_indicator(indicator: u8) -> JbiFrameHeader {
        JbiFrameHeader {
            frame_size: (indicator.wrapping_sub(FRAME_SIZE_BIAS) as u16) << 1,
            has_extended_block: indicator & EXTENDED_BLOCK_FLAG != 0,
        }
    }
}

/// A decoded record, keeping the extended block bytes for callers that
/// need to preserve them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JbiFrame {
    pub header: JbiFrameHeader,
    pub extended_block: Option<[u8; EXTENDED_BLOCK_SIZE]>,
    pub pose: PoseSample,
}

/// JBI decoder.
#[derive(Debug, Default, Clone)]
pub struct JbiDecoder {
    config: JbiConfig,
}

impl JbiDecoder {
    /// Creates a decoder with default options.
    pub fn new() -> JbiDecoder {
        JbiDecoder::default()
    }

    /// Creates a decoder with custom options.
    pub fn with_config(config: JbiConfig) -> JbiDecoder {
        JbiDecoder { config }
    }

    /// Decodes all records of a stream.
    pub fn decode_frames(&self, bytes: &[u8]) -> Result<Vec<JbiFrame>, YukeError> {
        let mut archive = Archive::new(bytes);
        let mut frames = Vec::new();
        while !archive.is_eof() {
            frames.push(self.decode_frame(&mut archive)?);
        }
        log::debug!("JBI: decoded {} frames from {} bytes", frames.len(), bytes.len());
        Ok(frames)
    }

    /// Decodes all poses of a stream, in playback order.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<PoseSample>, YukeError> {
        Ok(self.decode_frames(bytes)?.into_iter().map(|frame| frame.pose).collect())
    }

    fn decode_frame(&self, archive: &mut Archive<'_>) -> Result<JbiFrame, YukeError> {
        let offset = archive.position();
        let indicator: u8 = archive.read()?;
        let header = JbiFrameHeader::from_indicator(indicator);

        let padding = header.frame_size as i32 - self.config.padding_bias as i32;
        if padding < 0 {
            return Err(YukeError::MalformedHeader {
                offset,
                indicator,
                frame_size: header.frame_size,
            });
        }

        let extended_block = match header.has_extended_block {
            true => Some(archive.read_array::<EXTENDED_BLOCK_SIZE>()?),
            false => None,
        };

        let x: i16 = archive.read()?;
        let y: i16 = archive.read()?;
        let z: i16 = archive.read()?;
        let position = Vec3::new(
            dequantize_fixed(x, FIXED_SCALE),
            dequantize_fixed(y, FIXED_SCALE),
            dequantize_fixed(z, FIXED_SCALE),
        );

        let qx: i16 = archive.read()?;
        let qy: i16 = archive.read()?;
        let qz: i16 = archive.read()?;
        let qw: i16 = archive.read()?;
        let rotation = Quat::from_xyzw(
            dequantize_fixed(qx, FIXED_SCALE),
            dequantize_fixed(qy, FIXED_SCALE),
            dequantize_fixed(qz, FIXED_SCALE),
            dequantize_fixed(qw, FIXED_SCALE),
        );

        archive.skip(padding as usize)?;

        Ok(JbiFrame {
            header,
            extended_block,
            pose: PoseSample::new(position, rotation),
        })
    }
}

/// Decodes a JBI stream with default options.
pub fn decode(bytes: &[u8]) -> Result<Vec<PoseSample>, YukeError> {
    JbiDecoder::new().decode(bytes)
}

/// Decodes a JBI stream with default options, keeping record headers.
pub fn decode_frames(bytes: &[u8]) -> Result<Vec<JbiFrame>, YukeError> {
    JbiDecoder::new().decode_frames(bytes)
}
