//!
//! YKA frame stream encoder.
//!
//! One armature frame is written as:
//!
//! ```text
//! [0x80 + frame_size][0x10 + num_joints]
//! [x][0x30][y][0xE7][z][0x05]            root position against the reference baseline
//! [yaw i8][pitch i8][roll i8] per joint   hierarchy pre-order
//! [0x10]                                 interpolation placeholder
//! [0x02][sprite][sound]                  only on frames carrying a marker
//! ```
//!
//! with `num_joints` counting the bytes after the header except the
//! placeholder and `frame_size = num_joints + 1`. Since the size byte is
//! biased by 0x80, a record carries at most 126 bytes; larger frames are
//! partitioned across consecutive sub-records, the marker going into the
//! last one.
//!

use glam::{Quat, Vec3};
use static_assertions::const_assert_eq;
use std::io::Write;

use crate::archive::ArchiveWriter;
use crate::base::{
    YukeError, FRAME_SIZE_BIAS, INTERPOLATION_PLACEHOLDER, JOINT_COUNT_BIAS, MARKER_FLAG, MAX_RECORD_SIZE,
};
use crate::config::YkaConfig;
use crate::marker::MarkerEntry;
use crate::math::{quantize_fixed, quat_to_euler_xyz, saturate_i8, saturate_u8, FIXED_SCALE};
use crate::skeleton::JointHierarchy;

/// Root position bytes every record starts from. Bytes 0, 2 and 4 carry the
/// X, Y and Z offsets.
pub const POSITION_REFERENCE: [u8; 6] = [0x66, 0x30, 0xB0, 0xE7, 0x0D, 0x05];

/// Size of the positional block.
pub const POSITION_BLOCK_SIZE: usize = 6;

/// Bytes per joint.
pub const ROTATION_BLOCK_SIZE: usize = 3;

/// Size of `[flag][sprite][sound]`.
pub const MARKER_BLOCK_SIZE: usize = 3;

/// Largest `num_joints` a single record can declare.
pub const MAX_RECORD_PAYLOAD: usize = MAX_RECORD_SIZE - 1;

/// Camera data: position and Euler rotation, 3 x `i16` each.
pub const CAMERA_BLOCK_SIZE: usize = 12;

/// Light data: camera data and a `f32` intensity.
pub const LIGHT_BLOCK_SIZE: usize = 16;

const_assert_eq!(POSITION_BLOCK_SIZE, POSITION_REFERENCE.len());
const_assert_eq!(CAMERA_BLOCK_SIZE, 3 * 2 + 3 * 2);
const_assert_eq!(LIGHT_BLOCK_SIZE, CAMERA_BLOCK_SIZE + 4);

/// Below this magnitude the root is considered still.
const STILL_THRESHOLD: f64 = 0.0001;

/// Scaled magnitude of the largest position axis.
const POSITION_RANGE: f64 = 255.0;

/// Value of pi used by the reference exporter for degree conversion.
const REFERENCE_PI: f64 = 3.14159;

/// Zero bytes closing camera and light records in bit-exact mode.
const FIXED_RECORD_TAIL: [u8; 2] = [0x00, 0x00];

/// Input of one armature frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Root position in game units.
    pub root_position: Vec3,
    pub hierarchy: &'a JointHierarchy,
    /// Marker of this frame, if any.
    pub marker: Option<MarkerEntry>,
}

impl<'a> FrameInput<'a> {
    /// Creates a frame without marker.
    pub fn new(root_position: Vec3, hierarchy: &'a JointHierarchy) -> FrameInput<'a> {
        FrameInput {
            root_position,
            hierarchy,
            marker: None,
        }
    }

    /// Attaches a marker to the frame.
    pub fn with_marker(mut self, marker: Option<MarkerEntry>) -> FrameInput<'a> {
        self.marker = marker;
        self
    }
}

/// Input of one camera frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CameraInput {
    pub position: Vec3,
    pub rotation: Quat,
    pub marker: Option<MarkerEntry>,
}

/// Input of one light frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LightInput {
    pub position: Vec3,
    pub rotation: Quat,
    pub intensity: f32,
    pub marker: Option<MarkerEntry>,
}

/// Size accounting of an armature frame, computed before anything is written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    /// Factor applied to the root position before quantization.
    pub scale: f64,
    /// Byte widths of the scaled position axes, summed. Only the bit-exact
    /// mode declares it in the header.
    pub advisory_footprint: usize,
    /// Positional bytes declared in the header.
    pub footprint: usize,
    /// Declared `num_joints` of the whole frame.
    pub num_joints: usize,
    /// Declared `frame_size` of the whole frame.
    pub frame_size: usize,
    /// Number of records the frame is written as.
    pub sub_records: usize,
}

/// Computes the position scale and the advisory positional footprint.
pub fn position_scale(position: Vec3) -> (f64, usize) {
    let max_abs = position.abs().max_element() as f64;
    if max_abs.is_nan() || max_abs < STILL_THRESHOLD {
        return (1.0, POSITION_BLOCK_SIZE);
    }
    let scale = POSITION_RANGE / max_abs;
    let footprint = position
        .to_array()
        .iter()
        .map(|value| axis_footprint((*value as f64 * scale).abs()))
        .sum();
    (scale, footprint)
}

#[inline]
fn axis_footprint(scaled: f64) -> usize {
    if scaled > 100.0 {
        4
    } else if scaled > 10.0 {
        3
    } else if scaled > 1.0 {
        2
    } else {
        1
    }
}

/// Quantizes a root position against `POSITION_REFERENCE`.
pub fn quantize_position(position: Vec3, scale: f64, truncate: bool) -> [u8; POSITION_BLOCK_SIZE] {
    let mut block = POSITION_REFERENCE;
    for (axis, value) in position.to_array().into_iter().enumerate() {
        let scaled = value as f64 * scale;
        let offset = match truncate {
            true => scaled.trunc(),
            false => scaled.round(),
        };
        let idx = axis * 2;
        block[idx] = saturate_u8((offset as i32).saturating_add(POSITION_REFERENCE[idx] as i32));
    }
    block
}

/// Quantizes an angle in radians to a signed byte, 180 degrees mapping to the
/// top of the range.
///
/// The corrected path scales by 128 so -180 and 180 degrees reach -128 and 127
/// after clamping; the truncating path keeps the 127 factor of the reference
/// exporter.
pub fn quantize_angle(radians: f32, truncate: bool) -> i8 {
    let quantized = match truncate {
        true => radians as f64 * (180.0 / REFERENCE_PI) / 180.0 * 127.0,
        false => ((radians as f64).to_degrees() / 180.0 * 128.0).round(),
    };
    saturate_i8(quantized as i32)
}

/// Lengths of the body chunks of consecutive sub-records. The last chunk is
/// never empty, so a reader knows the frame ends with the record holding
/// the trailer.
fn partition(body_len: usize, trailer_len: usize) -> Vec<usize> {
    let mut chunks = Vec::with_capacity(body_len / MAX_RECORD_PAYLOAD + 1);
    let mut rest = body_len;
    while rest + trailer_len > MAX_RECORD_PAYLOAD {
        let take = (rest - 1).min(MAX_RECORD_PAYLOAD);
        chunks.push(take);
        rest -= take;
    }
    chunks.push(rest);
    chunks
}

fn header_byte(bias: u8, value: usize) -> Result<u8, YukeError> {
    u8::try_from(value)
        .ok()
        .and_then(|value| bias.checked_add(value))
        .ok_or_else(|| YukeError::unsupported(format!("record size {} does not fit the header", value)))
}

fn write_record<W: Write>(
    writer: &mut ArchiveWriter<W>,
    frame_size: usize,
    num_joints: usize,
    data: &[u8],
    trailer: &[u8],
) -> Result<(), YukeError> {
    writer.write(header_byte(FRAME_SIZE_BIAS, frame_size)?)?;
    writer.write(header_byte(JOINT_COUNT_BIAS, num_joints)?)?;
    writer.write_bytes(data)?;
    writer.write(INTERPOLATION_PLACEHOLDER)?;
    writer.write_bytes(trailer)
}

fn marker_block(marker: &MarkerEntry) -> [u8; MARKER_BLOCK_SIZE] {
    [MARKER_FLAG, marker.sprite_id, marker.sound_id]
}

/// YKA encoder.
#[derive(Debug, Default, Clone)]
pub struct YkaEncoder {
    config: YkaConfig,
}

impl YkaEncoder {
    /// Creates an encoder with default options.
    pub fn new() -> YkaEncoder {
        YkaEncoder::default()
    }

    /// Creates an encoder with custom options.
    pub fn with_config(config: YkaConfig) -> YkaEncoder {
        YkaEncoder { config }
    }

    #[inline]
    pub fn config(&self) -> &YkaConfig {
        &self.config
    }

    /// Computes the size accounting of a frame.
    pub fn plan_frame(&self, input: &FrameInput<'_>) -> Result<FramePlan, YukeError> {
        let joints = input.hierarchy.num_joints();
        YukeError::check_joint_count(joints)?;

        let (scale, advisory_footprint) = position_scale(input.root_position);
        let marker_len = input.marker.map_or(0, |_| MARKER_BLOCK_SIZE);
        let rotations_len = ROTATION_BLOCK_SIZE * joints;

        if self.config.is_bit_exact() {
            let num_joints = advisory_footprint + rotations_len + marker_len;
            let frame_size = num_joints + 1;
            if frame_size > MAX_RECORD_SIZE {
                return Err(YukeError::unsupported(format!(
                    "frame size {} exceeds {} bytes",
                    frame_size, MAX_RECORD_SIZE
                )));
            }
            return Ok(FramePlan {
                scale,
                advisory_footprint,
                footprint: advisory_footprint,
                num_joints,
                frame_size,
                sub_records: 1,
            });
        }

        let num_joints = POSITION_BLOCK_SIZE + rotations_len + marker_len;
        Ok(FramePlan {
            scale,
            advisory_footprint,
            footprint: POSITION_BLOCK_SIZE,
            num_joints,
            frame_size: num_joints + 1,
            sub_records: partition(POSITION_BLOCK_SIZE + rotations_len, marker_len).len(),
        })
    }

    /// Writes an armature frame, returning its size accounting.
    pub fn encode_frame<W: Write>(
        &self,
        input: &FrameInput<'_>,
        writer: &mut ArchiveWriter<W>,
    ) -> Result<FramePlan, YukeError> {
        let plan = self.plan_frame(input)?;
        let truncate = self.config.is_bit_exact();
        log::trace!(
            "YKA: root {:?} scale {:.4} footprint {} frame_size {}",
            input.root_position,
            plan.scale,
            plan.footprint,
            plan.frame_size
        );

        let mut body = Vec::with_capacity(POSITION_BLOCK_SIZE + ROTATION_BLOCK_SIZE * input.hierarchy.num_joints());
        body.extend_from_slice(&quantize_position(input.root_position, plan.scale, truncate));
        for euler in input.hierarchy.euler_rotations() {
            let yaw = quantize_angle(euler.z, truncate);
            let pitch = quantize_angle(euler.x, truncate);
            let roll = quantize_angle(euler.y, truncate);
            body.extend_from_slice(&[yaw as u8, pitch as u8, roll as u8]);
        }

        let marker = input.marker.as_ref().map(marker_block);
        let trailer: &[u8] = marker.as_ref().map_or(&[][..], |block| &block[..]);

        if truncate {
            write_record(writer, plan.frame_size, plan.num_joints, &body, trailer)?;
            return Ok(plan);
        }

        if plan.sub_records > 1 {
            log::warn!(
                "YKA: frame of {} bytes split into {} sub-records",
                plan.frame_size,
                plan.sub_records
            );
        }
        let chunks = partition(body.len(), trailer.len());
        let mut rest = &body[..];
        for (idx, len) in chunks.iter().enumerate() {
            let (chunk, tail) = rest.split_at(*len);
            let chunk_trailer = if idx + 1 == chunks.len() { trailer } else { &[] };
            let num_joints = chunk.len() + chunk_trailer.len();
            write_record(writer, num_joints + 1, num_joints, chunk, chunk_trailer)?;
            rest = tail;
        }
        Ok(plan)
    }

    /// Encodes an armature frame into a new buffer.
    pub fn encode(&self, input: &FrameInput<'_>) -> Result<Vec<u8>, YukeError> {
        let mut writer = ArchiveWriter::new(Vec::new());
        self.encode_frame(input, &mut writer)?;
        Ok(writer.into_inner())
    }

    /// Writes a camera frame. The layout is provisional.
    pub fn encode_camera<W: Write>(&self, input: &CameraInput, writer: &mut ArchiveWriter<W>) -> Result<(), YukeError> {
        let mut data = ArchiveWriter::new(Vec::with_capacity(CAMERA_BLOCK_SIZE));
        write_camera_block(&mut data, input.position, input.rotation)?;
        self.write_fixed_record(writer, &data.into_inner(), input.marker.is_some())
    }

    /// Writes a light frame. The layout is provisional.
    pub fn encode_light<W: Write>(&self, input: &LightInput, writer: &mut ArchiveWriter<W>) -> Result<(), YukeError> {
        let mut data = ArchiveWriter::new(Vec::with_capacity(LIGHT_BLOCK_SIZE));
        write_camera_block(&mut data, input.position, input.rotation)?;
        data.write(input.intensity)?;
        self.write_fixed_record(writer, &data.into_inner(), input.marker.is_some())
    }

    fn write_fixed_record<W: Write>(
        &self,
        writer: &mut ArchiveWriter<W>,
        data: &[u8],
        flagged: bool,
    ) -> Result<(), YukeError> {
        let flag: &[u8] = if flagged { &[MARKER_FLAG] } else { &[] };
        let num_joints = data.len() + flag.len();
        if !self.config.is_bit_exact() {
            return write_record(writer, num_joints + 1, num_joints, data, flag);
        }
        // The reference exporter writes the count byte without bias.
        writer.write(header_byte(FRAME_SIZE_BIAS, num_joints + 1)?)?;
        writer.write(header_byte(0, num_joints)?)?;
        writer.write_bytes(data)?;
        writer.write_bytes(flag)?;
        writer.write_bytes(&FIXED_RECORD_TAIL)
    }
}

fn write_camera_block<W: Write>(writer: &mut ArchiveWriter<W>, position: Vec3, rotation: Quat) -> Result<(), YukeError> {
    for value in position.to_array() {
        writer.write(quantize_fixed(value, FIXED_SCALE))?;
    }
    for angle in quat_to_euler_xyz(rotation).to_array() {
        writer.write(quantize_fixed(angle.to_degrees(), FIXED_SCALE))?;
    }
    Ok(())
}

/// Encodes an armature frame with default options.
pub fn encode(input: &FrameInput<'_>) -> Result<Vec<u8>, YukeError> {
    YkaEncoder::new().encode(input)
}
