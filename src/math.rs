//!
//! Fixed-point and rotation helpers shared by the codecs.
//!

use glam::{EulerRot, Quat, Vec3};

/// Fixed-point step of JBI positions/rotations and of provisional camera records.
pub const FIXED_SCALE: f32 = 0.01;

/// Fixed-point step of KYR frame values (8 fractional bits).
pub const KYR_SCALE: f32 = 1.0 / 256.0;

/// Quantizes `value` to a signed 16-bit fixed-point number with step `scale`.
/// Out of range values saturate.
#[inline]
pub fn quantize_fixed(value: f32, scale: f32) -> i16 {
    let raw = (value / scale).round();
    raw.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Inverse of `quantize_fixed`.
#[inline]
pub fn dequantize_fixed(raw: i16, scale: f32) -> f32 {
    raw as f32 * scale
}

/// Decomposes a rotation into XYZ Euler angles in radians, returned as `(x, y, z)`.
///
/// XYZ here is the extrinsic order: the rotation equals `Rz * Ry * Rx`.
#[inline]
pub fn quat_to_euler_xyz(rotation: Quat) -> Vec3 {
    let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
    Vec3::new(x, y, z)
}

/// Builds a rotation from XYZ Euler angles in radians, see `quat_to_euler_xyz`.
#[inline]
pub fn quat_from_euler_xyz(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::ZYX, euler.z, euler.y, euler.x)
}

/// Saturates an integer into the `u8` range.
#[inline]
pub(crate) fn saturate_u8(value: i32) -> u8 {
    value.clamp(u8::MIN as i32, u8::MAX as i32) as u8
}

/// Saturates an integer into the `i8` range.
#[inline]
pub(crate) fn saturate_i8(value: i32) -> i8 {
    value.clamp(i8::MIN as i32, i8::MAX as i32) as i8
}
