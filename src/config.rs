//!
//! Codec options.
//!

/// Bytes the JBI padding skip subtracts from the frame size by default.
pub const JBI_DEFAULT_PADDING_BIAS: u16 = 12;

/// Scale from host units (metres) to game units (centimetres).
pub const DEFAULT_WORLD_SCALE: f32 = 100.0;

/// How faithfully the YKA encoder reproduces the reference exporter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compatibility {
    /// Every record is self-consistent: the size byte matches the bytes
    /// written, values are rounded, and oversized frames are partitioned
    /// across sub-records.
    #[default]
    Corrected,
    /// Byte-for-byte output of the reference exporter: advisory positional
    /// footprint in the size bytes, truncating quantization, and failure on
    /// frames whose size byte cannot be represented.
    BitExact,
}

/// JBI decoder options.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JbiConfig {
    /// After a pose is read, `frame_size - padding_bias` bytes are skipped.
    pub padding_bias: u16,
}

impl Default for JbiConfig {
    fn default() -> JbiConfig {
        JbiConfig {
            padding_bias: JBI_DEFAULT_PADDING_BIAS,
        }
    }
}

/// YKA encoder options.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct YkaConfig {
    pub compatibility: Compatibility,
    /// Applied to root positions by the export driver before encoding.
    pub world_scale: f32,
}

impl Default for YkaConfig {
    fn default() -> YkaConfig {
        YkaConfig {
            compatibility: Compatibility::default(),
            world_scale: DEFAULT_WORLD_SCALE,
        }
    }
}

impl YkaConfig {
    /// Options reproducing the reference exporter byte for byte.
    pub fn bit_exact() -> YkaConfig {
        YkaConfig {
            compatibility: Compatibility::BitExact,
            ..YkaConfig::default()
        }
    }

    #[inline]
    pub fn is_bit_exact(&self) -> bool {
        self.compatibility == Compatibility::BitExact
    }
}

/// All codec options.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecConfig {
    pub jbi: JbiConfig,
    pub yka: YkaConfig,
}
