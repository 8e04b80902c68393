//!
//! Base types, constants and the crate error.
//!

use thiserror::Error;

/// Yuke codec error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum YukeError {
    /// Fewer bytes remain than a field requires.
    #[error("Truncated stream: need {needed} bytes at offset {offset}, {remaining} remaining")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    /// A frame header derives an unusable record length.
    #[error("Malformed header: indicator {indicator:#04x} at offset {offset} gives frame size {frame_size}")]
    MalformedHeader { offset: usize, indicator: u8, frame_size: u16 },
    /// A table-of-contents offset resolves outside the buffer.
    #[error("Corrupt toc: track {track} seeks to {target}, buffer length {len}")]
    CorruptToc { track: usize, target: usize, len: usize },
    /// The joint hierarchy cannot be represented in a record.
    #[error("Unsupported hierarchy: {0}")]
    UnsupportedHierarchy(String),

    /// Invalid joint index.
    #[error("Invalid index")]
    InvalidIndex,
    /// Joint name already used in the hierarchy.
    #[error("Duplicate joint: {0}")]
    DuplicateJoint(String),

    /// A marker already exists on the frame.
    #[error("Marker already exists for frame {0}")]
    DuplicateMarker(i32),
    /// No marker on the frame.
    #[error("No marker found for frame {0}")]
    MarkerNotFound(i32),

    /// Export path without the `.yka` extension.
    #[error("Invalid extension: {0}")]
    InvalidExtension(String),

    /// Std io errors.
    #[error("IO error: {0}")]
    IO(std::io::ErrorKind),
}

impl From<std::io::Error> for YukeError {
    fn from(err: std::io::Error) -> Self {
        YukeError::IO(err.kind())
    }
}

impl YukeError {
    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        YukeError::UnsupportedHierarchy(msg.into())
    }

    /// Checks a joint count against `1..=HIERARCHY_MAX_JOINTS`.
    pub(crate) fn check_joint_count(joints: usize) -> Result<(), YukeError> {
        if joints == 0 {
            return Err(YukeError::unsupported("empty joint hierarchy"));
        }
        if joints > HIERARCHY_MAX_JOINTS {
            return Err(YukeError::unsupported(format!(
                "{} joints, at most {} supported",
                joints, HIERARCHY_MAX_JOINTS
            )));
        }
        Ok(())
    }

    pub fn is_truncated_stream(&self) -> bool {
        matches!(self, YukeError::TruncatedStream { .. })
    }

    pub fn is_malformed_header(&self) -> bool {
        matches!(self, YukeError::MalformedHeader { .. })
    }

    pub fn is_corrupt_toc(&self) -> bool {
        matches!(self, YukeError::CorruptToc { .. })
    }

    pub fn is_unsupported_hierarchy(&self) -> bool {
        matches!(self, YukeError::UnsupportedHierarchy(_))
    }

    pub fn is_invalid_index(&self) -> bool {
        matches!(self, YukeError::InvalidIndex)
    }

    pub fn is_io(&self) -> bool {
        matches!(self, YukeError::IO(_))
    }
}

/// Defines the maximum number of joints the encoder accepts in one hierarchy.
pub const HIERARCHY_MAX_JOINTS: usize = 1024;

/// Bias added to the record length in the first byte of a frame record.
pub const FRAME_SIZE_BIAS: u8 = 0x80;

/// Bias added to the data byte count in the second byte of a YKA record.
pub const JOINT_COUNT_BIAS: u8 = 0x10;

/// Placeholder written after the rotations of a YKA record (frame interpolation).
pub const INTERPOLATION_PLACEHOLDER: u8 = 0x10;

/// Flag byte announcing marker data in a YKA record.
pub const MARKER_FLAG: u8 = 0x02;

/// Largest record length the biased size byte can hold.
pub const MAX_RECORD_SIZE: usize = (u8::MAX - FRAME_SIZE_BIAS) as usize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_joint_count() {
        assert!(YukeError::check_joint_count(1).is_ok());
        assert!(YukeError::check_joint_count(HIERARCHY_MAX_JOINTS).is_ok());
        assert!(YukeError::check_joint_count(0).unwrap_err().is_unsupported_hierarchy());
        assert!(YukeError::check_joint_count(HIERARCHY_MAX_JOINTS + 1)
            .unwrap_err()
            .is_unsupported_hierarchy());
        assert!(YukeError::check_joint_count(usize::MAX).unwrap_err().is_unsupported_hierarchy());
    }
}
