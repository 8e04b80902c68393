mod archive;
mod base;
mod config;
mod marker;
mod math;
mod skeleton;
mod track;

pub mod jbi;
pub mod kyr;
pub mod scene;
pub mod yka;
pub mod yka_reader;

pub use archive::{Archive, ArchiveRead, ArchiveWrite, ArchiveWriter};
pub use base::*;
pub use config::{CodecConfig, Compatibility, JbiConfig, YkaConfig, DEFAULT_WORLD_SCALE, JBI_DEFAULT_PADDING_BIAS};
pub use jbi::{JbiDecoder, JbiFrame, JbiFrameHeader};
pub use marker::{
    sound_id, sound_name, sprite_name, MarkerEntry, MarkerTrack, SOUND_IDS, SOUND_NONE, SPRITE_IDS, SPRITE_NONE,
};
pub use math::{dequantize_fixed, quantize_fixed, quat_from_euler_xyz, quat_to_euler_xyz, FIXED_SCALE, KYR_SCALE};
pub use scene::{ExportSummary, ObjectSample, PoseTarget, SceneSource, TrackInfo};
pub use skeleton::{Joint, JointHierarchy, JointId, JointRotation};
pub use track::{KyrTrack, PoseSample};
pub use yka::{CameraInput, FrameInput, FramePlan, LightInput, YkaEncoder};
pub use yka_reader::YkaFrame;
