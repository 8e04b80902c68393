//!
//! Host adapter.
//!
//! The codecs never talk to a host application. A host exposes its scene
//! through `SceneSource` for export and receives decoded poses through
//! `PoseTarget` on import; the drivers below connect both sides to the
//! codecs.
//!

use glam::{Quat, Vec3};
use std::io::Write;
use std::ops::RangeInclusive;

use crate::archive::ArchiveWriter;
use crate::base::YukeError;
use crate::config::{JbiConfig, YkaConfig};
use crate::jbi::JbiDecoder;
use crate::kyr;
use crate::marker::MarkerTrack;
use crate::skeleton::JointHierarchy;
use crate::track::PoseSample;
use crate::yka::{CameraInput, FrameInput, LightInput, YkaEncoder};

/// File extension of YKA streams.
pub const YKA_EXTENSION: &str = "yka";

/// State of one scene object at one frame.
#[derive(Debug, Clone, Copy)]
pub enum ObjectSample<'a> {
    /// Root position in host units and the joint hierarchy posed for the frame.
    Armature {
        root_position: Vec3,
        hierarchy: &'a JointHierarchy,
    },
    Camera {
        position: Vec3,
        rotation: Quat,
    },
    Light {
        position: Vec3,
        rotation: Quat,
        intensity: f32,
    },
}

/// Scene side of an export.
pub trait SceneSource {
    /// Frames to export, both ends included.
    fn frame_range(&self) -> RangeInclusive<i32>;

    /// Number of objects in the scene.
    fn object_count(&self) -> usize;

    /// Hidden objects are not exported.
    fn is_visible(&self, object: usize) -> bool;

    /// Samples `object` at `frame`. `None` when the object has nothing to
    /// export at that frame.
    fn sample(&mut self, object: usize, frame: i32) -> Option<ObjectSample<'_>>;
}

/// Counters of an export.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Visible objects visited.
    pub objects: usize,
    /// Frames written.
    pub frames: usize,
    /// Frames skipped because the object had nothing to export.
    pub skipped_frames: usize,
    /// Bytes written.
    pub bytes: usize,
}

/// Encodes every visible object of `source` into `sink`, object by object,
/// each over the whole frame range.
pub fn export_yka<S, W>(
    source: &mut S,
    markers: &MarkerTrack,
    config: &YkaConfig,
    sink: W,
) -> Result<ExportSummary, YukeError>
where
    S: SceneSource + ?Sized,
    W: Write,
{
    let encoder = YkaEncoder::with_config(*config);
    let mut writer = ArchiveWriter::new(sink);
    let mut summary = ExportSummary::default();

    for object in 0..source.object_count() {
        if !source.is_visible(object) {
            continue;
        }
        summary.objects += 1;

        for frame in source.frame_range() {
            let marker = markers.get(frame).copied();
            match source.sample(object, frame) {
                Some(ObjectSample::Armature { hierarchy, .. }) if hierarchy.is_empty() => {
                    log::warn!("YKA: no joints in object {} at frame {}", object, frame);
                    summary.skipped_frames += 1;
                    continue;
                }
                Some(ObjectSample::Armature {
                    root_position,
                    hierarchy,
                }) => {
                    let input = FrameInput::new(root_position * config.world_scale, hierarchy).with_marker(marker);
                    encoder.encode_frame(&input, &mut writer)?;
                }
                Some(ObjectSample::Camera { position, rotation }) => {
                    let input = CameraInput {
                        position,
                        rotation,
                        marker,
                    };
                    encoder.encode_camera(&input, &mut writer)?;
                }
                Some(ObjectSample::Light {
                    position,
                    rotation,
                    intensity,
                }) => {
                    let input = LightInput {
                        position,
                        rotation,
                        intensity,
                        marker,
                    };
                    encoder.encode_light(&input, &mut writer)?;
                }
                None => {
                    log::warn!("YKA: nothing to export for object {} at frame {}", object, frame);
                    summary.skipped_frames += 1;
                    continue;
                }
            }
            summary.frames += 1;
        }
    }

    writer.flush()?;
    summary.bytes = writer.written();
    log::info!(
        "YKA: exported {} frames of {} objects, {} bytes",
        summary.frames,
        summary.objects,
        summary.bytes
    );
    Ok(summary)
}

/// Checks that `path` names a YKA stream.
pub fn check_yka_extension<P: AsRef<std::path::Path>>(path: P) -> Result<(), YukeError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(YKA_EXTENSION) => Ok(()),
        _ => Err(YukeError::InvalidExtension(path.display().to_string())),
    }
}

/// Exports into a new `.yka` file.
#[cfg(not(feature = "wasm"))]
pub fn export_yka_to_path<S, P>(
    source: &mut S,
    markers: &MarkerTrack,
    config: &YkaConfig,
    path: P,
) -> Result<ExportSummary, YukeError>
where
    S: SceneSource + ?Sized,
    P: AsRef<std::path::Path>,
{
    check_yka_extension(&path)?;
    let file = std::fs::File::create(path)?;
    export_yka(source, markers, config, std::io::BufWriter::new(file))
}

/// Track a decoded sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackInfo {
    /// The single track of a JBI stream.
    Jbi,
    /// A track of a KYR container.
    Kyr { index: usize, part_id: u16, asset_id: u16 },
}

/// Receives decoded poses, e.g. to key them on a skeleton.
pub trait PoseTarget {
    fn apply(&mut self, track: TrackInfo, frame: i32, sample: &PoseSample);
}

/// Decodes a JBI stream into `target`, frames numbered from 1.
/// Returns the number of frames applied.
pub fn import_jbi<T>(bytes: &[u8], config: &JbiConfig, target: &mut T) -> Result<usize, YukeError>
where
    T: PoseTarget + ?Sized,
{
    let poses = JbiDecoder::with_config(*config).decode(bytes)?;
    for (idx, pose) in poses.iter().enumerate() {
        target.apply(TrackInfo::Jbi, idx as i32 + 1, pose);
    }
    log::info!("JBI: imported {} frames", poses.len());
    Ok(poses.len())
}

/// Decodes a KYR container into `target`, each track's frames numbered from 0.
/// Returns the number of frames applied.
pub fn import_kyr<T>(bytes: &[u8], target: &mut T) -> Result<usize, YukeError>
where
    T: PoseTarget + ?Sized,
{
    let tracks = kyr::decode(bytes)?;
    let mut applied = 0;
    for (index, track) in tracks.iter().enumerate() {
        let info = TrackInfo::Kyr {
            index,
            part_id: track.part_id,
            asset_id: track.asset_id,
        };
        for (frame, pose) in track.frames().iter().enumerate() {
            target.apply(info, frame as i32, pose);
        }
        applied += track.frame_count();
    }
    log::info!("KYR: imported {} frames from {} tracks", applied, tracks.len());
    Ok(applied)
}

/// Reads and imports a `.jbi` file.
#[cfg(not(feature = "wasm"))]
pub fn import_jbi_from_path<T, P>(path: P, config: &JbiConfig, target: &mut T) -> Result<usize, YukeError>
where
    T: PoseTarget + ?Sized,
    P: AsRef<std::path::Path>,
{
    let bytes = std::fs::read(path)?;
    import_jbi(&bytes, config, target)
}

/// Reads and imports a KYR container file.
#[cfg(not(feature = "wasm"))]
pub fn import_kyr_from_path<T, P>(path: P, target: &mut T) -> Result<usize, YukeError>
where
    T: PoseTarget + ?Sized,
    P: AsRef<std::path::Path>,
{
    let bytes = std::fs::read(path)?;
    import_kyr(&bytes, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::MarkerEntry;
    use crate::skeleton::JointRotation;

    struct Stage {
        hierarchy: JointHierarchy,
        empty: JointHierarchy,
    }

    impl SceneSource for Stage {
        fn frame_range(&self) -> RangeInclusive<i32> {
            1..=3
        }

        fn object_count(&self) -> usize {
            4
        }

        fn is_visible(&self, object: usize) -> bool {
            object != 2
        }

        fn sample(&mut self, object: usize, frame: i32) -> Option<ObjectSample<'_>> {
            match object {
                0 => Some(ObjectSample::Armature {
                    root_position: Vec3::new(0.01 * frame as f32, 0.0, 0.0),
                    hierarchy: &self.hierarchy,
                }),
                1 if frame == 2 => None,
                1 => Some(ObjectSample::Camera {
                    position: Vec3::ZERO,
                    rotation: Quat::IDENTITY,
                }),
                3 => Some(ObjectSample::Armature {
                    root_position: Vec3::ZERO,
                    hierarchy: &self.empty,
                }),
                _ => unreachable!(),
            }
        }
    }

    fn stage() -> Stage {
        let mut hierarchy = JointHierarchy::new();
        hierarchy.add_root("Root", JointRotation::default()).unwrap();
        Stage {
            hierarchy,
            empty: JointHierarchy::new(),
        }
    }

    #[derive(Default)]
    struct Recorder {
        applied: Vec<(TrackInfo, i32)>,
    }

    impl PoseTarget for Recorder {
        fn apply(&mut self, track: TrackInfo, frame: i32, _sample: &PoseSample) {
            self.applied.push((track, frame));
        }
    }

    #[test]
    fn test_export() {
        let mut markers = MarkerTrack::new();
        markers.insert(MarkerEntry::new(2, 0xC5, 0)).unwrap();

        let mut buf = Vec::new();
        let summary = export_yka(&mut stage(), &markers, &YkaConfig::default(), &mut buf).unwrap();
        assert_eq!(
            summary,
            ExportSummary {
                objects: 3,
                frames: 5,
                skipped_frames: 4,
                bytes: buf.len(),
            }
        );

        // Armature frames 1..=3 (12, 15 with the marker, 12 bytes), then camera frames 1 and 3.
        assert_eq!(&buf[..2], &[0x8A, 0x19]);
        assert_eq!(&buf[12..14], &[0x8D, 0x1C]);
        assert_eq!(&buf[23..27], &[0x10, 0x02, 0x00, 0xC5]);
        assert_eq!(buf.len(), 12 + 15 + 12 + 15 + 15);
    }

    #[test]
    fn test_extension() {
        assert!(check_yka_extension("out/anim.yka").is_ok());
        assert_eq!(
            check_yka_extension("out/anim.jbi").unwrap_err(),
            YukeError::InvalidExtension("out/anim.jbi".to_string())
        );
        assert!(check_yka_extension("anim").is_err());
    }

    #[test]
    fn test_import_jbi() {
        let mut buf = vec![0x86];
        buf.extend_from_slice(&[0u8; 14]);
        buf.push(0x86);
        buf.extend_from_slice(&[0u8; 14]);

        let mut recorder = Recorder::default();
        assert_eq!(import_jbi(&buf, &JbiConfig::default(), &mut recorder).unwrap(), 2);
        assert_eq!(recorder.applied, vec![(TrackInfo::Jbi, 1), (TrackInfo::Jbi, 2)]);
    }

    #[test]
    fn test_import_kyr() {
        let mut buf = vec![1, 0, 3, 0, 4, 0, 0, 0, 32, 0];
        buf.extend_from_slice(&[0u8; 32]);

        let mut recorder = Recorder::default();
        assert_eq!(import_kyr(&buf, &mut recorder).unwrap(), 2);
        let info = TrackInfo::Kyr {
            index: 0,
            part_id: 3,
            asset_id: 4,
        };
        assert_eq!(recorder.applied, vec![(info, 0), (info, 1)]);
    }
}
