use core::f32::consts::PI;
use glam::{Quat, Vec3};
use rand::Rng;
use yuke_animation_rs::*;

mod common;

#[test]
fn test_wrestler_frame() {
    let mut h = common::wrestler();
    let neck = h.joint_by_name("Neck").unwrap();
    h.set_rotation(neck, JointRotation::Quat(Quat::from_rotation_z(PI / 2.0)))
        .unwrap();

    let buf = yka::encode(&FrameInput::new(Vec3::new(0.0, 2.0, 0.0), &h)).unwrap();
    let records = common::split_records(&buf);
    assert_eq!(records.len(), 1);
    assert_eq!(buf[0], 0x80 + 6 + 33 + 1);
    assert_eq!(buf[1], 0x10 + 6 + 33);

    let frame = &yka_reader::decode(&buf, h.num_joints()).unwrap()[0];
    assert_eq!(frame.position_offsets, [0, 255 - 0xB0, 0]);
    let neck_idx = common::WRESTLER_JOINTS.iter().position(|name| *name == "Neck").unwrap();
    assert_eq!(frame.rotations[neck_idx], [64, 0, 0]);
    for (idx, rotation) in frame.rotations.iter().enumerate() {
        if idx != neck_idx {
            assert_eq!(*rotation, [0, 0, 0], "joint {}", common::WRESTLER_JOINTS[idx]);
        }
    }
}

#[test]
fn test_record_invariants() {
    let mut rng = common::seeded_rng();
    let encoder = YkaEncoder::new();
    for _ in 0..200 {
        let joints = rng.gen_range(1..=120);
        let h = common::random_hierarchy(&mut rng, joints);
        let position = Vec3::new(
            rng.gen_range(-500.0..500.0),
            rng.gen_range(-500.0..500.0),
            rng.gen_range(-500.0..500.0),
        );
        let marker = match rng.gen_bool(0.3) {
            true => Some(MarkerEntry::new(0, rng.gen_range(0xC3..=0xD0), rng.gen_range(0..=1))),
            false => None,
        };
        let input = FrameInput::new(position, &h).with_marker(marker);

        let plan = encoder.plan_frame(&input).unwrap();
        assert_eq!(plan.num_joints, 6 + 3 * joints + marker.map_or(0, |_| 3));
        assert_eq!(plan.frame_size, plan.num_joints + 1);

        let buf = encoder.encode(&input).unwrap();
        let records = common::split_records(&buf);
        assert_eq!(records.len(), plan.sub_records);
        assert_eq!(buf.len(), plan.frame_size + 2 * plan.sub_records + plan.sub_records - 1);

        let frames = yka_reader::decode(&buf, joints).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].marker, marker.map(|m| (m.sprite_id, m.sound_id)));

        let expected = h.euler_rotations();
        for (decoded, euler) in frames[0].euler_rotations().iter().zip(expected.iter()) {
            // Half a step of 180/128 degrees, plus float noise.
            assert!(decoded.abs_diff_eq(*euler, 0.0125), "{:?} {:?}", decoded, euler);
        }
    }
}

#[test]
fn test_zero_round_trip() {
    let h = common::wrestler();
    let buf = yka::encode(&FrameInput::new(Vec3::ZERO, &h)).unwrap();
    let frame = &yka_reader::decode(&buf, h.num_joints()).unwrap()[0];
    let (scale, footprint) = yka::position_scale(Vec3::ZERO);
    assert_eq!(footprint, 6);
    assert!(frame.position(scale).abs_diff_eq(Vec3::ZERO, 1.0 / scale as f32));
}

#[test]
fn test_position_never_wraps() {
    let mut rng = common::seeded_rng();
    let h = common::wrestler();
    for _ in 0..500 {
        let position = Vec3::new(
            rng.gen_range(-1e4..1e4),
            rng.gen_range(-1e-3..1e-3),
            rng.gen_range(-1e4..1e4),
        );
        let (scale, _) = yka::position_scale(position);
        let block = yka::quantize_position(position, scale, false);
        for (axis, value) in position.to_array().into_iter().enumerate() {
            let idx = axis * 2;
            let unclamped = (value as f64 * scale).round() as i32 + yka::POSITION_REFERENCE[idx] as i32;
            assert_eq!(block[idx] as i32, unclamped.clamp(0, 255));
        }
        assert!(yka::encode(&FrameInput::new(position, &h)).is_ok());
    }
}

#[test]
fn test_bit_exact_stream() {
    let encoder = YkaEncoder::with_config(YkaConfig::bit_exact());
    let h = common::wrestler();

    // Scaled (255, 127.5, 0) declares 4 + 4 + 1 positional bytes.
    let input = FrameInput::new(Vec3::new(2.0, 1.0, 0.0), &h);
    let buf = encoder.encode(&input).unwrap();
    assert_eq!(buf[0], 0x80 + 9 + 33 + 1);
    assert_eq!(buf[1], 0x10 + 9 + 33);
    assert_eq!(buf.len(), 2 + 6 + 33 + 1);
    assert_eq!(&buf[2..8], &[0xFF, 0x30, 0xFF, 0xE7, 0x0D, 0x05]);
}
