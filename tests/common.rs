#![allow(dead_code)]

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use yuke_animation_rs::*;

/// Joint names of the wrestler skeleton, in pre-order.
pub const WRESTLER_JOINTS: [&str; 11] = [
    "Root",
    "L_Thigh",
    "L_Knee",
    "End_L_Thigh",
    "R_Thigh",
    "R_Knee",
    "End_R_Thigh",
    "Spine",
    "Neck",
    "End_Neck",
    "Head",
];

pub fn wrestler() -> JointHierarchy {
    let zero = JointRotation::default();
    let mut h = JointHierarchy::new();
    let root = h.add_root("Root", zero).unwrap();
    for leg in ["L", "R"] {
        let thigh = h.add_child(root, &format!("{}_Thigh", leg), zero).unwrap();
        let knee = h.add_child(thigh, &format!("{}_Knee", leg), zero).unwrap();
        h.add_child(knee, &format!("End_{}_Thigh", leg), zero).unwrap();
    }
    let spine = h.add_child(root, "Spine", zero).unwrap();
    let neck = h.add_child(spine, "Neck", zero).unwrap();
    h.add_child(neck, "End_Neck", zero).unwrap();
    h.add_child(neck, "Head", zero).unwrap();
    h
}

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(0x5944_4B41)
}

/// Random tree of `joints` joints with random rotations in (-pi, pi).
pub fn random_hierarchy(rng: &mut StdRng, joints: usize) -> JointHierarchy {
    let mut h = JointHierarchy::new();
    for i in 0..joints {
        let euler = Vec3::new(
            rng.gen_range(-3.1..3.1),
            rng.gen_range(-3.1..3.1),
            rng.gen_range(-3.1..3.1),
        );
        let rotation = JointRotation::Euler(euler);
        let name = format!("joint{}", i);
        if i == 0 || rng.gen_bool(0.05) {
            h.add_root(&name, rotation).unwrap();
        } else {
            let parent = rng.gen_range(0..i) as JointId;
            h.add_child(parent, &name, rotation).unwrap();
        }
    }
    h
}

/// Splits a corrected stream into records, checking the size invariants.
pub fn split_records(buf: &[u8]) -> Vec<&[u8]> {
    let mut records = Vec::new();
    let mut pos = 0;
    while pos < buf.len() {
        let frame_size = (buf[pos] - FRAME_SIZE_BIAS) as usize;
        let num_joints = (buf[pos + 1] - JOINT_COUNT_BIAS) as usize;
        assert_eq!(frame_size, num_joints + 1, "record at {}", pos);
        assert!(pos + 2 + frame_size <= buf.len(), "record at {}", pos);
        records.push(&buf[pos..pos + 2 + frame_size]);
        pos += 2 + frame_size;
    }
    records
}
