use bimap::BiMap;
use glam::{Quat, Vec3};

use crate::base::{YukeError, HIERARCHY_MAX_JOINTS};
use crate::math::quat_to_euler_xyz;

/// Index of a joint inside a `JointHierarchy`.
pub type JointId = u16;

/// Rotation of a joint for the frame being encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointRotation {
    /// XYZ Euler angles in radians (rotation = `Rz * Ry * Rx`).
    Euler(Vec3),
    /// Quaternion rotation.
    Quat(Quat),
}

impl Default for JointRotation {
    fn default() -> JointRotation {
        JointRotation::Euler(Vec3::ZERO)
    }
}

impl JointRotation {
    /// XYZ Euler angles in radians, returned as `(x, y, z)`.
    #[inline]
    pub fn euler_xyz(&self) -> Vec3 {
        match self {
            JointRotation::Euler(euler) => *euler,
            JointRotation::Quat(quat) => quat_to_euler_xyz(*quat),
        }
    }
}

/// A joint of the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    name: String,
    parent: Option<JointId>,
    children: Vec<JointId>,
    rotation: JointRotation,
}

impl Joint {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parent(&self) -> Option<JointId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[JointId] {
        &self.children
    }

    #[inline]
    pub fn rotation(&self) -> JointRotation {
        self.rotation
    }
}

///
/// Joint hierarchy handed to the YKA encoder for one frame.
///
/// Joints live in an arena and refer to each other by `JointId`: every joint
/// stores the index of its parent and the indices of its children, in
/// insertion order. The hierarchy may have several roots. The encoder walks it
/// in pre-order (a root, then recursively each of its children, then the next
/// root), and that order is part of the wire format.
///
/// The host owns the skeleton; it either rebuilds a hierarchy per frame or
/// keeps one and updates rotations with `set_rotation` before each frame.
///
#[derive(Debug, Default, Clone)]
pub struct JointHierarchy {
    joints: Vec<Joint>,
    roots: Vec<JointId>,
    joint_names: BiMap<String, JointId>,
}

impl JointHierarchy {
    /// Creates an empty hierarchy.
    pub fn new() -> JointHierarchy {
        JointHierarchy::default()
    }

    /// Adds a root joint.
    pub fn add_root(&mut self, name: &str, rotation: JointRotation) -> Result<JointId, YukeError> {
        let id = self.push(name, None, rotation)?;
        self.roots.push(id);
        Ok(id)
    }

    /// Adds a joint under `parent`.
    pub fn add_child(&mut self, parent: JointId, name: &str, rotation: JointRotation) -> Result<JointId, YukeError> {
        if parent as usize >= self.joints.len() {
            return Err(YukeError::InvalidIndex);
        }
        let id = self.push(name, Some(parent), rotation)?;
        self.joints[parent as usize].children.push(id);
        Ok(id)
    }

    fn push(&mut self, name: &str, parent: Option<JointId>, rotation: JointRotation) -> Result<JointId, YukeError> {
        if self.joint_names.contains_left(name) {
            return Err(YukeError::DuplicateJoint(name.to_string()));
        }
        if self.joints.len() >= HIERARCHY_MAX_JOINTS {
            return Err(YukeError::unsupported(format!(
                "more than {} joints",
                HIERARCHY_MAX_JOINTS
            )));
        }
        let id = self.joints.len() as JointId;
        self.joints.push(Joint {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            rotation,
        });
        self.joint_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Replaces the rotation of a joint.
    pub fn set_rotation(&mut self, joint: JointId, rotation: JointRotation) -> Result<(), YukeError> {
        match self.joints.get_mut(joint as usize) {
            Some(j) => {
                j.rotation = rotation;
                Ok(())
            }
            None => Err(YukeError::InvalidIndex),
        }
    }

    /// Gets the number of joints.
    #[inline]
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Root joints in insertion order.
    #[inline]
    pub fn roots(&self) -> &[JointId] {
        &self.roots
    }

    /// Gets a joint by index.
    #[inline]
    pub fn joint(&self, joint: JointId) -> Option<&Joint> {
        self.joints.get(joint as usize)
    }

    /// Gets joint's index by name.
    #[inline]
    pub fn joint_by_name(&self, name: &str) -> Option<JointId> {
        self.joint_names.get_by_left(name).copied()
    }

    /// Gets joint's name by index.
    #[inline]
    pub fn joint_name(&self, joint: JointId) -> Option<&str> {
        self.joint_names.get_by_right(&joint).map(|name| name.as_str())
    }

    /// Iterates through the joint hierarchy in pre-order.
    ///
    /// * `f` - The function to call for each joint. The function takes arguments `(joint, parent)`.
    pub fn iter_depth_first<F>(&self, mut f: F)
    where
        F: FnMut(JointId, Option<JointId>),
    {
        let mut stack: Vec<JointId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let joint = &self.joints[id as usize];
            f(id, joint.parent);
            stack.extend(joint.children.iter().rev());
        }
    }

    /// Joints in pre-order.
    pub fn depth_first_order(&self) -> Vec<JointId> {
        let mut order = Vec::with_capacity(self.joints.len());
        self.iter_depth_first(|joint, _| order.push(joint));
        order
    }

    /// Joint rotations as XYZ Euler angles, in pre-order.
    pub fn euler_rotations(&self) -> Vec<Vec3> {
        let mut rotations = Vec::with_capacity(self.joints.len());
        self.iter_depth_first(|joint, _| rotations.push(self.joints[joint as usize].rotation.euler_xyz()));
        rotations
    }
}
