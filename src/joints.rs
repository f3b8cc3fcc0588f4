// src/joints.rs
use crate::error::{HandError, HandResult};
use crate::pose::Pose;
use crate::types::{HandJointId, HAND_JOINT_COUNT};
use std::rc::Rc;

/// Read-only joint poses for a whole skeleton snapshot.
///
/// Either empty (no valid data) or exactly [`HAND_JOINT_COUNT`] long. Clones
/// share storage, so handing the collection out per query is cheap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandJointPoses {
    poses: Option<Rc<[Pose]>>,
}

impl HandJointPoses {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a full collection, rejecting anything but a complete skeleton.
    pub fn from_vec(poses: Vec<Pose>) -> HandResult<Self> {
        if poses.len() != HAND_JOINT_COUNT {
            return Err(HandError::JointCountMismatch {
                expected: HAND_JOINT_COUNT,
                actual: poses.len(),
            });
        }
        Ok(Self {
            poses: Some(poses.into()),
        })
    }

    pub(crate) fn from_array(poses: [Pose; HAND_JOINT_COUNT]) -> Self {
        Self {
            poses: Some(Rc::from(&poses[..])),
        }
    }

    pub fn len(&self) -> usize {
        self.poses.as_ref().map_or(0, |p| p.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, joint: HandJointId) -> Option<&Pose> {
        self.poses.as_ref().and_then(|p| p.get(joint.index()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (HandJointId, &Pose)> + '_ {
        HandJointId::ALL.iter().copied().zip(self.as_slice().iter())
    }

    pub fn as_slice(&self) -> &[Pose] {
        self.poses.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_empty_collection() {
        let poses = HandJointPoses::empty();
        assert_eq!(poses.len(), 0);
        assert!(poses.is_empty());
        assert!(poses.get(HandJointId::HandWristRoot).is_none());
        assert_eq!(poses.iter().count(), 0);
    }

    #[test]
    fn test_rejects_partial_skeleton() {
        let err = HandJointPoses::from_vec(vec![Pose::identity(); 3]).unwrap_err();
        assert!(matches!(
            err,
            HandError::JointCountMismatch { expected: 24, actual: 3 }
        ));
    }

    #[test]
    fn test_indexed_by_joint_id() {
        let poses: Vec<Pose> = (0..HAND_JOINT_COUNT)
            .map(|i| Pose::from_position(Vector3::new(i as f32, 0.0, 0.0)))
            .collect();
        let poses = HandJointPoses::from_vec(poses).unwrap();

        assert_eq!(poses.len(), HAND_JOINT_COUNT);
        assert_eq!(poses.get(HandJointId::HandIndexTip).unwrap().position.x, 20.0);
        let (joint, pose) = poses.iter().nth(9).unwrap();
        assert_eq!(joint, HandJointId::HandMiddle1);
        assert_eq!(pose.position.x, 9.0);
    }
}
