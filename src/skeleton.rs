// src/skeleton.rs - Hand skeleton topology and derived poses
use crate::joints::HandJointPoses;
use crate::pose::Pose;
use crate::types::{HandFinger, HandJointId, Handedness, HAND_JOINT_COUNT};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use once_cell::sync::Lazy;

use HandJointId::*;

/// Parent of every joint, indexed like [`HandJointId::ALL`]. The wrist root
/// has no parent; every other parent sits at a lower index.
const PARENTS: [Option<HandJointId>; HAND_JOINT_COUNT] = [
    None,
    Some(HandWristRoot),
    Some(HandWristRoot),
    Some(HandThumb0),
    Some(HandThumb1),
    Some(HandThumb2),
    Some(HandWristRoot),
    Some(HandIndex1),
    Some(HandIndex2),
    Some(HandWristRoot),
    Some(HandMiddle1),
    Some(HandMiddle2),
    Some(HandWristRoot),
    Some(HandRing1),
    Some(HandRing2),
    Some(HandWristRoot),
    Some(HandPinky0),
    Some(HandPinky1),
    Some(HandPinky2),
    Some(HandThumb3),
    Some(HandIndex3),
    Some(HandMiddle3),
    Some(HandRing3),
    Some(HandPinky3),
];

const THUMB_JOINTS: [HandJointId; 5] =
    [HandThumb0, HandThumb1, HandThumb2, HandThumb3, HandThumbTip];
const INDEX_JOINTS: [HandJointId; 4] = [HandIndex1, HandIndex2, HandIndex3, HandIndexTip];
const MIDDLE_JOINTS: [HandJointId; 4] = [HandMiddle1, HandMiddle2, HandMiddle3, HandMiddleTip];
const RING_JOINTS: [HandJointId; 4] = [HandRing1, HandRing2, HandRing3, HandRingTip];
const PINKY_JOINTS: [HandJointId; 5] =
    [HandPinky0, HandPinky1, HandPinky2, HandPinky3, HandPinkyTip];

/// Knuckles averaged for the palm center.
const KNUCKLES: [HandJointId; 4] = [HandIndex1, HandMiddle1, HandRing1, HandPinky1];

// Right hand, meters, parent relative. Fingers extend along +Z, thumb side is +X.
const BIND_OFFSETS: [[f32; 3]; HAND_JOINT_COUNT] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, -0.05],
    [0.02, -0.01, 0.02],
    [0.015, 0.0, 0.025],
    [0.01, 0.0, 0.03],
    [0.0, 0.0, 0.03],
    [0.02, 0.0, 0.09],
    [0.0, 0.0, 0.04],
    [0.0, 0.0, 0.025],
    [0.0, 0.0, 0.095],
    [0.0, 0.0, 0.045],
    [0.0, 0.0, 0.028],
    [-0.02, 0.0, 0.088],
    [0.0, 0.0, 0.04],
    [0.0, 0.0, 0.026],
    [-0.03, 0.0, 0.03],
    [-0.008, 0.0, 0.045],
    [0.0, 0.0, 0.03],
    [0.0, 0.0, 0.02],
    [0.0, 0.0, 0.025],
    [0.0, 0.0, 0.02],
    [0.0, 0.0, 0.022],
    [0.0, 0.0, 0.02],
    [0.0, 0.0, 0.018],
];

static RIGHT_BIND_POSE: Lazy<[Pose; HAND_JOINT_COUNT]> = Lazy::new(|| {
    let mut poses = [Pose::identity(); HAND_JOINT_COUNT];
    for (pose, offset) in poses.iter_mut().zip(BIND_OFFSETS.iter()) {
        pose.position = Vector3::new(offset[0], offset[1], offset[2]);
    }
    poses
});

pub fn parent(joint: HandJointId) -> Option<HandJointId> {
    PARENTS[joint.index()]
}

/// Joints of a finger from the base outwards, tip last.
pub fn finger_joints(finger: HandFinger) -> &'static [HandJointId] {
    match finger {
        HandFinger::Thumb => &THUMB_JOINTS,
        HandFinger::Index => &INDEX_JOINTS,
        HandFinger::Middle => &MIDDLE_JOINTS,
        HandFinger::Ring => &RING_JOINTS,
        HandFinger::Pinky => &PINKY_JOINTS,
    }
}

pub fn finger_tip(finger: HandFinger) -> HandJointId {
    let joints = finger_joints(finger);
    joints[joints.len() - 1]
}

/// Reflects a pose across the YZ plane, turning a right-hand pose into the
/// matching left-hand one and back.
pub fn mirror_pose(pose: &Pose) -> Pose {
    let q = pose.rotation;
    Pose {
        position: Vector3::new(-pose.position.x, pose.position.y, pose.position.z),
        rotation: UnitQuaternion::new_unchecked(Quaternion::new(q.w, q.i, -q.j, -q.k)),
    }
}

/// Open-hand rest pose in local space.
pub fn bind_pose_local(handedness: Handedness) -> [Pose; HAND_JOINT_COUNT] {
    match handedness {
        Handedness::Right => *RIGHT_BIND_POSE,
        Handedness::Left => {
            let mut poses = *RIGHT_BIND_POSE;
            for pose in poses.iter_mut() {
                *pose = mirror_pose(pose);
            }
            poses
        }
    }
}

/// Bends every segment of `finger` around its local X axis by `angle`
/// radians. The tip keeps its parent's frame and is left unrotated.
pub fn curl_finger(local: &mut [Pose; HAND_JOINT_COUNT], finger: HandFinger, angle: f32) {
    let bend = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle);
    let joints = finger_joints(finger);
    for joint in &joints[..joints.len() - 1] {
        let pose = &mut local[joint.index()];
        pose.rotation = pose.rotation * bend;
    }
}

/// Chains parent-relative poses down to the wrist. The wrist itself maps to
/// identity. An empty input yields an empty output.
pub fn poses_from_wrist(local: &HandJointPoses) -> HandJointPoses {
    let local = local.as_slice();
    if local.len() != HAND_JOINT_COUNT {
        return HandJointPoses::empty();
    }

    let mut from_wrist = [Pose::identity(); HAND_JOINT_COUNT];
    for joint in HandJointId::ALL.iter().skip(1) {
        if let Some(parent) = parent(*joint) {
            from_wrist[joint.index()] =
                from_wrist[parent.index()].compose(&local[joint.index()]);
        }
    }
    HandJointPoses::from_array(from_wrist)
}

/// Palm center in wrist space: halfway between the wrist and the mean of the
/// four knuckles, shifted by `offset` and oriented like the wrist.
pub fn palm_pose(from_wrist: &HandJointPoses, offset: &Vector3<f32>) -> Option<Pose> {
    let wrist = from_wrist.get(HandWristRoot)?;
    let mut knuckle_sum = Vector3::zeros();
    for knuckle in KNUCKLES {
        knuckle_sum += from_wrist.get(knuckle)?.position;
    }
    let knuckle_center = knuckle_sum / KNUCKLES.len() as f32;

    Some(Pose {
        position: (wrist.position + knuckle_center) * 0.5 + wrist.rotation * *offset,
        rotation: wrist.rotation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_precede_children() {
        for joint in HandJointId::ALL {
            if let Some(p) = parent(joint) {
                assert!(p.index() < joint.index(), "{:?} before {:?}", p, joint);
            }
        }
        assert_eq!(parent(HandWristRoot), None);
    }

    #[test]
    fn test_finger_joints_end_in_tips() {
        for finger in HandFinger::ALL {
            let tip = finger_tip(finger);
            assert_eq!(tip.finger(), Some(finger));
            for joint in finger_joints(finger) {
                assert_eq!(joint.finger(), Some(finger));
            }
        }
    }

    #[test]
    fn test_from_wrist_chains_offsets() {
        let local = HandJointPoses::from_array(bind_pose_local(Handedness::Right));
        let from_wrist = poses_from_wrist(&local);

        assert_eq!(from_wrist.len(), HAND_JOINT_COUNT);
        assert!(from_wrist.get(HandWristRoot).unwrap().approx_eq(&Pose::identity(), 1e-6));

        // 0.02 + 0.0 + 0.0 + 0.0 on X, 0.09 + 0.04 + 0.025 + 0.02 on Z
        let tip = from_wrist.get(HandIndexTip).unwrap().position;
        assert!((tip - Vector3::new(0.02, 0.0, 0.175)).norm() < 1e-5);
    }

    #[test]
    fn test_from_wrist_of_empty_is_empty() {
        assert!(poses_from_wrist(&HandJointPoses::empty()).is_empty());
    }

    #[test]
    fn test_left_bind_pose_mirrors_right() {
        let right = bind_pose_local(Handedness::Right);
        let left = bind_pose_local(Handedness::Left);
        for (r, l) in right.iter().zip(left.iter()) {
            assert_eq!(r.position.x, -l.position.x);
            assert_eq!(r.position.z, l.position.z);
        }
    }

    #[test]
    fn test_curl_moves_tip_toward_palm() {
        let mut local = bind_pose_local(Handedness::Right);
        let open = poses_from_wrist(&HandJointPoses::from_array(local));
        curl_finger(&mut local, HandFinger::Index, 0.6);
        let curled = poses_from_wrist(&HandJointPoses::from_array(local));

        let open_tip = open.get(HandIndexTip).unwrap().position;
        let curled_tip = curled.get(HandIndexTip).unwrap().position;
        assert!(curled_tip.z < open_tip.z);
        // other fingers untouched
        assert_eq!(open.get(HandMiddleTip).unwrap(), curled.get(HandMiddleTip).unwrap());
    }

    #[test]
    fn test_palm_sits_between_wrist_and_knuckles() {
        let local = HandJointPoses::from_array(bind_pose_local(Handedness::Right));
        let from_wrist = poses_from_wrist(&local);
        let palm = palm_pose(&from_wrist, &Vector3::zeros()).unwrap();

        assert!(palm.position.z > 0.0);
        assert!(palm.position.z < from_wrist.get(HandMiddle1).unwrap().position.z);
        assert!(palm_pose(&HandJointPoses::empty(), &Vector3::zeros()).is_none());
    }
}
