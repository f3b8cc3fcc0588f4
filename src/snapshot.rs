// src/snapshot.rs
use crate::error::{HandError, HandResult};
use crate::pose::Pose;
use crate::types::{HandFinger, FINGER_COUNT, HAND_JOINT_COUNT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FingerState {
    pub is_pinching: bool,
    pub pinch_strength: f32,
    pub is_high_confidence: bool,
}

impl FingerState {
    pub fn from_strength(strength: f32, pinch_threshold: f32, is_high_confidence: bool) -> Self {
        let strength = strength.clamp(0.0, 1.0);
        Self {
            is_pinching: strength >= pinch_threshold,
            pinch_strength: strength,
            is_high_confidence,
        }
    }
}

/// One frame of tracking data as a backend publishes it.
///
/// Root, pointer and center eye are in tracking space; `None` means the pose
/// is not valid this frame. `joints_local` holds parent-relative poses and is
/// either empty (skeleton not initialized) or a full skeleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandDataSnapshot {
    pub is_data_valid: bool,
    pub is_connected: bool,
    pub is_high_confidence: bool,
    pub is_dominant_hand: bool,
    pub hand_scale: f32,
    pub root: Option<Pose>,
    pub pointer: Option<Pose>,
    pub joints_local: Vec<Pose>,
    pub fingers: [FingerState; FINGER_COUNT],
    pub center_eye: Option<Pose>,
}

impl Default for HandDataSnapshot {
    fn default() -> Self {
        Self::disconnected()
    }
}

impl HandDataSnapshot {
    pub fn disconnected() -> Self {
        Self {
            is_data_valid: false,
            is_connected: false,
            is_high_confidence: false,
            is_dominant_hand: false,
            hand_scale: 1.0,
            root: None,
            pointer: None,
            joints_local: Vec::new(),
            fingers: [FingerState::default(); FINGER_COUNT],
            center_eye: None,
        }
    }

    /// Connected, high confidence hand at `root` with the given skeleton.
    pub fn tracked(root: Pose, joints_local: [Pose; HAND_JOINT_COUNT]) -> Self {
        Self {
            is_data_valid: true,
            is_connected: true,
            is_high_confidence: true,
            root: Some(root),
            joints_local: joints_local.to_vec(),
            fingers: [FingerState {
                is_high_confidence: true,
                ..FingerState::default()
            }; FINGER_COUNT],
            ..Self::disconnected()
        }
    }

    pub fn finger(&self, finger: HandFinger) -> &FingerState {
        &self.fingers[finger.index()]
    }

    pub fn finger_mut(&mut self, finger: HandFinger) -> &mut FingerState {
        &mut self.fingers[finger.index()]
    }

    pub fn validate(&self) -> HandResult<()> {
        if !self.joints_local.is_empty() && self.joints_local.len() != HAND_JOINT_COUNT {
            return Err(HandError::JointCountMismatch {
                expected: HAND_JOINT_COUNT,
                actual: self.joints_local.len(),
            });
        }
        if !self.hand_scale.is_finite() || self.hand_scale <= 0.0 {
            return Err(HandError::InvalidScale(self.hand_scale));
        }
        if self.is_high_confidence && !(self.is_connected && self.is_data_valid) {
            return Err(HandError::InvariantViolated(
                "high confidence hand must be connected with valid data",
            ));
        }
        if self.is_high_confidence && self.root.is_none() {
            return Err(HandError::InvariantViolated(
                "high confidence hand must have a root pose",
            ));
        }

        let poses = [
            ("root pose", self.root),
            ("pointer pose", self.pointer),
            ("center eye pose", self.center_eye),
        ];
        for (what, pose) in poses {
            if pose.map_or(false, |p| !p.is_finite()) {
                return Err(HandError::NonFinite(what));
            }
        }
        if self.joints_local.iter().any(|p| !p.is_finite()) {
            return Err(HandError::NonFinite("joint pose"));
        }
        for (what, pose) in poses {
            if pose.map_or(false, |p| !p.has_unit_rotation()) {
                return Err(HandError::DegenerateRotation(what));
            }
        }
        if self.joints_local.iter().any(|p| !p.has_unit_rotation()) {
            return Err(HandError::DegenerateRotation("joint pose"));
        }
        if self.fingers.iter().any(|f| !f.pinch_strength.is_finite()) {
            return Err(HandError::NonFinite("pinch strength"));
        }
        Ok(())
    }

    /// Clamps pinch strengths into `[0, 1]`.
    pub fn normalize(&mut self) {
        for finger in self.fingers.iter_mut() {
            finger.pinch_strength = finger.pinch_strength.clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::bind_pose_local;
    use crate::types::Handedness;
    use nalgebra::{Quaternion, UnitQuaternion};

    fn tracked() -> HandDataSnapshot {
        HandDataSnapshot::tracked(Pose::identity(), bind_pose_local(Handedness::Right))
    }

    #[test]
    fn test_constructors_are_valid() {
        assert!(HandDataSnapshot::disconnected().validate().is_ok());
        assert!(tracked().validate().is_ok());
    }

    #[test]
    fn test_high_confidence_requires_connection_and_root() {
        let mut snapshot = tracked();
        snapshot.is_connected = false;
        assert!(matches!(snapshot.validate(), Err(HandError::InvariantViolated(_))));

        let mut snapshot = tracked();
        snapshot.root = None;
        assert!(matches!(snapshot.validate(), Err(HandError::InvariantViolated(_))));
    }

    #[test]
    fn test_partial_skeleton_rejected() {
        let mut snapshot = tracked();
        snapshot.joints_local.truncate(10);
        assert!(matches!(
            snapshot.validate(),
            Err(HandError::JointCountMismatch { expected: 24, actual: 10 })
        ));
    }

    #[test]
    fn test_nan_strength_rejected_but_overshoot_clamped() {
        let mut snapshot = tracked();
        snapshot.finger_mut(HandFinger::Ring).pinch_strength = f32::NAN;
        assert!(matches!(snapshot.validate(), Err(HandError::NonFinite(_))));

        let mut snapshot = tracked();
        snapshot.finger_mut(HandFinger::Ring).pinch_strength = 1.4;
        snapshot.finger_mut(HandFinger::Thumb).pinch_strength = -0.2;
        assert!(snapshot.validate().is_ok());
        snapshot.normalize();
        assert_eq!(snapshot.finger(HandFinger::Ring).pinch_strength, 1.0);
        assert_eq!(snapshot.finger(HandFinger::Thumb).pinch_strength, 0.0);
    }

    #[test]
    fn test_degenerate_rotation_rejected() {
        let mut snapshot = tracked();
        snapshot.root = Some(Pose {
            rotation: UnitQuaternion::new_unchecked(Quaternion::new(0.0, 0.0, 0.0, 0.0)),
            ..Pose::identity()
        });
        assert!(matches!(
            snapshot.validate(),
            Err(HandError::DegenerateRotation("root pose"))
        ));

        let mut snapshot = tracked();
        snapshot.joints_local[5].rotation =
            UnitQuaternion::new_unchecked(Quaternion::new(2.0, 0.0, 0.0, 0.0));
        assert!(matches!(
            snapshot.validate(),
            Err(HandError::DegenerateRotation("joint pose"))
        ));
    }

    #[test]
    fn test_bad_scale_rejected() {
        let mut snapshot = tracked();
        snapshot.hand_scale = 0.0;
        assert!(matches!(snapshot.validate(), Err(HandError::InvalidScale(_))));
    }

    #[test]
    fn test_finger_state_threshold() {
        let state = FingerState::from_strength(0.85, 0.8, true);
        assert!(state.is_pinching);
        let state = FingerState::from_strength(1.7, 0.8, false);
        assert_eq!(state.pinch_strength, 1.0);
        assert!(!FingerState::from_strength(0.3, 0.8, true).is_pinching);
    }
}
