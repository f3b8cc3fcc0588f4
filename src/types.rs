// src/types.rs
use crate::error::HandError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const FINGER_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandFinger {
    Thumb = 0,
    Index = 1,
    Middle = 2,
    Ring = 3,
    Pinky = 4,
}

impl HandFinger {
    pub const ALL: [HandFinger; FINGER_COUNT] = [
        HandFinger::Thumb,
        HandFinger::Index,
        HandFinger::Middle,
        HandFinger::Ring,
        HandFinger::Pinky,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HandFinger::Thumb => "thumb",
            HandFinger::Index => "index",
            HandFinger::Middle => "middle",
            HandFinger::Ring => "ring",
            HandFinger::Pinky => "pinky",
        }
    }
}

impl TryFrom<usize> for HandFinger {
    type Error = HandError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        HandFinger::ALL
            .get(index)
            .copied()
            .ok_or(HandError::FingerIndexOutOfRange(index))
    }
}

/// Number of joints in the hand skeleton topology.
pub const HAND_JOINT_COUNT: usize = 24;

/// Skeletal joints of a tracked hand.
///
/// Discriminants are the storage index inside a joint pose collection and are
/// ordered so that every joint comes after its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandJointId {
    HandWristRoot = 0,
    HandForearmStub = 1,
    HandThumb0 = 2,
    HandThumb1 = 3,
    HandThumb2 = 4,
    HandThumb3 = 5,
    HandIndex1 = 6,
    HandIndex2 = 7,
    HandIndex3 = 8,
    HandMiddle1 = 9,
    HandMiddle2 = 10,
    HandMiddle3 = 11,
    HandRing1 = 12,
    HandRing2 = 13,
    HandRing3 = 14,
    HandPinky0 = 15,
    HandPinky1 = 16,
    HandPinky2 = 17,
    HandPinky3 = 18,
    HandThumbTip = 19,
    HandIndexTip = 20,
    HandMiddleTip = 21,
    HandRingTip = 22,
    HandPinkyTip = 23,
}

impl HandJointId {
    pub const ALL: [HandJointId; HAND_JOINT_COUNT] = [
        HandJointId::HandWristRoot,
        HandJointId::HandForearmStub,
        HandJointId::HandThumb0,
        HandJointId::HandThumb1,
        HandJointId::HandThumb2,
        HandJointId::HandThumb3,
        HandJointId::HandIndex1,
        HandJointId::HandIndex2,
        HandJointId::HandIndex3,
        HandJointId::HandMiddle1,
        HandJointId::HandMiddle2,
        HandJointId::HandMiddle3,
        HandJointId::HandRing1,
        HandJointId::HandRing2,
        HandJointId::HandRing3,
        HandJointId::HandPinky0,
        HandJointId::HandPinky1,
        HandJointId::HandPinky2,
        HandJointId::HandPinky3,
        HandJointId::HandThumbTip,
        HandJointId::HandIndexTip,
        HandJointId::HandMiddleTip,
        HandJointId::HandRingTip,
        HandJointId::HandPinkyTip,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Finger this joint belongs to; `None` for the wrist and forearm stub.
    pub fn finger(self) -> Option<HandFinger> {
        use HandJointId::*;
        match self {
            HandWristRoot | HandForearmStub => None,
            HandThumb0 | HandThumb1 | HandThumb2 | HandThumb3 | HandThumbTip => {
                Some(HandFinger::Thumb)
            }
            HandIndex1 | HandIndex2 | HandIndex3 | HandIndexTip => Some(HandFinger::Index),
            HandMiddle1 | HandMiddle2 | HandMiddle3 | HandMiddleTip => Some(HandFinger::Middle),
            HandRing1 | HandRing2 | HandRing3 | HandRingTip => Some(HandFinger::Ring),
            HandPinky0 | HandPinky1 | HandPinky2 | HandPinky3 | HandPinkyTip => {
                Some(HandFinger::Pinky)
            }
        }
    }
}

impl TryFrom<usize> for HandJointId {
    type Error = HandError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        HandJointId::ALL
            .get(index)
            .copied()
            .ok_or(HandError::JointIndexOutOfRange(index))
    }
}
