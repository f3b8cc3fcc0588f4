// src/hand.rs - Hand state accessor contract
use crate::events::HandUpdatedSignal;
use crate::joints::HandJointPoses;
use crate::pose::Pose;
use crate::space::TrackingToWorldTransformer;
use crate::types::{HandFinger, HandJointId, Handedness};
use std::any::{Any, TypeId};
use std::rc::Rc;

/// Read-only view of one tracked hand.
///
/// Every query answers from the snapshot the backend published last, returns
/// immediately and never mutates tracking state. Missing data is ordinary
/// steady state and shows up as `None` or `false`; poll again next frame.
///
/// Implementations guarantee:
/// - `is_high_confidence()` implies `is_connected()` and `is_root_pose_valid()`.
/// - `current_data_version()` grows on every observable change and only then.
/// - [`Hand::when_hand_updated`] fires once after each publish, when every
///   getter already reflects the new snapshot.
pub trait Hand {
    fn handedness(&self) -> Handedness;

    fn is_connected(&self) -> bool;

    /// Connected and carrying a usable snapshot.
    fn is_tracked_data_valid(&self) -> bool;

    fn is_high_confidence(&self) -> bool;

    fn is_dominant_hand(&self) -> bool;

    /// Hand size multiplier relative to the reference skeleton.
    fn scale(&self) -> f32;

    fn current_data_version(&self) -> u64;

    fn finger_is_pinching(&self, finger: HandFinger) -> bool;

    fn index_finger_is_pinching(&self) -> bool {
        self.finger_is_pinching(HandFinger::Index)
    }

    /// Always within `[0, 1]`; `0` when nothing is tracked.
    fn finger_pinch_strength(&self, finger: HandFinger) -> f32;

    fn finger_is_high_confidence(&self, finger: HandFinger) -> bool;

    fn is_pointer_pose_valid(&self) -> bool;

    /// World-space ray origin for interaction raycasts.
    fn pointer_pose(&self) -> Option<Pose>;

    /// World space.
    fn joint_pose(&self, joint: HandJointId) -> Option<Pose>;

    /// Skeleton local space: relative to the parent joint, unscaled.
    fn joint_pose_local(&self, joint: HandJointId) -> Option<Pose> {
        self.joint_poses_local()?.get(joint).copied()
    }

    /// Relative to the wrist joint, unscaled.
    fn joint_pose_from_wrist(&self, joint: HandJointId) -> Option<Pose> {
        self.joint_poses_from_wrist()?.get(joint).copied()
    }

    /// The whole skeleton in local space. `None` when there is no valid data;
    /// `unwrap_or_default()` then gives the empty collection.
    fn joint_poses_local(&self) -> Option<HandJointPoses>;

    fn joint_poses_from_wrist(&self) -> Option<HandJointPoses>;

    fn palm_pose_local(&self) -> Option<Pose>;

    fn is_root_pose_valid(&self) -> bool;

    /// Wrist pose in world space. Confidence is reported by
    /// [`Hand::is_high_confidence`], not by this returning `Some`.
    fn root_pose(&self) -> Option<Pose>;

    fn is_center_eye_pose_valid(&self) -> bool;

    /// Head pose in world space, independent of the hand's own tracking.
    fn center_eye_pose(&self) -> Option<Pose>;

    fn tracking_to_world_space(&self) -> Rc<dyn TrackingToWorldTransformer>;

    /// Type-keyed aspect lookup; prefer [`HandExt::hand_aspect`].
    fn find_aspect(&self, type_id: TypeId) -> Option<Rc<dyn Any>>;

    fn when_hand_updated(&self) -> &HandUpdatedSignal;
}

pub trait HandExt: Hand {
    /// Finds the aspect of type `T` associated with this hand.
    fn hand_aspect<T: Any>(&self) -> Option<Rc<T>> {
        self.find_aspect(TypeId::of::<T>())?.downcast::<T>().ok()
    }
}

impl<H: Hand + ?Sized> HandExt for H {}

/// Remembers the last data version seen so consumers can tell whether
/// anything they cached from a hand has gone stale.
#[derive(Debug, Default, Clone)]
pub struct DataVersionWatcher {
    last_seen: Option<u64>,
}

impl DataVersionWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// True on the first call and whenever the version moved since the last one.
    pub fn has_changed(&mut self, hand: &dyn Hand) -> bool {
        let version = hand.current_data_version();
        let changed = self.last_seen != Some(version);
        self.last_seen = Some(version);
        changed
    }

    pub fn last_seen(&self) -> Option<u64> {
        self.last_seen
    }
}
