// src/backend.rs - Reference tracking backend
use crate::aspects::AspectRegistry;
use crate::config::HandTrackingConfig;
use crate::error::HandResult;
use crate::events::HandUpdatedSignal;
use crate::hand::Hand;
use crate::joints::HandJointPoses;
use crate::pose::Pose;
use crate::skeleton;
use crate::snapshot::HandDataSnapshot;
use crate::space::TrackingToWorldTransformer;
use crate::types::{HandFinger, HandJointId, Handedness};
use nalgebra::Vector3;
use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use uuid::Uuid;

/// Published snapshot plus everything derived from it, swapped as one unit.
#[derive(Debug)]
struct HandFrame {
    snapshot: HandDataSnapshot,
    joints_local: HandJointPoses,
    joints_from_wrist: HandJointPoses,
    palm_local: Option<Pose>,
}

impl HandFrame {
    fn build(snapshot: HandDataSnapshot, palm_offset: &Vector3<f32>) -> HandResult<Self> {
        let joints_local = if snapshot.joints_local.is_empty() {
            HandJointPoses::empty()
        } else {
            HandJointPoses::from_vec(snapshot.joints_local.clone())?
        };
        let joints_from_wrist = skeleton::poses_from_wrist(&joints_local);
        let palm_local = skeleton::palm_pose(&joints_from_wrist, palm_offset);

        Ok(Self {
            snapshot,
            joints_local,
            joints_from_wrist,
            palm_local,
        })
    }

    fn is_tracked(&self) -> bool {
        self.snapshot.is_connected && self.snapshot.is_data_valid
    }
}

/// A hand whose state is pushed in by a tracking source once per frame.
///
/// Publishing goes through `&self` so update listeners holding the hand can
/// query it from inside their callback. Each publish replaces the whole
/// frame before the version moves and before listeners run, so no reader
/// ever sees half of one frame and half of another.
pub struct TrackedHand {
    session_id: Uuid,
    handedness: Handedness,
    palm_offset: Vector3<f32>,
    frame: RefCell<Rc<HandFrame>>,
    version: Cell<u64>,
    tracking_space: Rc<dyn TrackingToWorldTransformer>,
    aspects: RefCell<AspectRegistry>,
    updated: HandUpdatedSignal,
}

impl TrackedHand {
    pub fn new(
        handedness: Handedness,
        tracking_space: Rc<dyn TrackingToWorldTransformer>,
        config: &HandTrackingConfig,
    ) -> Self {
        let mut palm_offset = config.palm_offset();
        if handedness == Handedness::Left {
            palm_offset.x = -palm_offset.x;
        }

        let empty = HandFrame {
            snapshot: HandDataSnapshot::disconnected(),
            joints_local: HandJointPoses::empty(),
            joints_from_wrist: HandJointPoses::empty(),
            palm_local: None,
        };

        let session_id = Uuid::new_v4();
        tracing::debug!("Created {} hand, session {}", handedness, session_id);

        Self {
            session_id,
            handedness,
            palm_offset,
            frame: RefCell::new(Rc::new(empty)),
            version: Cell::new(0),
            tracking_space,
            aspects: RefCell::new(AspectRegistry::new()),
            updated: HandUpdatedSignal::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The snapshot currently visible to queries.
    pub fn snapshot(&self) -> HandDataSnapshot {
        self.frame().snapshot.clone()
    }

    /// Publishes a new frame. Returns `Ok(false)` when nothing observable
    /// changed, in which case the version stays put and nobody is notified.
    /// An invalid snapshot is rejected and the current frame kept.
    pub fn publish(&self, mut snapshot: HandDataSnapshot) -> HandResult<bool> {
        if let Err(e) = snapshot.validate() {
            tracing::warn!("Rejected {} hand snapshot: {}", self.handedness, e);
            return Err(e);
        }
        snapshot.normalize();

        if self.frame().snapshot == snapshot {
            tracing::trace!("{} hand snapshot unchanged", self.handedness);
            return Ok(false);
        }

        let frame = HandFrame::build(snapshot, &self.palm_offset)?;
        *self.frame.borrow_mut() = Rc::new(frame);

        let version = self.version.get() + 1;
        self.version.set(version);
        tracing::trace!("{} hand published version {}", self.handedness, version);

        let fired = self.updated.notify();
        tracing::trace!("Notified {} hand update listeners", fired);
        Ok(true)
    }

    /// Publishes a disconnected frame, keeping the head pose.
    pub fn disconnect(&self) -> HandResult<bool> {
        let current = self.frame();
        let snapshot = HandDataSnapshot {
            is_dominant_hand: current.snapshot.is_dominant_hand,
            hand_scale: current.snapshot.hand_scale,
            center_eye: current.snapshot.center_eye,
            ..HandDataSnapshot::disconnected()
        };
        self.publish(snapshot)
    }

    pub fn register_aspect<T: Any>(&self, aspect: Rc<T>) {
        self.aspects.borrow_mut().register(aspect);
    }

    pub fn remove_aspect<T: Any>(&self) -> Option<Rc<T>> {
        self.aspects.borrow_mut().remove::<T>()
    }

    fn frame(&self) -> Rc<HandFrame> {
        Rc::clone(&self.frame.borrow())
    }

    fn to_world(&self, pose: &Pose) -> Pose {
        self.tracking_space.to_world_pose(pose)
    }
}

impl Hand for TrackedHand {
    fn handedness(&self) -> Handedness {
        self.handedness
    }

    fn is_connected(&self) -> bool {
        self.frame().snapshot.is_connected
    }

    fn is_tracked_data_valid(&self) -> bool {
        self.frame().is_tracked()
    }

    fn is_high_confidence(&self) -> bool {
        let frame = self.frame();
        frame.is_tracked() && frame.snapshot.is_high_confidence
    }

    fn is_dominant_hand(&self) -> bool {
        self.frame().snapshot.is_dominant_hand
    }

    fn scale(&self) -> f32 {
        self.frame().snapshot.hand_scale
    }

    fn current_data_version(&self) -> u64 {
        self.version.get()
    }

    fn finger_is_pinching(&self, finger: HandFinger) -> bool {
        let frame = self.frame();
        frame.is_tracked() && frame.snapshot.finger(finger).is_pinching
    }

    fn finger_pinch_strength(&self, finger: HandFinger) -> f32 {
        let frame = self.frame();
        if frame.is_tracked() {
            frame.snapshot.finger(finger).pinch_strength
        } else {
            0.0
        }
    }

    fn finger_is_high_confidence(&self, finger: HandFinger) -> bool {
        let frame = self.frame();
        frame.is_tracked() && frame.snapshot.finger(finger).is_high_confidence
    }

    fn is_pointer_pose_valid(&self) -> bool {
        let frame = self.frame();
        frame.is_tracked() && frame.snapshot.pointer.is_some()
    }

    fn pointer_pose(&self) -> Option<Pose> {
        let frame = self.frame();
        if !frame.is_tracked() {
            return None;
        }
        frame.snapshot.pointer.map(|p| self.to_world(&p))
    }

    fn joint_pose(&self, joint: HandJointId) -> Option<Pose> {
        let frame = self.frame();
        if !frame.is_tracked() {
            return None;
        }
        let root = frame.snapshot.root?;
        let from_wrist = frame.joints_from_wrist.get(joint)?;
        let tracking = root.compose(&from_wrist.with_scaled_position(frame.snapshot.hand_scale));
        Some(self.to_world(&tracking))
    }

    fn joint_poses_local(&self) -> Option<HandJointPoses> {
        let frame = self.frame();
        (frame.is_tracked() && !frame.joints_local.is_empty()).then(|| frame.joints_local.clone())
    }

    fn joint_poses_from_wrist(&self) -> Option<HandJointPoses> {
        let frame = self.frame();
        (frame.is_tracked() && !frame.joints_from_wrist.is_empty())
            .then(|| frame.joints_from_wrist.clone())
    }

    fn palm_pose_local(&self) -> Option<Pose> {
        let frame = self.frame();
        if !frame.is_tracked() {
            return None;
        }
        frame.palm_local
    }

    fn is_root_pose_valid(&self) -> bool {
        let frame = self.frame();
        frame.is_tracked() && frame.snapshot.root.is_some()
    }

    fn root_pose(&self) -> Option<Pose> {
        let frame = self.frame();
        if !frame.is_tracked() {
            return None;
        }
        frame.snapshot.root.map(|p| self.to_world(&p))
    }

    fn is_center_eye_pose_valid(&self) -> bool {
        self.frame().snapshot.center_eye.is_some()
    }

    fn center_eye_pose(&self) -> Option<Pose> {
        self.frame().snapshot.center_eye.map(|p| self.to_world(&p))
    }

    fn tracking_to_world_space(&self) -> Rc<dyn TrackingToWorldTransformer> {
        Rc::clone(&self.tracking_space)
    }

    fn find_aspect(&self, type_id: TypeId) -> Option<Rc<dyn Any>> {
        self.aspects.borrow().find(type_id)
    }

    fn when_hand_updated(&self) -> &HandUpdatedSignal {
        &self.updated
    }
}

impl std::fmt::Debug for TrackedHand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedHand")
            .field("session_id", &self.session_id)
            .field("handedness", &self.handedness)
            .field("version", &self.version.get())
            .finish()
    }
}
