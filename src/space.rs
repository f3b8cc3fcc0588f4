// src/space.rs
use crate::pose::Pose;
use std::cell::Cell;
use std::rc::Rc;

/// Converts tracking-space poses into world space. Implementations are read
/// at query time, so an owner mutating the transform between frames is seen
/// by the very next query.
pub trait TrackingToWorldTransformer {
    fn to_world_pose(&self, pose: &Pose) -> Pose;
    fn to_tracking_pose(&self, pose: &Pose) -> Pose;
}

/// Tracking origin placed in the world by the scene graph.
#[derive(Debug, Default)]
pub struct TrackingSpace {
    origin: Cell<Pose>,
}

impl TrackingSpace {
    pub fn new(origin: Pose) -> Rc<Self> {
        Rc::new(Self {
            origin: Cell::new(origin),
        })
    }

    pub fn origin(&self) -> Pose {
        self.origin.get()
    }

    pub fn set_origin(&self, origin: Pose) {
        self.origin.set(origin);
    }
}

impl TrackingToWorldTransformer for TrackingSpace {
    fn to_world_pose(&self, pose: &Pose) -> Pose {
        self.origin.get().compose(pose)
    }

    fn to_tracking_pose(&self, pose: &Pose) -> Pose {
        pose.relative_to(&self.origin.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn test_round_trip_through_world() {
        let space = TrackingSpace::new(Pose::new(
            Vector3::new(0.0, 1.6, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.7, 0.0),
        ));
        let pose = Pose::from_position(Vector3::new(0.1, 0.0, 0.3));
        let world = space.to_world_pose(&pose);
        assert!(space.to_tracking_pose(&world).approx_eq(&pose, 1e-5));
    }

    #[test]
    fn test_origin_change_is_visible_immediately() {
        let space = TrackingSpace::new(Pose::identity());
        let pose = Pose::from_position(Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(space.to_world_pose(&pose).position, Vector3::new(0.0, 0.0, 1.0));

        space.set_origin(Pose::from_position(Vector3::new(2.0, 0.0, 0.0)));
        assert_eq!(space.to_world_pose(&pose).position, Vector3::new(2.0, 0.0, 1.0));
    }
}
