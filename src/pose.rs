// src/pose.rs
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

const UNIT_ROTATION_TOLERANCE: f32 = 1e-3;

/// Position plus orientation. Which space it lives in (world, skeleton
/// local, wrist relative, tracking) is decided by the query that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn new(position: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Applies `child` in the frame of `self` (parent ∘ child).
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * child.position,
            rotation: self.rotation * child.rotation,
        }
    }

    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            position: rotation * -self.position,
            rotation,
        }
    }

    /// Expresses `self` in the frame of `parent`.
    pub fn relative_to(&self, parent: &Pose) -> Pose {
        parent.inverse().compose(self)
    }

    pub fn with_scaled_position(&self, scale: f32) -> Pose {
        Pose {
            position: self.position * scale,
            rotation: self.rotation,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
            && self.rotation.coords.iter().all(|c| c.is_finite())
    }

    /// Deserialized rotations are not renormalized, so a pose read from disk
    /// can carry a zero or stretched quaternion.
    pub fn has_unit_rotation(&self) -> bool {
        (self.rotation.coords.norm() - 1.0).abs() < UNIT_ROTATION_TOLERANCE
    }

    pub fn approx_eq(&self, other: &Pose, epsilon: f32) -> bool {
        (self.position - other.position).norm() <= epsilon
            && self.rotation.angle_to(&other.rotation) <= epsilon
    }
}

impl From<Isometry3<f32>> for Pose {
    fn from(iso: Isometry3<f32>) -> Self {
        Pose {
            position: iso.translation.vector,
            rotation: iso.rotation,
        }
    }
}

impl From<Pose> for Isometry3<f32> {
    fn from(pose: Pose) -> Self {
        Isometry3::from_parts(Translation3::from(pose.position), pose.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_compose_matches_isometry() {
        let parent = Pose::new(
            Vector3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_euler_angles(0.0, FRAC_PI_2, 0.0),
        );
        let child = Pose::from_position(Vector3::new(0.0, 0.0, 1.0));

        let ours = parent.compose(&child);
        let theirs: Pose = (Isometry3::from(parent) * Isometry3::from(child)).into();
        assert!(ours.approx_eq(&theirs, 1e-5));
        assert!((ours.position - Vector3::new(2.0, 2.0, 3.0)).norm() < 1e-5);
    }

    #[test]
    fn test_relative_to_undoes_compose() {
        let parent = Pose::new(
            Vector3::new(0.3, -0.1, 0.5),
            UnitQuaternion::from_euler_angles(0.2, 0.4, -0.3),
        );
        let child = Pose::new(
            Vector3::new(0.02, 0.0, 0.07),
            UnitQuaternion::from_euler_angles(0.5, 0.0, 0.1),
        );
        let world = parent.compose(&child);
        assert!(world.relative_to(&parent).approx_eq(&child, 1e-5));
    }

    #[test]
    fn test_non_finite_detected() {
        let mut pose = Pose::identity();
        assert!(pose.is_finite());
        pose.position.x = f32::NAN;
        assert!(!pose.is_finite());
    }
}
