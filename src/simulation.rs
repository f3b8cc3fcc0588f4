// src/simulation.rs - Animated hand for demos and tests
use crate::config::HandTrackingConfig;
use crate::filter::KalmanFilter;
use crate::pose::Pose;
use crate::skeleton;
use crate::snapshot::{FingerState, HandDataSnapshot};
use crate::source::{HandDataSource, TimedSnapshot};
use crate::types::{HandFinger, Handedness, FINGER_COUNT};
use nalgebra::{UnitQuaternion, Vector3};

const MAX_FINGER_CURL: f32 = 1.2;
const MAX_THUMB_CURL: f32 = 0.6;

/// Generates a hand that sways in front of the user, cycles through pinches
/// and periodically loses tracking. Fully deterministic in `sim_time`.
pub struct SimulatedHandSource {
    handedness: Handedness,
    config: HandTrackingConfig,
    sim_time: f64,
    phase: f64,
    root_filter: Option<KalmanFilter>,
    was_tracked: bool,
}

impl SimulatedHandSource {
    pub fn new(handedness: Handedness, config: &HandTrackingConfig) -> Self {
        let root_filter = config
            .enable_kalman
            .then(|| KalmanFilter::new(config.frame_interval));

        Self {
            handedness,
            config: config.clone(),
            sim_time: 0.0,
            phase: match handedness {
                Handedness::Right => 0.0,
                Handedness::Left => 1.5,
            },
            root_filter,
            was_tracked: false,
        }
    }

    fn in_dropout(&self, t: f64) -> bool {
        let period = self.config.dropout_period;
        period > 0.0 && t % period >= period - self.config.dropout_duration
    }

    fn side(&self) -> f32 {
        match self.handedness {
            Handedness::Right => 1.0,
            Handedness::Left => -1.0,
        }
    }

    fn center_eye(&self, t: f64) -> Pose {
        Pose::new(
            Vector3::new(0.0, 1.6, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.1 * (t * 0.2).sin() as f32, 0.0),
        )
    }

    fn root(&mut self, t: f64) -> Pose {
        let side = self.side() as f64;
        // Sensor jitter on top of the sway
        let jitter = 0.002 * (t * 37.0).sin();
        let measured = Vector3::new(
            side * 0.2 + 0.04 * (t * 0.5 + self.phase).cos() + jitter,
            1.2 + 0.05 * (t + self.phase).sin() + jitter,
            0.35 + 0.03 * (t * 0.5).cos(),
        );
        let position = match self.root_filter.as_mut() {
            Some(filter) => filter.step(measured),
            None => measured,
        };

        let yaw = 0.2 * (t * 0.3 + self.phase).sin();
        let roll = 0.15 * (t * 0.25).sin();
        Pose::new(
            position.cast::<f32>(),
            UnitQuaternion::from_euler_angles(roll as f32, 0.0, (side * yaw) as f32),
        )
    }

    fn pinch_strengths(&self, t: f64) -> [f32; FINGER_COUNT] {
        let wave = |speed: f64, offset: f64, gain: f64| -> f32 {
            (gain * (0.5 + 0.5 * (t * speed + self.phase + offset).sin())) as f32
        };
        let index = wave(1.3, 0.0, 1.0);
        let middle = wave(0.7, 1.0, 0.9);
        let ring = wave(0.5, 2.0, 0.6);
        let pinky = wave(0.4, 3.0, 0.5);
        // The thumb takes part in every pinch
        let thumb = index.max(middle).max(ring).max(pinky);
        [thumb, index, middle, ring, pinky]
    }

    fn confidences(&self, t: f64) -> [f32; FINGER_COUNT] {
        let mut confidences = [0.0; FINGER_COUNT];
        for (i, c) in confidences.iter_mut().enumerate() {
            *c = (0.8 + 0.2 * (t * 0.9 + i as f64 + self.phase).cos()) as f32;
        }
        confidences
    }

    fn tracked_snapshot(&mut self, t: f64) -> HandDataSnapshot {
        let root = self.root(t);
        let strengths = self.pinch_strengths(t);
        let confidences = self.confidences(t);
        let threshold = self.config.high_confidence_threshold;

        let mut joints = skeleton::bind_pose_local(self.handedness);
        let mut fingers = [FingerState::default(); FINGER_COUNT];
        for finger in HandFinger::ALL {
            let i = finger.index();
            let max_curl = match finger {
                HandFinger::Thumb => MAX_THUMB_CURL,
                _ => MAX_FINGER_CURL,
            };
            skeleton::curl_finger(&mut joints, finger, strengths[i] * max_curl);
            fingers[i] = FingerState::from_strength(
                strengths[i],
                self.config.pinch_threshold,
                confidences[i] >= threshold,
            );
        }

        let mean_confidence = confidences.iter().sum::<f32>() / FINGER_COUNT as f32;
        let mut pointer_offset = self.config.pointer_offset();
        pointer_offset.x *= self.side();

        HandDataSnapshot {
            is_data_valid: true,
            is_connected: true,
            is_high_confidence: mean_confidence >= threshold,
            is_dominant_hand: self.handedness == Handedness::Right,
            hand_scale: 1.0,
            root: Some(root),
            pointer: Some(root.compose(&Pose::from_position(pointer_offset))),
            joints_local: joints.to_vec(),
            fingers,
            center_eye: Some(self.center_eye(t)),
        }
    }
}

impl HandDataSource for SimulatedHandSource {
    fn next_frame(&mut self) -> Option<TimedSnapshot> {
        let t = self.sim_time;
        self.sim_time += self.config.frame_interval;

        let tracked = !self.in_dropout(t);
        if tracked != self.was_tracked {
            if tracked {
                tracing::debug!("Simulated {} hand tracking acquired at {:.3}s", self.handedness, t);
            } else {
                tracing::debug!("Simulated {} hand tracking lost at {:.3}s", self.handedness, t);
                if let Some(filter) = self.root_filter.as_mut() {
                    filter.reset();
                }
            }
            self.was_tracked = tracked;
        }

        let snapshot = if tracked {
            self.tracked_snapshot(t)
        } else {
            HandDataSnapshot {
                is_dominant_hand: self.handedness == Handedness::Right,
                center_eye: Some(self.center_eye(t)),
                ..HandDataSnapshot::disconnected()
            }
        };

        Some(TimedSnapshot {
            timestamp: t,
            snapshot,
        })
    }
}
