// src/lib.rs
//! Frame-coherent hand tracking state for XR runtimes.
//!
//! [`Hand`] is the query surface consumers poll once per frame. A tracking
//! source feeds [`HandDataSnapshot`]s into a [`TrackedHand`], which publishes
//! them atomically, bumps the data version and fires the update signal.

pub mod aspects;
pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod filter;
pub mod hand;
pub mod joints;
pub mod pose;
pub mod recording;
pub mod simulation;
pub mod skeleton;
pub mod snapshot;
pub mod source;
pub mod space;
pub mod types;

pub use aspects::AspectRegistry;
pub use backend::TrackedHand;
pub use config::HandTrackingConfig;
pub use error::{HandError, HandResult};
pub use events::{HandUpdatedSignal, SubscriptionId};
pub use hand::{DataVersionWatcher, Hand, HandExt};
pub use joints::HandJointPoses;
pub use pose::Pose;
pub use snapshot::{FingerState, HandDataSnapshot};
pub use source::{HandDataSource, TimedSnapshot};
pub use space::{TrackingSpace, TrackingToWorldTransformer};
pub use types::{HandFinger, HandJointId, Handedness, FINGER_COUNT, HAND_JOINT_COUNT};
