// src/source.rs
use crate::backend::TrackedHand;
use crate::error::HandResult;
use crate::snapshot::HandDataSnapshot;
use serde::{Deserialize, Serialize};

/// A snapshot stamped with the source's clock, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSnapshot {
    pub timestamp: f64,
    pub snapshot: HandDataSnapshot,
}

/// Produces one snapshot per update cycle for a [`TrackedHand`].
pub trait HandDataSource {
    /// `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<TimedSnapshot>;
}

/// Runs one update cycle: pulls a frame from `source` and publishes it.
///
/// Returns `Ok(None)` when the source is exhausted, otherwise the frame
/// timestamp and whether the hand's data version moved.
pub fn pump(
    source: &mut dyn HandDataSource,
    hand: &TrackedHand,
) -> HandResult<Option<(f64, bool)>> {
    let Some(frame) = source.next_frame() else {
        return Ok(None);
    };
    let changed = hand.publish(frame.snapshot)?;
    Ok(Some((frame.timestamp, changed)))
}
