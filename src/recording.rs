// src/recording.rs - Capture and replay of published hand frames
use crate::backend::TrackedHand;
use crate::hand::{DataVersionWatcher, Hand};
use crate::snapshot::HandDataSnapshot;
use crate::source::{HandDataSource, TimedSnapshot};
use crate::types::Handedness;
use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub version: u64,
    pub timestamp: f64,
    pub snapshot: HandDataSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandRecording {
    pub session_id: Uuid,
    pub handedness: Handedness,
    pub recorded_at: String,
    pub frames: Vec<RecordedFrame>,
}

impl HandRecording {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create recording {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write recording {}", path.display()))?;
        tracing::info!("Saved {} frames to {}", self.frames.len(), path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open recording {}", path.display()))?;
        let recording: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid recording {}", path.display()))?;
        for (i, frame) in recording.frames.iter().enumerate() {
            frame
                .snapshot
                .validate()
                .with_context(|| format!("Frame {} of {} is invalid", i, path.display()))?;
        }
        Ok(recording)
    }
}

/// Collects every distinct frame a hand publishes.
pub struct HandRecorder {
    session_id: Uuid,
    handedness: Handedness,
    max_frames: usize,
    watcher: DataVersionWatcher,
    frames: VecDeque<RecordedFrame>,
}

impl HandRecorder {
    /// `max_frames == 0` keeps everything; otherwise the oldest frames drop.
    pub fn new(hand: &TrackedHand, max_frames: usize) -> Self {
        Self {
            session_id: hand.session_id(),
            handedness: hand.handedness(),
            max_frames,
            watcher: DataVersionWatcher::new(),
            frames: VecDeque::new(),
        }
    }

    /// Captures the hand's current frame unless it was already captured.
    pub fn record(&mut self, hand: &TrackedHand, timestamp: f64) -> bool {
        if !self.watcher.has_changed(hand) {
            return false;
        }

        self.frames.push_back(RecordedFrame {
            version: hand.current_data_version(),
            timestamp,
            snapshot: hand.snapshot(),
        });
        if self.max_frames > 0 && self.frames.len() > self.max_frames {
            self.frames.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> impl Iterator<Item = &RecordedFrame> + '_ {
        self.frames.iter()
    }

    pub fn into_recording(self) -> HandRecording {
        HandRecording {
            session_id: self.session_id,
            handedness: self.handedness,
            recorded_at: Local::now().to_rfc3339(),
            frames: self.frames.into(),
        }
    }
}

/// Plays a recording back frame by frame.
pub struct ReplayHandSource {
    frames: Vec<RecordedFrame>,
    cursor: usize,
    looping: bool,
    loop_offset: f64,
}

impl ReplayHandSource {
    pub fn new(recording: HandRecording) -> Self {
        Self {
            frames: recording.frames,
            cursor: 0,
            looping: false,
            loop_offset: 0.0,
        }
    }

    /// Restart from the first frame after the last one, keeping timestamps
    /// increasing.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len() - self.cursor
    }
}

impl HandDataSource for ReplayHandSource {
    fn next_frame(&mut self) -> Option<TimedSnapshot> {
        if self.cursor >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                tracing::debug!("Replay finished after {} frames", self.frames.len());
                return None;
            }
            let first = self.frames[0].timestamp;
            let last = self.frames[self.frames.len() - 1].timestamp;
            let step = if self.frames.len() > 1 {
                (last - first) / (self.frames.len() - 1) as f64
            } else {
                0.0
            };
            self.loop_offset += last - first + step;
            self.cursor = 0;
        }

        let frame = &self.frames[self.cursor];
        self.cursor += 1;
        Some(TimedSnapshot {
            timestamp: frame.timestamp + self.loop_offset,
            snapshot: frame.snapshot.clone(),
        })
    }
}
