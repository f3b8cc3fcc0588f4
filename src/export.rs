// src/export.rs
use crate::recording::{HandRecording, RecordedFrame};
use crate::types::{HandFinger, Handedness, FINGER_COUNT};
use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct HandRecord {
    version: u64,
    timestamp: f64,
    handedness: Handedness,
    connected: bool,
    high_confidence: bool,

    root_x: Option<f32>,
    root_y: Option<f32>,
    root_z: Option<f32>,
    root_qx: Option<f32>,
    root_qy: Option<f32>,
    root_qz: Option<f32>,
    root_qw: Option<f32>,

    pointer_valid: bool,

    thumb_strength: f32,
    index_strength: f32,
    middle_strength: f32,
    ring_strength: f32,
    pinky_strength: f32,

    thumb_pinching: bool,
    index_pinching: bool,
    middle_pinching: bool,
    ring_pinching: bool,
    pinky_pinching: bool,
}

impl HandRecord {
    fn new(handedness: Handedness, frame: &RecordedFrame) -> Self {
        let snapshot = &frame.snapshot;
        let root = snapshot.root;
        let strength = |f: HandFinger| snapshot.finger(f).pinch_strength;
        let pinching = |f: HandFinger| snapshot.finger(f).is_pinching;

        Self {
            version: frame.version,
            timestamp: frame.timestamp,
            handedness,
            connected: snapshot.is_connected,
            high_confidence: snapshot.is_high_confidence,
            root_x: root.map(|p| p.position.x),
            root_y: root.map(|p| p.position.y),
            root_z: root.map(|p| p.position.z),
            root_qx: root.map(|p| p.rotation.i),
            root_qy: root.map(|p| p.rotation.j),
            root_qz: root.map(|p| p.rotation.k),
            root_qw: root.map(|p| p.rotation.w),
            pointer_valid: snapshot.pointer.is_some(),
            thumb_strength: strength(HandFinger::Thumb),
            index_strength: strength(HandFinger::Index),
            middle_strength: strength(HandFinger::Middle),
            ring_strength: strength(HandFinger::Ring),
            pinky_strength: strength(HandFinger::Pinky),
            thumb_pinching: pinching(HandFinger::Thumb),
            index_pinching: pinching(HandFinger::Index),
            middle_pinching: pinching(HandFinger::Middle),
            ring_pinching: pinching(HandFinger::Ring),
            pinky_pinching: pinching(HandFinger::Pinky),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub total_frames: usize,
    pub tracked_frames: usize,
    pub high_confidence_frames: usize,
    /// Frames in which each finger was pinching, indexed by [`HandFinger::index`].
    pub pinch_frames: [usize; FINGER_COUNT],
}

impl SessionSummary {
    pub fn tracking_rate(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.tracked_frames as f64 / self.total_frames as f64
    }
}

/// Writes recorded sessions into `<output_dir>/<session_name>/`.
pub struct HandDataExporter {
    output_dir: PathBuf,
    session_name: String,
}

impl HandDataExporter {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
        }
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn export_csv(&self, recording: &HandRecording) -> Result<PathBuf> {
        let csv_path = self
            .session_dir()
            .join(format!("{}_hand.csv", recording.handedness));

        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create directory {}", parent.display())
            })?;
        }

        let file = File::create(&csv_path)
            .with_context(|| format!("Failed to create {}", csv_path.display()))?;
        let mut writer = Writer::from_writer(file);
        for frame in &recording.frames {
            writer.serialize(HandRecord::new(recording.handedness, frame))?;
        }
        writer.flush()?;

        tracing::info!(
            "Exported {} {} hand frames to {}",
            recording.frames.len(),
            recording.handedness,
            csv_path.display()
        );
        Ok(csv_path)
    }

    pub fn export_recording(&self, recording: &HandRecording) -> Result<PathBuf> {
        let path = self
            .session_dir()
            .join(format!("{}_hand.json", recording.handedness));
        recording.save(&path)?;
        Ok(path)
    }

    pub fn summarize(recording: &HandRecording) -> SessionSummary {
        let mut summary = SessionSummary {
            total_frames: recording.frames.len(),
            tracked_frames: 0,
            high_confidence_frames: 0,
            pinch_frames: [0; FINGER_COUNT],
        };

        for frame in &recording.frames {
            let snapshot = &frame.snapshot;
            if snapshot.is_connected && snapshot.is_data_valid {
                summary.tracked_frames += 1;
            }
            if snapshot.is_high_confidence {
                summary.high_confidence_frames += 1;
            }
            for finger in HandFinger::ALL {
                if snapshot.finger(finger).is_pinching {
                    summary.pinch_frames[finger.index()] += 1;
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Pose;
    use crate::skeleton::bind_pose_local;
    use crate::snapshot::HandDataSnapshot;
    use uuid::Uuid;

    fn recording() -> HandRecording {
        let mut pinching = HandDataSnapshot::tracked(Pose::identity(), bind_pose_local(Handedness::Left));
        pinching.finger_mut(HandFinger::Index).is_pinching = true;
        pinching.finger_mut(HandFinger::Index).pinch_strength = 0.95;

        HandRecording {
            session_id: Uuid::new_v4(),
            handedness: Handedness::Left,
            recorded_at: Local::now().to_rfc3339(),
            frames: vec![
                RecordedFrame {
                    version: 1,
                    timestamp: 0.0,
                    snapshot: HandDataSnapshot::disconnected(),
                },
                RecordedFrame {
                    version: 2,
                    timestamp: 0.033,
                    snapshot: pinching,
                },
            ],
        }
    }

    #[test]
    fn test_csv_has_one_row_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = HandDataExporter::new(dir.path(), Some("unit".to_string()));
        let path = exporter.export_csv(&recording()).unwrap();
        assert!(path.ends_with("unit/left_hand.csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert!(headers.iter().any(|h| h == "index_strength"));
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);

        let root_x = headers.iter().position(|h| h == "root_x").unwrap();
        assert_eq!(&rows[0][root_x], "");
        assert_eq!(&rows[1][root_x], "0.0");
    }

    #[test]
    fn test_summary_counts() {
        let summary = HandDataExporter::summarize(&recording());
        assert_eq!(summary.total_frames, 2);
        assert_eq!(summary.tracked_frames, 1);
        assert_eq!(summary.high_confidence_frames, 1);
        assert_eq!(summary.pinch_frames[HandFinger::Index.index()], 1);
        assert_eq!(summary.pinch_frames[HandFinger::Thumb.index()], 0);
        assert!((summary.tracking_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_default_session_name_is_timestamped() {
        let exporter = HandDataExporter::new("/tmp", None);
        let name = exporter.session_dir();
        let name = name.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("session_"));
    }

    #[test]
    fn test_unwritable_output_dir_names_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let exporter = HandDataExporter::new(&blocker, Some("unit".to_string()));
        let err = exporter.export_csv(&recording()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Failed to create directory"), "{}", message);
        assert!(message.contains("blocker"), "{}", message);
    }
}
