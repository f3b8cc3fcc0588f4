// src/main.rs
use anyhow::Result;
use clap::Parser;
use hand_state::export::HandDataExporter;
use hand_state::recording::HandRecorder;
use hand_state::simulation::SimulatedHandSource;
use hand_state::source::pump;
use hand_state::{Hand, HandTrackingConfig, Handedness, Pose, TrackedHand, TrackingSpace};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser, Debug)]
#[command(name = "hand_state")]
#[command(about = "Runs simulated left and right hands and exports the session")]
#[command(version)]
struct Cli {
    /// JSON tracking config; defaults apply when omitted
    config: Option<PathBuf>,

    /// Number of frames to simulate per hand
    #[arg(long, default_value_t = 600)]
    frames: usize,
}

struct SimulatedSide {
    hand: Rc<TrackedHand>,
    source: SimulatedHandSource,
    recorder: HandRecorder,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => HandTrackingConfig::from_file(path)?,
        None => HandTrackingConfig::default(),
    };

    let space = TrackingSpace::new(Pose::identity());
    let mut sides: Vec<SimulatedSide> = [Handedness::Left, Handedness::Right]
        .into_iter()
        .map(|handedness| {
            let hand = Rc::new(TrackedHand::new(handedness, space.clone(), &config));
            let recorder = HandRecorder::new(&hand, config.max_recorded_frames);
            SimulatedSide {
                source: SimulatedHandSource::new(handedness, &config),
                hand,
                recorder,
            }
        })
        .collect();

    for side in &sides {
        watch_pinches(&side.hand);
    }

    for frame in 0..cli.frames {
        for side in sides.iter_mut() {
            if let Some((timestamp, _)) = pump(&mut side.source, &side.hand)? {
                side.recorder.record(&side.hand, timestamp);
            }
        }

        if frame % 120 == 0 {
            for side in &sides {
                match side.hand.root_pose() {
                    Some(root) => tracing::info!(
                        "{} hand v{} root at ({:.3}, {:.3}, {:.3})",
                        side.hand.handedness(),
                        side.hand.current_data_version(),
                        root.position.x,
                        root.position.y,
                        root.position.z
                    ),
                    None => tracing::info!(
                        "{} hand v{} not tracked",
                        side.hand.handedness(),
                        side.hand.current_data_version()
                    ),
                }
            }
        }
    }

    let exporter = HandDataExporter::new(&config.output_directory, None);
    for side in sides {
        let recording = side.recorder.into_recording();
        let summary = HandDataExporter::summarize(&recording);
        tracing::info!(
            "{} hand: {} frames, {:.1}% tracked, {} index pinch frames",
            recording.handedness,
            summary.total_frames,
            summary.tracking_rate() * 100.0,
            summary.pinch_frames[hand_state::HandFinger::Index.index()]
        );
        exporter.export_csv(&recording)?;
        exporter.export_recording(&recording)?;
    }

    tracing::info!("Session written to {}", exporter.session_dir().display());
    Ok(())
}

/// Logs each time the index finger starts pinching.
fn watch_pinches(hand: &Rc<TrackedHand>) {
    let weak = Rc::downgrade(hand);
    let was_pinching = Cell::new(false);
    hand.when_hand_updated().subscribe(move || {
        let Some(hand) = weak.upgrade() else {
            return;
        };
        let pinching = hand.index_finger_is_pinching();
        if pinching && !was_pinching.get() {
            tracing::info!(
                "{} index pinch started (strength {:.2}, v{})",
                hand.handedness(),
                hand.finger_pinch_strength(hand_state::HandFinger::Index),
                hand.current_data_version()
            );
        }
        was_pinching.set(pinching);
    });
}
