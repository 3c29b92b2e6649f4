//! Headless k-means run
//!
//! Loads the cluster preset, seeds centroids and lets the automatic run go
//! to convergence at 60 frames per second against a recording canvas. The
//! final lab snapshot is printed as JSON.
//!
//! Usage: `playground-headless [seed]`
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{info, warn};
use playground_core::lab::KMeansLab;
use playground_core::{ContainerSize, Lab, LabConfig};
use playground_visualization::{KMeansView, RecordingCanvas, RenderLoop};

const FRAME_MS: f64 = 1000.0 / 60.0;
/// Two simulated minutes
const MAX_FRAMES: u64 = 7200;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(seed) => LabConfig::seeded(seed.parse()?),
        None => LabConfig::default(),
    };
    let mut lab = KMeansLab::new(config, ContainerSize::new(800.0, 600.0))?;
    lab.trigger("load-preset:clusters")?;
    lab.trigger("init-centroids")?;
    lab.trigger("toggle-auto")?;

    let view = KMeansView::default();
    let mut render = RenderLoop::new(RecordingCanvas::new());
    while render.frames() < MAX_FRAMES {
        lab.tick(FRAME_MS);
        render.canvas_mut().reset();
        render.frame(FRAME_MS, &lab, &view)?;
        if lab.snapshot().phase == "converged" {
            break;
        }
    }

    let snapshot = lab.snapshot();
    if snapshot.phase == "converged" {
        info!(
            "converged after {} frames ({:.1} s), last frame drew {} commands",
            render.frames(),
            render.elapsed_ms() / 1000.0,
            render.canvas().commands().len()
        );
    } else {
        warn!("stopped after {} frames in phase {}", render.frames(), snapshot.phase);
    }
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
