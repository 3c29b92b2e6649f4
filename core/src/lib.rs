//! # ML Playground core
//!
//! Simulation state, pointer interaction and learning engines behind the
//! interactive machine-learning labs. The crate holds no rendering code:
//! hosts feed pointer events, commands and frame ticks into a [`Lab`] and
//! read back a serializable [`LabSnapshot`]; the visualization crate draws
//! from the same read-only state.
//!
//! ```no_run
//! use playground_core::{create_lab, ContainerSize, Lab, LabConfig, LabKind};
//!
//! let mut lab = create_lab(LabKind::KMeans, LabConfig::seeded(7), ContainerSize::new(800.0, 600.0))?;
//! lab.trigger("load-preset:clusters")?;
//! lab.trigger("toggle-auto")?;
//! for _ in 0..600 {
//!     lab.tick(16.0);
//! }
//! println!("{}", serde_json::to_string_pretty(&lab.snapshot())?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod config;
pub mod education;
pub mod error;
pub mod execution;
pub mod geometry;
pub mod interaction;
pub mod lab;
pub mod simulation;

pub use config::LabConfig;
pub use error::{ErrorKind, LabError, LabResult};
pub use geometry::{BackingStore, ContainerSize, CoordinateTransform, DataPoint, DomainBounds, PixelPoint};
pub use interaction::{CursorHint, PointerEvent, PointerStateMachine};
pub use lab::{create_lab, Lab, LabCommand, LabKind, LabSnapshot, LabStatistics, ViewMode};
pub use simulation::{ClassLabel, PointId, PointLabel, PointSet};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
