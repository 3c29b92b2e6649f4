//! Per-frame render loop
//!
//! Each frame advances the render clock, rescales the surface when the
//! lab's backing store changed, clears, and hands every layer in z-order to
//! the lab's view. The lab is borrowed immutably for the whole frame.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, trace};
use playground_core::execution::AnimationClock;
use playground_core::geometry::BackingStore;
use playground_core::Lab;
use serde::{Deserialize, Serialize};

use crate::engine::canvas::Canvas;
use crate::view::{LabView, Palette};
use crate::RenderError;

/// Drawing layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layer {
    /// Region tints such as Voronoi cells or probability heatmaps
    Background,
    Grid,
    Axes,
    /// Boundaries, margins, radii, ghost trails and connective lines
    Overlays,
    Points,
    /// Centroids, query marker and support vectors
    Markers,
    /// Hover and selection labels
    Labels,
}

impl Layer {
    pub const ORDER: [Layer; 7] = [
        Layer::Background,
        Layer::Grid,
        Layer::Axes,
        Layer::Overlays,
        Layer::Points,
        Layer::Markers,
        Layer::Labels,
    ];
}

/// Read-only inputs shared by every layer of one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub palette: &'a Palette,
    /// Render-clock time driving glow and dash animation
    pub elapsed_ms: f64,
    pub frame: u64,
}

impl FrameContext<'_> {
    /// Pulse in `[0, 1]` with the given period
    pub fn pulse(&self, period_ms: f64) -> f32 {
        if period_ms <= 0.0 {
            return 0.0;
        }
        let phase = (self.elapsed_ms / period_ms) * std::f64::consts::TAU;
        (0.5 + 0.5 * phase.sin()) as f32
    }

    /// Marching-ants dash offset in pixels
    pub fn dash_offset(&self, speed_px_per_s: f64) -> f32 {
        (self.elapsed_ms / 1000.0 * speed_px_per_s) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub frame: u64,
    pub rescaled: bool,
}

/// Owns the canvas and the render clock
#[derive(Debug)]
pub struct RenderLoop<C: Canvas> {
    canvas: C,
    clock: AnimationClock,
    palette: Palette,
    backing: Option<BackingStore>,
    frames: u64,
}

impl<C: Canvas> RenderLoop<C> {
    pub fn new(canvas: C) -> Self {
        Self::with_palette(canvas, Palette::default())
    }

    pub fn with_palette(canvas: C, palette: Palette) -> Self {
        Self {
            canvas,
            clock: AnimationClock::new(),
            palette,
            backing: None,
            frames: 0,
        }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Draws one frame of `lab` through `view`
    pub fn frame<V: LabView>(&mut self, dt_ms: f64, lab: &V::Lab, view: &V) -> Result<FrameStats, RenderError> {
        let elapsed_ms = self.clock.advance(dt_ms);
        let viewport = lab.transform().viewport();
        let backing = viewport.backing_store();

        let rescaled = self.backing != Some(backing);
        if rescaled {
            self.canvas.resize(backing, viewport.device_pixel_ratio as f32)?;
            self.backing = Some(backing);
            debug!("{}: surface now {}x{}", view.name(), backing.width, backing.height);
        }

        self.frames += 1;
        let frame = FrameContext {
            palette: &self.palette,
            elapsed_ms,
            frame: self.frames,
        };
        self.canvas.clear(self.palette.background);
        for layer in Layer::ORDER {
            self.canvas.begin_layer(layer);
            view.draw(layer, lab, &frame, &mut self.canvas);
        }
        trace!("{}: frame {} at {elapsed_ms:.0} ms", view.name(), self.frames);
        Ok(FrameStats {
            frame: self.frames,
            rescaled,
        })
    }
}
