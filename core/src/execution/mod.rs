//! Execution support: bounded histories, tweens and automatic-run scheduling
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod animation;
pub mod history;
pub mod scheduler;

pub use animation::{AnimationClock, EasingFunction, Interpolate, Tween};
pub use history::HistoryBuffer;
pub use scheduler::{AutoRunner, RunTicket};
