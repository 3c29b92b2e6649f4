//! Learner progress reported by the host page
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod achievements;

pub use achievements::{
    badge_for, AchievementEvent, AchievementTracker, Badge, LabProgress, MemoryStore, ProgressStore, ProgressTracker,
    UserProgress, GRANDMASTER_BADGE, PROGRESS_KEY,
};
