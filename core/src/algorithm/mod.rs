//! Learning engines behind the labs
//! Continuous models recompute from scratch; stepped algorithms advance by phase.
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod association;
pub mod decision_tree;
pub mod kmeans;
pub mod knn;
pub mod logistic;
pub mod regression;
pub mod svm;
pub mod traits;

pub use self::traits::*;
