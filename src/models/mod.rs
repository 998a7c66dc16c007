// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod exercise;
pub mod progress;
pub mod standards;
pub mod workout;

pub use exercise::{Category, Exercise};
pub use progress::{CategoryProgress, DataPoint, ExerciseProgress, ProgressReport, ProgressStats};
pub use standards::{BodyWeightBucket, Level, StrengthStandard, Thresholds};
pub use workout::{SessionDetail, SetDetail, SetDraft, SetPatch, WorkoutSession, WorkoutSet};
