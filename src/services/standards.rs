// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strength standards loading and level classification.

use crate::models::{BodyWeightBucket, Level, StrengthStandard};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Where a lifted weight sits between two levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LevelProgress {
    pub current_level: Level,
    /// `None` once elite is reached
    pub next_level: Option<Level>,
    /// Percentage of the gap to the next level, in `[0, 100]`
    pub progress: f64,
}

/// Read-only table of strength standards, loaded once at startup.
#[derive(Debug, Default, Clone)]
pub struct StandardsService {
    standards: Vec<StrengthStandard>,
}

impl StandardsService {
    /// Load standards from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, StandardsError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| StandardsError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load standards from a JSON string (an array of standards).
    pub fn load_from_json(json_data: &str) -> Result<Self, StandardsError> {
        let standards: Vec<StrengthStandard> = serde_json::from_str(json_data)
            .map_err(|e| StandardsError::ParseError(e.to_string()))?;

        for standard in &standards {
            if standard.buckets.is_empty() {
                return Err(StandardsError::EmptyStandard(standard.exercise_id.clone()));
            }
            if let Some(bucket) = standard
                .buckets
                .iter()
                .find(|b| !b.thresholds.is_monotonic())
            {
                return Err(StandardsError::NonMonotonic {
                    exercise_id: standard.exercise_id.clone(),
                    poids: bucket.poids,
                });
            }
        }

        tracing::info!(count = standards.len(), "Loaded strength standards");
        Ok(Self { standards })
    }

    /// All loaded standards, in dataset order.
    pub fn standards(&self) -> &[StrengthStandard] {
        &self.standards
    }

    pub fn standard(&self, exercise_id: &str) -> Option<&StrengthStandard> {
        self.standards.iter().find(|s| s.exercise_id == exercise_id)
    }

    /// Bucket whose body weight is closest to `body_weight`.
    ///
    /// Equidistant buckets resolve to the first one in stored order.
    pub fn lookup_standard(&self, exercise_id: &str, body_weight: f64) -> Option<&BodyWeightBucket> {
        let standard = self.standard(exercise_id)?;

        let mut best: Option<&BodyWeightBucket> = None;
        for bucket in &standard.buckets {
            let closer = match best {
                Some(current) => (bucket.poids - body_weight).abs() < (current.poids - body_weight).abs(),
                None => true,
            };
            if closer {
                best = Some(bucket);
            }
        }
        best
    }

    /// Highest level whose threshold is at or below `lifted`.
    ///
    /// Debutant has no lower bound: anything under novice is debutant.
    pub fn classify_level(&self, exercise_id: &str, body_weight: f64, lifted: f64) -> Option<Level> {
        let thresholds = self.lookup_standard(exercise_id, body_weight)?.thresholds;

        let level = [Level::Elite, Level::Avance, Level::Intermediaire, Level::Novice]
            .into_iter()
            .find(|&level| lifted >= thresholds.get(level))
            .unwrap_or(Level::Debutant);
        Some(level)
    }

    /// Current level, next level and progress through the gap between them.
    pub fn progress_to_next_level(
        &self,
        exercise_id: &str,
        body_weight: f64,
        lifted: f64,
    ) -> Option<LevelProgress> {
        let thresholds = self.lookup_standard(exercise_id, body_weight)?.thresholds;
        let current_level = self.classify_level(exercise_id, body_weight, lifted)?;

        let Some(next_level) = current_level.next() else {
            return Some(LevelProgress {
                current_level,
                next_level: None,
                progress: 100.0,
            });
        };

        let current = thresholds.get(current_level);
        let next = thresholds.get(next_level);
        let gap = next - current;
        let progress = if gap > 0.0 {
            ((lifted - current) / gap * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };

        Some(LevelProgress {
            current_level,
            next_level: Some(next_level),
            progress,
        })
    }
}

/// Errors from loading the standards dataset.
#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse standards JSON: {0}")]
    ParseError(String),

    #[error("Standard for {0} has no body-weight buckets")]
    EmptyStandard(String),

    #[error("Thresholds for {exercise_id} at {poids} kg are not increasing")]
    NonMonotonic { exercise_id: String, poids: f64 },
}
