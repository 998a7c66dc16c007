//! Chart-ready progress series.
//!
//! Built by [`crate::services::progress::aggregate_progress`] from a user's
//! session history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::rfc3339;

/// One session's contribution to a category or exercise series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DataPoint {
    pub session_id: String,
    #[serde(with = "rfc3339")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_date: DateTime<Utc>,
    /// Date label, with time of day when the date holds several sessions
    pub label: String,
    /// Heaviest single set (kg)
    pub max_weight: f64,
    /// Σ weight × repetition
    pub volume: f64,
    pub sets_count: u32,
}

/// Summary statistics over a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressStats {
    pub current_max_weight: f64,
    pub previous_max_weight: Option<f64>,
    pub total_volume: f64,
    pub total_sets: u32,
    /// Signed percentage change between the last two points
    pub progression: Option<f64>,
    /// Charts need at least two points
    pub chartable: bool,
}

impl ProgressStats {
    /// Compute statistics from a chronologically sorted series.
    pub fn from_points(points: &[DataPoint]) -> Self {
        let current_max_weight = points.last().map(|p| p.max_weight).unwrap_or(0.0);
        let previous_max_weight = points
            .len()
            .checked_sub(2)
            .map(|idx| points[idx].max_weight);

        let progression = match previous_max_weight {
            Some(previous) if previous != 0.0 => {
                Some((current_max_weight - previous) / previous * 100.0)
            }
            _ => None,
        };

        Self {
            current_max_weight,
            previous_max_weight,
            total_volume: points.iter().map(|p| p.volume).sum(),
            total_sets: points.iter().map(|p| p.sets_count).sum(),
            progression,
            chartable: points.len() >= 2,
        }
    }
}

/// Progress for one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExerciseProgress {
    pub exercise_id: String,
    pub exercise_name: String,
    pub points: Vec<DataPoint>,
    pub stats: ProgressStats,
}

/// Progress for one category and its exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoryProgress {
    pub category_id: String,
    pub category_name: String,
    pub points: Vec<DataPoint>,
    pub stats: ProgressStats,
    /// Exercises seen in this category, sorted by name
    pub exercises: Vec<ExerciseProgress>,
}

/// Full progress report, categories sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressReport {
    pub categories: Vec<CategoryProgress>,
}

impl ProgressReport {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn category(&self, category_id: &str) -> Option<&CategoryProgress> {
        self.categories
            .iter()
            .find(|c| c.category_id == category_id)
    }

    pub fn exercise(&self, category_id: &str, exercise_id: &str) -> Option<&ExerciseProgress> {
        self.category(category_id)?
            .exercises
            .iter()
            .find(|e| e.exercise_id == exercise_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(max_weight: f64, volume: f64, sets_count: u32) -> DataPoint {
        DataPoint {
            session_id: "s".to_string(),
            start_date: Utc::now(),
            label: String::new(),
            max_weight,
            volume,
            sets_count,
        }
    }

    #[test]
    fn test_stats_empty_series() {
        let stats = ProgressStats::from_points(&[]);
        assert_eq!(stats.current_max_weight, 0.0);
        assert_eq!(stats.previous_max_weight, None);
        assert_eq!(stats.progression, None);
        assert_eq!(stats.total_sets, 0);
        assert!(!stats.chartable);
    }

    #[test]
    fn test_progression_positive() {
        let stats = ProgressStats::from_points(&[point(100.0, 500.0, 1), point(110.0, 550.0, 1)]);
        assert_eq!(stats.previous_max_weight, Some(100.0));
        assert!((stats.progression.unwrap() - 10.0).abs() < 1e-9);
        assert!(stats.chartable);
    }

    #[test]
    fn test_progression_negative() {
        let stats = ProgressStats::from_points(&[point(100.0, 500.0, 1), point(90.0, 450.0, 1)]);
        assert!((stats.progression.unwrap() + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_point_has_no_progression() {
        let stats = ProgressStats::from_points(&[point(80.0, 640.0, 2)]);
        assert_eq!(stats.current_max_weight, 80.0);
        assert_eq!(stats.previous_max_weight, None);
        assert_eq!(stats.progression, None);
        assert_eq!(stats.total_volume, 640.0);
        assert_eq!(stats.total_sets, 2);
        assert!(!stats.chartable);
    }

    #[test]
    fn test_zero_previous_has_no_progression() {
        let stats = ProgressStats::from_points(&[point(0.0, 0.0, 1), point(50.0, 250.0, 1)]);
        assert_eq!(stats.previous_max_weight, Some(0.0));
        assert_eq!(stats.progression, None);
    }
}
