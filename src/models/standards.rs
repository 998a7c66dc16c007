// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strength standard reference data.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Skill level, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debutant,
    Novice,
    Intermediaire,
    Avance,
    Elite,
}

impl Level {
    /// All levels in ascending order.
    pub const ALL: [Level; 5] = [
        Level::Debutant,
        Level::Novice,
        Level::Intermediaire,
        Level::Avance,
        Level::Elite,
    ];

    /// The level above this one, or `None` at elite.
    pub fn next(self) -> Option<Level> {
        match self {
            Level::Debutant => Some(Level::Novice),
            Level::Novice => Some(Level::Intermediaire),
            Level::Intermediaire => Some(Level::Avance),
            Level::Avance => Some(Level::Elite),
            Level::Elite => None,
        }
    }
}

/// Threshold weights (kg) for each level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Thresholds {
    pub debutant: f64,
    pub novice: f64,
    pub intermediaire: f64,
    pub avance: f64,
    pub elite: f64,
}

impl Thresholds {
    pub fn get(&self, level: Level) -> f64 {
        match level {
            Level::Debutant => self.debutant,
            Level::Novice => self.novice,
            Level::Intermediaire => self.intermediaire,
            Level::Avance => self.avance,
            Level::Elite => self.elite,
        }
    }

    /// True if thresholds never decrease from debutant to elite.
    pub fn is_monotonic(&self) -> bool {
        Level::ALL
            .windows(2)
            .all(|pair| self.get(pair[0]) <= self.get(pair[1]))
    }
}

/// Thresholds for one body-weight bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BodyWeightBucket {
    /// Body weight (kg) this bucket was computed for
    pub poids: f64,
    #[serde(flatten)]
    pub thresholds: Thresholds,
}

/// Standard for one exercise across body weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthStandard {
    pub exercise_id: String,
    pub exercise_name: String,
    pub category: String,
    /// Buckets in stored order (order decides nearest-bucket ties)
    pub buckets: Vec<BodyWeightBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering_and_next() {
        assert!(Level::Debutant < Level::Novice);
        assert!(Level::Avance < Level::Elite);
        assert_eq!(Level::Intermediaire.next(), Some(Level::Avance));
        assert_eq!(Level::Elite.next(), None);
    }

    #[test]
    fn test_level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Level::Intermediaire).unwrap(),
            "intermediaire"
        );
    }

    #[test]
    fn test_is_monotonic() {
        let ok = Thresholds {
            debutant: 20.0,
            novice: 40.0,
            intermediaire: 60.0,
            avance: 60.0,
            elite: 100.0,
        };
        assert!(ok.is_monotonic());

        let bad = Thresholds { avance: 50.0, ..ok };
        assert!(!bad.is_monotonic());
    }

    #[test]
    fn test_bucket_flattens_thresholds() {
        let bucket: BodyWeightBucket = serde_json::from_str(
            r#"{"poids":80,"debutant":40,"novice":60,"intermediaire":80,"avance":110,"elite":140}"#,
        )
        .unwrap();
        assert_eq!(bucket.poids, 80.0);
        assert_eq!(bucket.thresholds.avance, 110.0);
    }
}
