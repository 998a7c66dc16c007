// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout session and set models for storage.

use crate::models::{Category, Exercise};
use crate::time_utils::rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A day's training session stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    /// Document ID
    pub id: String,
    /// Owner (auth provider user ID)
    pub user_id: String,
    /// Session title
    pub title: String,
    /// When the session was started
    #[serde(with = "rfc3339")]
    pub start_date: DateTime<Utc>,
    /// When the session was closed (`None` while in progress)
    #[serde(default, with = "rfc3339::option")]
    pub end_date: Option<DateTime<Utc>>,
}

impl WorkoutSession {
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }
}

/// A persisted set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    /// Document ID
    pub id: String,
    /// Owning session ID
    pub session_id: String,
    /// Owner, duplicated from the session for per-user queries
    pub user_id: String,
    /// Exercise ID
    pub exercise_id: String,
    /// Weight in kg
    pub weight: f64,
    /// Repetition count
    pub repetition: u32,
    #[serde(with = "rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339")]
    pub updated_at: DateTime<Utc>,
}

/// A set that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDraft {
    pub session_id: String,
    pub user_id: String,
    pub exercise_id: String,
    pub weight: f64,
    pub repetition: u32,
}

impl SetDraft {
    /// Turn the draft into a storable set with a fresh document ID.
    pub fn into_set(self, now: DateTime<Utc>) -> WorkoutSet {
        WorkoutSet {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: self.session_id,
            user_id: self.user_id,
            exercise_id: self.exercise_id,
            weight: self.weight,
            repetition: self.repetition,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Mutable fields of a persisted set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition: Option<u32>,
    /// Move the set to another session. Only admin reassignment sets this;
    /// the wizard never does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl SetPatch {
    /// Apply the patch to a set, bumping `updated_at`.
    pub fn apply(&self, set: &mut WorkoutSet, now: DateTime<Utc>) {
        if let Some(weight) = self.weight {
            set.weight = weight;
        }
        if let Some(repetition) = self.repetition {
            set.repetition = repetition;
        }
        if let Some(session_id) = &self.session_id {
            set.session_id = session_id.clone();
        }
        set.updated_at = now;
    }
}

/// A set joined with its exercise and category.
#[derive(Debug, Clone, PartialEq)]
pub struct SetDetail {
    pub set: WorkoutSet,
    pub exercise: Exercise,
    pub category: Category,
}

/// A session with its sets in creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDetail {
    pub session: WorkoutSession,
    pub sets: Vec<SetDetail>,
}
