// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Joins stored sessions, sets and reference data into [`SessionDetail`]s.

use crate::models::{Category, Exercise, SessionDetail, SetDetail, WorkoutSession, WorkoutSet};
use std::collections::HashMap;

/// Attach each set to its session, exercise and category.
///
/// Sets pointing at an unknown session, exercise or category are skipped
/// with a warning. Sets keep their creation order within a session; the
/// session order of the input is preserved.
pub fn assemble_sessions(
    sessions: Vec<WorkoutSession>,
    sets: Vec<WorkoutSet>,
    exercises: &[Exercise],
    categories: &[Category],
) -> Vec<SessionDetail> {
    let exercises: HashMap<&str, &Exercise> =
        exercises.iter().map(|e| (e.id.as_str(), e)).collect();
    let categories: HashMap<&str, &Category> =
        categories.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut by_session: HashMap<String, Vec<SetDetail>> = HashMap::new();
    for set in sets {
        let Some(exercise) = exercises.get(set.exercise_id.as_str()) else {
            tracing::warn!(set_id = %set.id, exercise_id = %set.exercise_id, "Set references unknown exercise");
            continue;
        };
        let Some(category) = categories.get(exercise.category_id.as_str()) else {
            tracing::warn!(
                set_id = %set.id,
                category_id = %exercise.category_id,
                "Exercise references unknown category"
            );
            continue;
        };

        by_session
            .entry(set.session_id.clone())
            .or_default()
            .push(SetDetail {
                exercise: (*exercise).clone(),
                category: (*category).clone(),
                set,
            });
    }

    let details: Vec<SessionDetail> = sessions
        .into_iter()
        .map(|session| {
            let mut sets = by_session.remove(&session.id).unwrap_or_default();
            sets.sort_by(|a, b| {
                a.set
                    .created_at
                    .cmp(&b.set.created_at)
                    .then_with(|| a.set.id.cmp(&b.set.id))
            });
            SessionDetail { session, sets }
        })
        .collect();

    for (session_id, orphans) in &by_session {
        tracing::warn!(session_id = %session_id, count = orphans.len(), "Sets reference unknown session");
    }

    details
}
