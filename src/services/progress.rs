// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Progress aggregation.
//!
//! Folds a user's session history into chart-ready series:
//! category → session → point, and category → exercise → session → point.
//! Pure and synchronous; ordering comes from explicit sorting, never from
//! the order sessions were fetched in.

use chrono::{FixedOffset, NaiveDate};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{
    CategoryProgress, DataPoint, ExerciseProgress, ProgressReport, ProgressStats, SessionDetail,
    WorkoutSession,
};
use crate::time_utils::{format_label, local_date};

/// Running totals for one (session, category|exercise) key.
#[derive(Debug, Clone)]
struct PointAccumulator {
    session: WorkoutSession,
    max_weight: f64,
    volume: f64,
    sets_count: u32,
}

impl PointAccumulator {
    fn new(session: &WorkoutSession) -> Self {
        Self {
            session: session.clone(),
            max_weight: f64::MIN,
            volume: 0.0,
            sets_count: 0,
        }
    }

    fn add(&mut self, weight: f64, repetition: u32) {
        self.max_weight = self.max_weight.max(weight);
        self.volume += weight * f64::from(repetition);
        self.sets_count += 1;
    }
}

/// Session points keyed by session ID.
type SessionPoints = HashMap<String, PointAccumulator>;

#[derive(Debug, Default)]
struct ExerciseAccumulator {
    name: String,
    sessions: SessionPoints,
}

#[derive(Debug, Default)]
struct CategoryAccumulator {
    name: String,
    sessions: SessionPoints,
    exercises: HashMap<String, ExerciseAccumulator>,
}

/// Two-level index: category ID → (sessions, exercise ID → sessions).
#[derive(Debug, Default)]
struct ProgressIndex {
    categories: HashMap<String, CategoryAccumulator>,
}

impl ProgressIndex {
    fn record(&mut self, detail: &SessionDetail) {
        for set_detail in &detail.sets {
            let set = &set_detail.set;

            let category = self
                .categories
                .entry(set_detail.category.id.clone())
                .or_default();
            category.name = set_detail.category.name.clone();
            category
                .sessions
                .entry(detail.session.id.clone())
                .or_insert_with(|| PointAccumulator::new(&detail.session))
                .add(set.weight, set.repetition);

            let exercise = category
                .exercises
                .entry(set_detail.exercise.id.clone())
                .or_default();
            exercise.name = set_detail.exercise.title.clone();
            exercise
                .sessions
                .entry(detail.session.id.clone())
                .or_insert_with(|| PointAccumulator::new(&detail.session))
                .add(set.weight, set.repetition);
        }
    }

    fn into_report(self, offset: FixedOffset) -> ProgressReport {
        let mut categories: Vec<CategoryProgress> = self
            .categories
            .into_iter()
            .map(|(category_id, acc)| {
                let mut exercises: Vec<ExerciseProgress> = acc
                    .exercises
                    .into_iter()
                    .map(|(exercise_id, ex)| {
                        let points = build_series(ex.sessions, offset);
                        ExerciseProgress {
                            exercise_id,
                            exercise_name: ex.name,
                            stats: ProgressStats::from_points(&points),
                            points,
                        }
                    })
                    .collect();
                exercises.sort_by(|a, b| {
                    by_name(&a.exercise_name, &b.exercise_name)
                        .then_with(|| a.exercise_id.cmp(&b.exercise_id))
                });

                let points = build_series(acc.sessions, offset);
                CategoryProgress {
                    category_id,
                    category_name: acc.name,
                    stats: ProgressStats::from_points(&points),
                    points,
                    exercises,
                }
            })
            .collect();

        categories.sort_by(|a, b| {
            by_name(&a.category_name, &b.category_name)
                .then_with(|| a.category_id.cmp(&b.category_id))
        });

        ProgressReport { categories }
    }
}

/// Case-insensitive name order.
fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sort one grouping's points chronologically and label them.
fn build_series(sessions: SessionPoints, offset: FixedOffset) -> Vec<DataPoint> {
    let mut accs: Vec<PointAccumulator> = sessions.into_values().collect();
    accs.sort_by(|a, b| {
        a.session
            .start_date
            .cmp(&b.session.start_date)
            .then_with(|| a.session.id.cmp(&b.session.id))
    });

    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for acc in &accs {
        *per_day
            .entry(local_date(acc.session.start_date, offset))
            .or_insert(0) += 1;
    }

    accs.into_iter()
        .map(|acc| {
            let shared_day = per_day
                .get(&local_date(acc.session.start_date, offset))
                .is_some_and(|&count| count > 1);
            DataPoint {
                label: format_label(acc.session.start_date, offset, shared_day),
                session_id: acc.session.id,
                start_date: acc.session.start_date,
                max_weight: acc.max_weight,
                volume: acc.volume,
                sets_count: acc.sets_count,
            }
        })
        .collect()
}

/// Aggregate sessions into per-category and per-exercise progress series.
///
/// `offset` decides calendar dates for same-day label disambiguation.
pub fn aggregate_progress(sessions: &[SessionDetail], offset: FixedOffset) -> ProgressReport {
    let mut index = ProgressIndex::default();
    for detail in sessions {
        index.record(detail);
    }
    index.into_report(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Exercise, SetDetail, WorkoutSet};
    use crate::time_utils::display_offset;
    use chrono::{DateTime, Utc};

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn set(
        session: &WorkoutSession,
        exercise: &Exercise,
        category: &Category,
        weight: f64,
        reps: u32,
    ) -> SetDetail {
        SetDetail {
            set: WorkoutSet {
                id: format!("{}-{}-{}", session.id, exercise.id, weight),
                session_id: session.id.clone(),
                user_id: "u1".to_string(),
                exercise_id: exercise.id.clone(),
                weight,
                repetition: reps,
                created_at: session.start_date,
                updated_at: session.start_date,
            },
            exercise: exercise.clone(),
            category: category.clone(),
        }
    }

    fn session(id: &str, start: &str) -> WorkoutSession {
        WorkoutSession {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: format!("Session {}", id),
            start_date: at(start),
            end_date: None,
        }
    }

    fn exercise(id: &str, title: &str, category: &Category) -> Exercise {
        Exercise {
            id: id.to_string(),
            title: title.to_string(),
            category_id: category.id.clone(),
            active: true,
        }
    }

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_empty_history_yields_empty_report() {
        let report = aggregate_progress(&[], display_offset(0));
        assert!(report.is_empty());
    }

    #[test]
    fn test_point_combines_sets_of_same_session() {
        let chest = category("c1", "Pectoraux");
        let bench = exercise("e1", "Développé couché", &chest);
        let s = session("s1", "2024-01-10T10:00:00Z");
        let detail = SessionDetail {
            sets: vec![
                set(&s, &bench, &chest, 50.0, 10),
                set(&s, &bench, &chest, 60.0, 5),
            ],
            session: s,
        };

        let report = aggregate_progress(&[detail], display_offset(0));
        let point = &report.category("c1").unwrap().points[0];

        assert_eq!(point.max_weight, 60.0);
        assert_eq!(point.volume, 800.0);
        assert_eq!(point.sets_count, 2);
        assert_eq!(point.label, "10/01/2024");
    }

    #[test]
    fn test_exercises_split_within_category() {
        let chest = category("c1", "Pectoraux");
        let bench = exercise("e1", "Développé couché", &chest);
        let dips = exercise("e2", "Pompes lestées", &chest);
        let s = session("s1", "2024-01-10T10:00:00Z");
        let detail = SessionDetail {
            sets: vec![
                set(&s, &dips, &chest, 10.0, 12),
                set(&s, &bench, &chest, 70.0, 5),
            ],
            session: s,
        };

        let report = aggregate_progress(&[detail], display_offset(0));
        let cat = report.category("c1").unwrap();

        assert_eq!(cat.points.len(), 1);
        assert_eq!(cat.points[0].max_weight, 70.0);
        let names: Vec<&str> = cat.exercises.iter().map(|e| e.exercise_name.as_str()).collect();
        assert_eq!(names, vec!["Développé couché", "Pompes lestées"]);
        assert_eq!(report.exercise("c1", "e2").unwrap().points[0].volume, 120.0);
    }

    #[test]
    fn test_categories_sorted_by_name() {
        let legs = category("c2", "Jambes");
        let chest = category("c1", "Pectoraux");
        let squat = exercise("e3", "Squat", &legs);
        let bench = exercise("e1", "Développé couché", &chest);
        let s = session("s1", "2024-01-10T10:00:00Z");
        let detail = SessionDetail {
            sets: vec![
                set(&s, &bench, &chest, 60.0, 5),
                set(&s, &squat, &legs, 100.0, 5),
            ],
            session: s,
        };

        let report = aggregate_progress(&[detail], display_offset(0));
        let names: Vec<&str> = report
            .categories
            .iter()
            .map(|c| c.category_name.as_str())
            .collect();
        assert_eq!(names, vec!["Jambes", "Pectoraux"]);
    }

    #[test]
    fn test_same_day_is_decided_in_display_offset() {
        let chest = category("c1", "Pectoraux");
        let bench = exercise("e1", "Développé couché", &chest);
        // Same UTC date, different dates at UTC+2
        let a = session("a", "2024-01-10T21:00:00Z");
        let b = session("b", "2024-01-10T23:00:00Z");
        let details = vec![
            SessionDetail {
                sets: vec![set(&a, &bench, &chest, 50.0, 5)],
                session: a,
            },
            SessionDetail {
                sets: vec![set(&b, &bench, &chest, 55.0, 5)],
                session: b,
            },
        ];

        let utc = aggregate_progress(&details, display_offset(0));
        let labels: Vec<&str> = utc.categories[0].points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["10/01/2024 21:00", "10/01/2024 23:00"]);

        let shifted = aggregate_progress(&details, display_offset(120));
        let labels: Vec<&str> = shifted.categories[0].points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["10/01/2024", "11/01/2024"]);
    }
}
