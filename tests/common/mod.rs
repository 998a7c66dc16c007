// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Utc};
use workout_tracker::config::Config;
use workout_tracker::db::FirestoreDb;
use workout_tracker::middleware::auth::create_jwt;
use workout_tracker::models::{
    Category, Exercise, SessionDetail, SetDetail, WorkoutSession, WorkoutSet,
};
use workout_tracker::routes::create_router;
use workout_tracker::services::StandardsService;
use workout_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Bundled standards dataset.
#[allow(dead_code)]
pub fn bundled_standards() -> StandardsService {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/strength_standards.json");
    StandardsService::load_from_file(path).expect("bundled standards should load")
}

/// Create a test app with an offline database and the bundled standards.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        Config::test_default(),
        FirestoreDb::new_mock(),
        bundled_standards(),
    ));

    (create_router(state.clone()), state)
}

/// A token the app accepts for `user_id`.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str) -> String {
    create_jwt(user_id, &Config::test_default().jwt_signing_key, 86400).unwrap()
}

/// Parse an RFC3339 string into a UTC time.
#[allow(dead_code)]
pub fn parse_time(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .unwrap()
        .with_timezone(&Utc)
}

#[allow(dead_code)]
pub fn category(id: &str, name: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
    }
}

#[allow(dead_code)]
pub fn exercise(id: &str, title: &str, category_id: &str) -> Exercise {
    Exercise {
        id: id.to_string(),
        title: title.to_string(),
        category_id: category_id.to_string(),
        active: true,
    }
}

/// Build a session with one set per `(exercise, category, weight, reps)`.
#[allow(dead_code)]
pub fn session_with_sets(
    id: &str,
    start: &str,
    sets: &[(&Exercise, &Category, f64, u32)],
) -> SessionDetail {
    let start_date = parse_time(start);
    SessionDetail {
        session: WorkoutSession {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: format!("Séance {id}"),
            start_date,
            end_date: None,
        },
        sets: sets
            .iter()
            .enumerate()
            .map(|(i, (exercise, category, weight, repetition))| SetDetail {
                set: WorkoutSet {
                    id: format!("{id}-{i}"),
                    session_id: id.to_string(),
                    user_id: "u1".to_string(),
                    exercise_id: exercise.id.clone(),
                    weight: *weight,
                    repetition: *repetition,
                    created_at: start_date + chrono::Duration::minutes(i as i64),
                    updated_at: start_date + chrono::Duration::minutes(i as i64),
                },
                exercise: (*exercise).clone(),
                category: (*category).clone(),
            })
            .collect(),
    }
}
