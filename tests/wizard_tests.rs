// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Set wizard submission against an in-memory store.

use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use workout_tracker::error::AppError;
use workout_tracker::models::{SetDraft, SetPatch, WorkoutSet};
use workout_tracker::services::wizard::{
    Notification, SetStore, SubmitContext, WizardAction, WizardLimits, WizardState, WizardStep,
};

/// Store that fails the Nth create call (1-based).
#[derive(Default)]
struct MemoryStore {
    sets: Mutex<Vec<WorkoutSet>>,
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl MemoryStore {
    fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }

    fn stored(&self) -> Vec<WorkoutSet> {
        self.sets.lock().unwrap().clone()
    }
}

impl SetStore for MemoryStore {
    async fn create_set(&self, draft: SetDraft) -> Result<WorkoutSet, AppError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(AppError::Database("write rejected".to_string()));
        }
        let set = draft.into_set(Utc::now());
        self.sets.lock().unwrap().push(set.clone());
        Ok(set)
    }

    async fn update_set(
        &self,
        set_id: &str,
        patch: &SetPatch,
    ) -> Result<Option<WorkoutSet>, AppError> {
        let mut sets = self.sets.lock().unwrap();
        let Some(set) = sets.iter_mut().find(|s| s.id == set_id) else {
            return Ok(None);
        };
        patch.apply(set, Utc::now());
        Ok(Some(set.clone()))
    }
}

fn ctx() -> SubmitContext {
    SubmitContext {
        session_id: "session-1".to_string(),
        user_id: "user-1".to_string(),
    }
}

fn three_series_of_bench() -> WizardState {
    WizardState::new_create(WizardLimits::default()).drive([
        WizardAction::SelectExercise("bench".to_string()),
        WizardAction::SetWeight(60.0),
        WizardAction::Next,
        WizardAction::SetSeriesCount(3),
        WizardAction::Next,
        WizardAction::SetRepetitions(8),
    ])
}

#[tokio::test]
async fn test_create_three_series() {
    let store = MemoryStore::default();
    let mut wizard = three_series_of_bench();
    assert_eq!(wizard.current_step(), WizardStep::SetRepetitions);

    let notification = wizard.submit(&store, &ctx()).await.unwrap();

    let Notification::Created { sets } = notification else {
        panic!("expected Created, got {notification:?}");
    };
    assert_eq!(sets.len(), 3);
    assert!(sets
        .iter()
        .all(|s| s.exercise_id == "bench" && s.weight == 60.0 && s.repetition == 8));
    assert!(sets.iter().all(|s| s.session_id == "session-1" && s.user_id == "user-1"));
    assert_eq!(store.stored().len(), 3);

    // Success resets the wizard.
    assert_eq!(wizard, WizardState::new_create(WizardLimits::default()));
}

#[tokio::test]
async fn test_one_failing_series_reports_failure() {
    let store = MemoryStore::failing_on(2);
    let mut wizard = three_series_of_bench();
    let before = wizard.clone();

    let notification = wizard.submit(&store, &ctx()).await.unwrap();

    assert_eq!(
        notification,
        Notification::Failed {
            message: "Impossible d'enregistrer toutes les séries".to_string(),
            persisted: 2,
        }
    );
    // No rollback: the other two writes stay.
    assert_eq!(store.stored().len(), 2);
    assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    // Failure keeps the wizard state for a retry.
    assert_eq!(wizard, before);
}

#[tokio::test]
async fn test_submit_before_last_step_is_rejected() {
    let store = MemoryStore::default();
    let mut wizard = WizardState::new_create(WizardLimits::default())
        .reduce(WizardAction::SelectExercise("bench".to_string()));

    let err = wizard.submit(&store, &ctx()).await.unwrap_err();

    assert_eq!(err.to_string(), "Wizard is not ready to submit (blocked at SetWeight)");
    assert!(store.stored().is_empty());
}

#[tokio::test]
async fn test_edit_updates_existing_set() {
    let store = MemoryStore::default();
    let mut creator = three_series_of_bench();
    let Notification::Created { sets } = creator.submit(&store, &ctx()).await.unwrap() else {
        panic!("creation failed");
    };
    let target = sets[1].clone();

    let mut editor = WizardState::new_edit(&target, WizardLimits::default()).drive([
        WizardAction::SetWeight(62.5),
        WizardAction::Next,
        WizardAction::SetRepetitions(6),
    ]);
    let notification = editor.submit(&store, &ctx()).await.unwrap();

    let Notification::Updated { set } = notification else {
        panic!("expected Updated, got {notification:?}");
    };
    assert_eq!(set.id, target.id);
    assert_eq!(set.weight, 62.5);
    assert_eq!(set.repetition, 6);
    assert_eq!(set.exercise_id, "bench");

    let stored = store.stored();
    let others: Vec<_> = stored.iter().filter(|s| s.id != target.id).collect();
    assert!(others.iter().all(|s| s.weight == 60.0 && s.repetition == 8));
}

#[tokio::test]
async fn test_edit_of_vanished_set_fails() {
    let store = MemoryStore::default();
    let ghost = SetDraft {
        session_id: "session-1".to_string(),
        user_id: "user-1".to_string(),
        exercise_id: "bench".to_string(),
        weight: 50.0,
        repetition: 5,
    }
    .into_set(Utc::now());

    let mut editor = WizardState::new_edit(&ghost, WizardLimits::default())
        .drive([WizardAction::Next]);
    let before = editor.clone();
    let notification = editor.submit(&store, &ctx()).await.unwrap();

    assert!(!notification.is_success());
    assert_eq!(editor, before);
}
