// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Set-composition wizard.
//!
//! A linear step sequence driven by a pure reducer:
//! - creation: select exercise → weight → series count → repetitions,
//!   producing one new set per series
//! - edit: weight → repetitions, producing one update of an existing set
//!
//! The final step hands off to a [`SetStore`]. Creation writes run
//! concurrently and are not rolled back when one of them fails.

use crate::error::AppError;
use crate::models::{SetDraft, SetPatch, WorkoutSet};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Default upper bound for the series count.
pub const DEFAULT_MAX_SERIES: u32 = 4;
/// Default upper bound for the repetition count.
pub const DEFAULT_MAX_REPETITIONS: u32 = 15;

const CREATE_STEPS: &[WizardStep] = &[
    WizardStep::SelectExercise,
    WizardStep::SetWeight,
    WizardStep::SetSeriesCount,
    WizardStep::SetRepetitions,
];
const EDIT_STEPS: &[WizardStep] = &[WizardStep::SetWeight, WizardStep::SetRepetitions];

/// Persistence seam for the wizard's terminal action.
pub trait SetStore {
    /// Persist a new set.
    fn create_set(&self, draft: SetDraft) -> impl Future<Output = Result<WorkoutSet, AppError>> + Send;

    /// Update a set. `Ok(None)` means the set no longer exists.
    fn update_set(
        &self,
        set_id: &str,
        patch: &SetPatch,
    ) -> impl Future<Output = Result<Option<WorkoutSet>, AppError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    SelectExercise,
    SetWeight,
    SetSeriesCount,
    SetRepetitions,
}

/// Creation or edit of one existing set (original values kept for reset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WizardMode {
    Create,
    Edit {
        set_id: String,
        exercise_id: String,
        weight: f64,
        repetition: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WizardLimits {
    pub max_series: u32,
    pub max_repetitions: u32,
}

impl Default for WizardLimits {
    fn default() -> Self {
        Self {
            max_series: DEFAULT_MAX_SERIES,
            max_repetitions: DEFAULT_MAX_REPETITIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum WizardAction {
    /// Choose the exercise and advance in one go
    SelectExercise(String),
    SetWeight(f64),
    SetSeriesCount(u32),
    SetRepetitions(u32),
    Next,
    Previous,
    Reset,
}

/// Where to persist the wizard's output.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitContext {
    pub session_id: String,
    pub user_id: String,
}

/// What the terminal step asks the store to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PersistRequest {
    Create { drafts: Vec<SetDraft> },
    Update { set_id: String, patch: SetPatch },
}

/// Outcome reported to the caller after the terminal step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Created { sets: Vec<WorkoutSet> },
    Updated { set: WorkoutSet },
    /// Already-created sets stay persisted
    Failed { message: String, persisted: usize },
}

impl Notification {
    pub fn is_success(&self) -> bool {
        !matches!(self, Notification::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("Wizard is not ready to submit (blocked at {0:?})")]
    NotReady(WizardStep),
}

/// Wizard state; transitions go through [`WizardState::reduce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    mode: WizardMode,
    /// Index into the mode's step list
    step: usize,
    exercise_id: Option<String>,
    weight: f64,
    series: u32,
    repetition: u32,
    limits: WizardLimits,
}

impl WizardState {
    /// Fresh creation wizard.
    pub fn new_create(limits: WizardLimits) -> Self {
        Self {
            mode: WizardMode::Create,
            step: 0,
            exercise_id: None,
            weight: 0.0,
            series: 1,
            repetition: 0,
            limits,
        }
    }

    /// Edit wizard pre-filled from an existing set.
    pub fn new_edit(set: &WorkoutSet, limits: WizardLimits) -> Self {
        Self::initial(
            WizardMode::Edit {
                set_id: set.id.clone(),
                exercise_id: set.exercise_id.clone(),
                weight: set.weight,
                repetition: set.repetition,
            },
            limits,
        )
    }

    fn initial(mode: WizardMode, limits: WizardLimits) -> Self {
        let WizardMode::Edit {
            exercise_id,
            weight,
            repetition,
            ..
        } = &mode
        else {
            return Self::new_create(limits);
        };

        Self {
            exercise_id: Some(exercise_id.clone()),
            weight: *weight,
            series: 1,
            repetition: *repetition,
            step: 0,
            limits,
            mode,
        }
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn exercise_id(&self) -> Option<&str> {
        self.exercise_id.as_deref()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn series(&self) -> u32 {
        self.series
    }

    pub fn repetition(&self) -> u32 {
        self.repetition
    }

    pub fn limits(&self) -> WizardLimits {
        self.limits
    }

    pub fn steps(&self) -> &'static [WizardStep] {
        match self.mode {
            WizardMode::Create => CREATE_STEPS,
            WizardMode::Edit { .. } => EDIT_STEPS,
        }
    }

    pub fn current_step(&self) -> WizardStep {
        let steps = self.steps();
        steps[self.step.min(steps.len() - 1)]
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 >= self.steps().len()
    }

    /// Exit condition of the current step.
    pub fn is_valid(&self) -> bool {
        self.step_valid(self.current_step())
    }

    fn step_valid(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::SelectExercise => self.exercise_id.as_deref().is_some_and(|id| !id.is_empty()),
            WizardStep::SetWeight => self.weight.is_finite() && self.weight > 0.0,
            WizardStep::SetSeriesCount => (1..=self.limits.max_series).contains(&self.series),
            WizardStep::SetRepetitions => {
                (1..=self.limits.max_repetitions).contains(&self.repetition)
            }
        }
    }

    /// First step of the mode whose exit condition does not hold.
    fn first_invalid_step(&self) -> Option<WizardStep> {
        self.steps().iter().copied().find(|step| !self.step_valid(*step))
    }

    pub fn can_go_next(&self) -> bool {
        !self.is_last_step() && self.is_valid()
    }

    pub fn can_go_previous(&self) -> bool {
        self.step > 0
    }

    /// Apply one action. Actions that do not fit the current step are ignored.
    pub fn reduce(mut self, action: WizardAction) -> Self {
        let step = self.current_step();
        match action {
            WizardAction::SelectExercise(id) if step == WizardStep::SelectExercise => {
                if id.is_empty() {
                    self.exercise_id = None;
                } else {
                    self.exercise_id = Some(id);
                    self.step += 1;
                }
            }
            WizardAction::SetWeight(weight) if step == WizardStep::SetWeight => {
                self.weight = weight;
            }
            WizardAction::SetSeriesCount(series) if step == WizardStep::SetSeriesCount => {
                self.series = series;
            }
            WizardAction::SetRepetitions(repetition) if step == WizardStep::SetRepetitions => {
                self.repetition = repetition;
            }
            WizardAction::Next if self.can_go_next() => {
                self.step += 1;
            }
            WizardAction::Previous if self.can_go_previous() => {
                self.step -= 1;
            }
            WizardAction::Reset => {
                return Self::initial(self.mode, self.limits);
            }
            _ => {}
        }
        self
    }

    /// Apply a sequence of actions in order.
    pub fn drive<I>(self, actions: I) -> Self
    where
        I: IntoIterator<Item = WizardAction>,
    {
        actions.into_iter().fold(self, Self::reduce)
    }

    /// Build the terminal request.
    ///
    /// Only available on the last step, with every step of the mode valid.
    pub fn persist_request(&self, ctx: &SubmitContext) -> Result<PersistRequest, WizardError> {
        if !self.is_last_step() {
            return Err(WizardError::NotReady(self.current_step()));
        }
        if let Some(step) = self.first_invalid_step() {
            return Err(WizardError::NotReady(step));
        }

        match &self.mode {
            WizardMode::Create => {
                let exercise_id = self
                    .exercise_id
                    .clone()
                    .ok_or(WizardError::NotReady(WizardStep::SelectExercise))?;
                let drafts = (0..self.series)
                    .map(|_| SetDraft {
                        session_id: ctx.session_id.clone(),
                        user_id: ctx.user_id.clone(),
                        exercise_id: exercise_id.clone(),
                        weight: self.weight,
                        repetition: self.repetition,
                    })
                    .collect();
                Ok(PersistRequest::Create { drafts })
            }
            WizardMode::Edit { set_id, .. } => Ok(PersistRequest::Update {
                set_id: set_id.clone(),
                patch: SetPatch {
                    weight: Some(self.weight),
                    repetition: Some(self.repetition),
                    session_id: None,
                },
            }),
        }
    }

    /// Run the terminal action against `store`.
    ///
    /// On success the wizard resets; on failure it keeps its state so the
    /// caller can retry. Persistence failures come back as
    /// [`Notification::Failed`], not as errors.
    pub async fn submit<S>(&mut self, store: &S, ctx: &SubmitContext) -> Result<Notification, WizardError>
    where
        S: SetStore + Sync,
    {
        let notification = match self.persist_request(ctx)? {
            PersistRequest::Create { drafts } => {
                let requested = drafts.len();
                let results = join_all(drafts.into_iter().map(|draft| store.create_set(draft))).await;

                let mut sets = Vec::with_capacity(requested);
                let mut failures = 0usize;
                for result in results {
                    match result {
                        Ok(set) => sets.push(set),
                        Err(e) => {
                            failures += 1;
                            tracing::warn!(
                                session_id = %ctx.session_id,
                                error = %e,
                                "Set creation failed"
                            );
                        }
                    }
                }

                if failures == 0 {
                    Notification::Created { sets }
                } else {
                    tracing::error!(
                        session_id = %ctx.session_id,
                        requested,
                        persisted = sets.len(),
                        "Set batch partially failed"
                    );
                    Notification::Failed {
                        message: "Impossible d'enregistrer toutes les séries".to_string(),
                        persisted: sets.len(),
                    }
                }
            }
            PersistRequest::Update { set_id, patch } => match store.update_set(&set_id, &patch).await {
                Ok(Some(set)) => Notification::Updated { set },
                Ok(None) => {
                    tracing::warn!(set_id = %set_id, "Set to update no longer exists");
                    Notification::Failed {
                        message: "Impossible de modifier la série".to_string(),
                        persisted: 0,
                    }
                }
                Err(e) => {
                    tracing::error!(set_id = %set_id, error = %e, "Set update failed");
                    Notification::Failed {
                        message: "Impossible de modifier la série".to_string(),
                        persisted: 0,
                    }
                }
            },
        };

        if notification.is_success() {
            *self = self.clone().reduce(WizardAction::Reset);
        }
        Ok(notification)
    }
}
