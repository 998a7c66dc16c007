// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    BodyWeightBucket, Category, Exercise, Level, ProgressReport, SessionDetail, WorkoutSession,
    WorkoutSet,
};
use crate::services::progress::aggregate_progress;
use crate::services::standards::LevelProgress;
use crate::services::wizard::{Notification, SubmitContext, WizardAction, WizardState};
use crate::time_utils::{format_utc_rfc3339, rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/exercises", get(get_exercises))
        .route("/api/sessions", get(get_sessions))
        .route("/api/sessions/today", post(get_or_create_today))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/end", post(end_session))
        .route("/api/sessions/{id}/sets", post(create_sets))
        .route("/api/sets/{id}", patch(update_set).delete(delete_set))
        .route("/api/progress", get(get_progress))
        .route("/api/standards", get(get_standards))
        .route("/api/standards/{exercise_id}", get(get_standard))
}

// ─── User ────────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub user_id: String,
    pub is_admin: bool,
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<MeResponse> {
    Json(MeResponse {
        is_admin: state.config.is_admin(&user.user_id),
        user_id: user.user_id,
    })
}

// ─── Exercise Catalog ────────────────────────────────────────

#[derive(Serialize)]
pub struct ExerciseGroup {
    pub category: Category,
    pub exercises: Vec<Exercise>,
}

/// Active exercises grouped by category, both sorted by name.
async fn get_exercises(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ExerciseGroup>>> {
    let (exercises, categories) =
        tokio::try_join!(state.db.list_exercises(), state.db.list_categories())?;

    Ok(Json(group_exercises(exercises, categories)))
}

fn group_exercises(exercises: Vec<Exercise>, categories: Vec<Category>) -> Vec<ExerciseGroup> {
    let mut by_category: HashMap<String, Vec<Exercise>> = HashMap::new();
    for exercise in exercises.into_iter().filter(|e| e.active) {
        by_category
            .entry(exercise.category_id.clone())
            .or_default()
            .push(exercise);
    }

    let mut groups: Vec<ExerciseGroup> = categories
        .into_iter()
        .filter_map(|category| {
            let mut exercises = by_category.remove(&category.id)?;
            exercises.sort_by_cached_key(|e| e.title.to_lowercase());
            Some(ExerciseGroup {
                category,
                exercises,
            })
        })
        .collect();
    groups.sort_by_cached_key(|g| g.category.name.to_lowercase());
    groups
}

// ─── Sessions ────────────────────────────────────────────────

#[derive(Deserialize)]
struct SessionsQuery {
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    20
}

const MAX_PER_PAGE: u32 = 100;

#[derive(Serialize)]
pub struct SessionsPage {
    pub sessions: Vec<WorkoutSession>,
    /// Present when another page may follow
    pub next_cursor: Option<String>,
}

fn encode_cursor(start_date: DateTime<Utc>) -> String {
    URL_SAFE_NO_PAD.encode(format_utc_rfc3339(start_date))
}

fn parse_cursor(cursor: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    cursor
        .map(|raw| {
            let invalid_cursor = || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            DateTime::parse_from_rfc3339(decoded_str)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| invalid_cursor())
        })
        .transpose()
}

/// List the user's sessions, newest first.
async fn get_sessions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<SessionsPage>> {
    let per_page = query.per_page.clamp(1, MAX_PER_PAGE);
    let before = parse_cursor(query.cursor.as_deref())?;

    let sessions = state
        .db
        .list_sessions_for_user(&user.user_id, before, per_page)
        .await?;

    let next_cursor = if sessions.len() == per_page as usize {
        sessions.last().map(|s| encode_cursor(s.start_date))
    } else {
        None
    };

    Ok(Json(SessionsPage {
        sessions,
        next_cursor,
    }))
}

async fn get_or_create_today(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<WorkoutSession>> {
    let session = state
        .sessions
        .get_or_create_today(&user.user_id, Utc::now())
        .await?;
    Ok(Json(session))
}

/// One set as shown in a session view.
#[derive(Serialize)]
pub struct SetView {
    pub id: String,
    pub exercise_id: String,
    pub exercise_title: String,
    pub category_id: String,
    pub category_name: String,
    pub weight: f64,
    pub repetition: u32,
    #[serde(with = "rfc3339")]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session: WorkoutSession,
    pub sets: Vec<SetView>,
}

impl From<SessionDetail> for SessionResponse {
    fn from(detail: SessionDetail) -> Self {
        let sets = detail
            .sets
            .into_iter()
            .map(|d| SetView {
                id: d.set.id,
                exercise_id: d.exercise.id,
                exercise_title: d.exercise.title,
                category_id: d.category.id,
                category_name: d.category.name,
                weight: d.set.weight,
                repetition: d.set.repetition,
                created_at: d.set.created_at,
            })
            .collect();
        Self {
            session: detail.session,
            sets,
        }
    }
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>> {
    let detail = state.sessions.load_detail(&user.user_id, &session_id).await?;
    Ok(Json(detail.into()))
}

async fn end_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> Result<Json<WorkoutSession>> {
    let session = state
        .sessions
        .end_session(&user.user_id, &session_id, Utc::now())
        .await?;
    Ok(Json(session))
}

// ─── Sets ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSetsRequest {
    #[validate(length(min = 1))]
    pub exercise_id: String,
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub weight: f64,
    #[validate(range(min = 1))]
    pub series: u32,
    #[validate(range(min = 1))]
    pub repetition: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSetRequest {
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub weight: f64,
    #[validate(range(min = 1))]
    pub repetition: u32,
}

#[derive(Serialize)]
pub struct CreatedSetsResponse {
    pub sets: Vec<WorkoutSet>,
}

/// Drive the creation wizard with the request values and submit.
async fn create_sets(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
    Json(body): Json<CreateSetsRequest>,
) -> Result<(StatusCode, Json<CreatedSetsResponse>)> {
    body.validate()?;
    let limits = state.config.wizard_limits;
    if body.series > limits.max_series || body.repetition > limits.max_repetitions {
        return Err(AppError::BadRequest(format!(
            "series must be at most {} and repetition at most {}",
            limits.max_series, limits.max_repetitions
        )));
    }

    let session = state.sessions.get_owned(&user.user_id, &session_id).await?;
    state
        .db
        .get_exercise(&body.exercise_id)
        .await?
        .filter(|e| e.active)
        .ok_or_else(|| AppError::NotFound(format!("Exercise {}", body.exercise_id)))?;

    let mut wizard = WizardState::new_create(limits).drive([
        WizardAction::SelectExercise(body.exercise_id),
        WizardAction::SetWeight(body.weight),
        WizardAction::Next,
        WizardAction::SetSeriesCount(body.series),
        WizardAction::Next,
        WizardAction::SetRepetitions(body.repetition),
    ]);

    let ctx = SubmitContext {
        session_id: session.id,
        user_id: user.user_id,
    };
    let notification = wizard
        .submit(&state.db, &ctx)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    match notification {
        Notification::Created { sets } => {
            tracing::info!(session_id = %ctx.session_id, count = sets.len(), "Sets recorded");
            Ok((StatusCode::CREATED, Json(CreatedSetsResponse { sets })))
        }
        other => Err(notification_error(other)),
    }
}

/// Drive the edit wizard with the request values and submit.
async fn update_set(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(set_id): Path<String>,
    Json(body): Json<UpdateSetRequest>,
) -> Result<Json<WorkoutSet>> {
    body.validate()?;
    let limits = state.config.wizard_limits;
    if body.repetition > limits.max_repetitions {
        return Err(AppError::BadRequest(format!(
            "repetition must be at most {}",
            limits.max_repetitions
        )));
    }

    let set = owned_set(&state, &user, &set_id).await?;

    let mut wizard = WizardState::new_edit(&set, limits).drive([
        WizardAction::SetWeight(body.weight),
        WizardAction::Next,
        WizardAction::SetRepetitions(body.repetition),
    ]);

    let ctx = SubmitContext {
        session_id: set.session_id.clone(),
        user_id: user.user_id,
    };
    let notification = wizard
        .submit(&state.db, &ctx)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    match notification {
        Notification::Updated { set } => Ok(Json(set)),
        other => Err(notification_error(other)),
    }
}

async fn delete_set(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(set_id): Path<String>,
) -> Result<StatusCode> {
    owned_set(&state, &user, &set_id).await?;
    state.db.delete_set(&set_id).await?;
    tracing::info!(user_id = %user.user_id, set_id = %set_id, "Set deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Sets owned by someone else are reported as not found.
async fn owned_set(state: &AppState, user: &AuthUser, set_id: &str) -> Result<WorkoutSet> {
    state
        .db
        .get_set(set_id)
        .await?
        .filter(|s| s.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Set {}", set_id)))
}

fn notification_error(notification: Notification) -> AppError {
    match notification {
        Notification::Failed { message, persisted } => {
            AppError::Persistence(format!("{} ({} enregistrée(s))", message, persisted))
        }
        _ => AppError::Internal(anyhow::anyhow!("Unexpected wizard notification")),
    }
}

// ─── Progress ────────────────────────────────────────────────

async fn get_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProgressReport>> {
    let history = state.sessions.load_history(&user.user_id).await?;
    let report = aggregate_progress(&history, state.sessions.offset());

    tracing::debug!(
        user_id = %user.user_id,
        categories = report.categories.len(),
        "Progress aggregated"
    );

    Ok(Json(report))
}

// ─── Strength Standards ──────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StandardSummary {
    pub exercise_id: String,
    pub exercise_name: String,
    pub category: String,
}

async fn get_standards(State(state): State<Arc<AppState>>) -> Json<Vec<StandardSummary>> {
    let summaries = state
        .standards
        .standards()
        .iter()
        .map(|s| StandardSummary {
            exercise_id: s.exercise_id.clone(),
            exercise_name: s.exercise_name.clone(),
            category: s.category.clone(),
        })
        .collect();
    Json(summaries)
}

#[derive(Deserialize)]
struct StandardQuery {
    body_weight: f64,
    lifted: Option<f64>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StandardLookupResponse {
    pub exercise_id: String,
    pub exercise_name: String,
    pub bucket: BodyWeightBucket,
    pub level: Option<Level>,
    pub progress: Option<LevelProgress>,
}

/// Nearest bucket for a body weight, with level and progress when a lifted
/// weight is given.
async fn get_standard(
    State(state): State<Arc<AppState>>,
    Path(exercise_id): Path<String>,
    Query(query): Query<StandardQuery>,
) -> Result<Json<StandardLookupResponse>> {
    if !query.body_weight.is_finite() || query.body_weight <= 0.0 {
        return Err(AppError::BadRequest(
            "body_weight must be positive".to_string(),
        ));
    }
    if query.lifted.is_some_and(|l| !l.is_finite() || l < 0.0) {
        return Err(AppError::BadRequest("lifted must not be negative".to_string()));
    }

    let standards = &state.standards;
    let not_found = || AppError::NotFound(format!("Standard {}", exercise_id));
    let standard = standards.standard(&exercise_id).ok_or_else(not_found)?;
    let bucket = standards
        .lookup_standard(&exercise_id, query.body_weight)
        .ok_or_else(not_found)?;

    let (level, progress) = match query.lifted {
        Some(lifted) => (
            standards.classify_level(&exercise_id, query.body_weight, lifted),
            standards.progress_to_next_level(&exercise_id, query.body_weight, lifted),
        ),
        None => (None, None),
    };

    Ok(Json(StandardLookupResponse {
        exercise_id: standard.exercise_id.clone(),
        exercise_name: standard.exercise_name.clone(),
        bucket: bucket.clone(),
        level,
        progress,
    }))
}
