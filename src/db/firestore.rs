// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Categories and exercises (reference data)
//! - Workout sessions
//! - Sets (also exposed through the wizard's [`SetStore`] seam)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Category, Exercise, SetDraft, SetPatch, WorkoutSession, WorkoutSet};
use crate::services::wizard::SetStore;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Catalog Operations ──────────────────────────────────────

    /// All categories.
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CATEGORIES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All exercises, including inactive ones (history still references them).
    pub async fn list_exercises(&self) -> Result<Vec<Exercise>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::EXERCISES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_exercise(&self, exercise_id: &str) -> Result<Option<Exercise>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EXERCISES)
            .obj()
            .one(exercise_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a category (catalog seeding).
    pub async fn upsert_category(&self, category: &Category) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CATEGORIES)
            .document_id(&category.id)
            .object(category)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Create or update an exercise (catalog seeding).
    pub async fn upsert_exercise(&self, exercise: &Exercise) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::EXERCISES)
            .document_id(&exercise.id)
            .object(exercise)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Session Operations ──────────────────────────────────────

    pub async fn get_session(&self, session_id: &str) -> Result<Option<WorkoutSession>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SESSIONS)
            .obj()
            .one(session_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user's sessions, newest first, optionally only those started
    /// strictly before `before`.
    pub async fn list_sessions_for_user(
        &self,
        user_id: &str,
        before: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<WorkoutSession>, AppError> {
        let user_id = user_id.to_string();
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS);

        let query = if let Some(before) = before {
            let before = format_utc_rfc3339(before);
            query.filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("start_date").less_than(before.clone()),
                ])
            })
        } else {
            query.filter(move |q| q.field("user_id").eq(user_id.clone()))
        };

        query
            .order_by([("start_date", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get every session a user owns (used for progress aggregation).
    pub async fn list_all_sessions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<WorkoutSession>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sessions a user started within `[start, end)`.
    pub async fn list_sessions_started_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WorkoutSession>, AppError> {
        let user_id = user_id.to_string();
        let start = format_utc_rfc3339(start);
        let end = format_utc_rfc3339(end);
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("start_date").greater_than_or_equal(start.clone()),
                    q.field("start_date").less_than(end.clone()),
                ])
            })
            .order_by([("start_date", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Open sessions (all users) started strictly before `cutoff`.
    pub async fn list_open_sessions_started_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<WorkoutSession>, AppError> {
        let cutoff = format_utc_rfc3339(cutoff);
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("end_date").is_null(),
                    q.field("start_date").less_than(cutoff.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a session.
    pub async fn upsert_session(&self, session: &WorkoutSession) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SESSIONS)
            .document_id(&session.id)
            .object(session)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write many sessions using batched transactions.
    pub async fn batch_upsert_sessions(&self, sessions: &[WorkoutSession]) -> Result<(), AppError> {
        let client = self.get_client()?;

        for chunk in sessions.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for session in chunk {
                client
                    .fluent()
                    .update()
                    .in_col(collections::SESSIONS)
                    .document_id(&session.id)
                    .object(session)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add session {} to transaction: {}",
                            session.id, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit session batch: {}", e))
            })?;
        }

        Ok(())
    }

    // ─── Set Operations ──────────────────────────────────────────

    pub async fn get_set(&self, set_id: &str) -> Result<Option<WorkoutSet>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SETS)
            .obj()
            .one(set_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sets of one session, in creation order.
    pub async fn list_sets_for_session(&self, session_id: &str) -> Result<Vec<WorkoutSet>, AppError> {
        let session_id = session_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SETS)
            .filter(move |q| q.field("session_id").eq(session_id.clone()))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every set a user owns, in creation order.
    pub async fn list_sets_for_user(&self, user_id: &str) -> Result<Vec<WorkoutSet>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SETS)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a set.
    pub async fn upsert_set(&self, set: &WorkoutSet) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SETS)
            .document_id(&set.id)
            .object(set)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn delete_set(&self, set_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SETS)
            .document_id(set_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

impl SetStore for FirestoreDb {
    async fn create_set(&self, draft: SetDraft) -> Result<WorkoutSet, AppError> {
        let set = draft.into_set(Utc::now());
        self.upsert_set(&set).await?;
        tracing::debug!(set_id = %set.id, session_id = %set.session_id, "Set created");
        Ok(set)
    }

    async fn update_set(
        &self,
        set_id: &str,
        patch: &SetPatch,
    ) -> Result<Option<WorkoutSet>, AppError> {
        let Some(mut set) = self.get_set(set_id).await? else {
            return Ok(None);
        };

        patch.apply(&mut set, Utc::now());
        self.upsert_set(&set).await?;
        tracing::debug!(set_id, "Set updated");
        Ok(Some(set))
    }
}
