// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout session lifecycle.
//!
//! Handles:
//! 1. Getting or creating the current day's session
//! 2. Closing a session on request
//! 3. Sweeping sessions left open on a previous day
//! 4. Loading sessions joined with their sets

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{SessionDetail, WorkoutSession};
use crate::services::history::assemble_sessions;
use crate::time_utils::{day_bounds, format_label};
use chrono::{DateTime, Duration, FixedOffset, Utc};

/// Session operations bound to a database and a display offset.
#[derive(Clone)]
pub struct SessionService {
    db: FirestoreDb,
    offset: FixedOffset,
}

impl SessionService {
    pub fn new(db: FirestoreDb, offset: FixedOffset) -> Self {
        Self { db, offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Return the user's open session for the day containing `now`, creating
    /// one if none exists.
    ///
    /// Two concurrent calls may both create a session; nothing in storage
    /// prevents it.
    pub async fn get_or_create_today(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession> {
        let (start, _) = day_bounds(now, self.offset);
        let existing = self
            .db
            .list_sessions_started_between(user_id, start, start + Duration::days(1))
            .await?;

        if let Some(session) = existing.into_iter().find(WorkoutSession::is_open) {
            tracing::debug!(user_id, session_id = %session.id, "Reusing today's session");
            return Ok(session);
        }

        let session = new_session(user_id, now, self.offset);
        self.db.upsert_session(&session).await?;
        tracing::info!(user_id, session_id = %session.id, "Session started");

        Ok(session)
    }

    /// Fetch a session owned by `user_id`. Sessions owned by someone else
    /// are reported as not found.
    pub async fn get_owned(&self, user_id: &str, session_id: &str) -> Result<WorkoutSession> {
        self.db
            .get_session(session_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Session {}", session_id)))
    }

    /// Close a session. Closing an already-closed session is a no-op.
    pub async fn end_session(
        &self,
        user_id: &str,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession> {
        let mut session = self.get_owned(user_id, session_id).await?;
        if !session.is_open() {
            return Ok(session);
        }

        session.end_date = Some(now);
        self.db.upsert_session(&session).await?;
        tracing::info!(user_id, session_id, "Session ended");

        Ok(session)
    }

    /// Close every session still open from a day before the one containing
    /// `now`. Returns the number of sessions closed.
    pub async fn close_stale_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let (today_start, _) = day_bounds(now, self.offset);
        let stale = self.db.list_open_sessions_started_before(today_start).await?;

        let closed: Vec<WorkoutSession> = stale
            .into_iter()
            .filter(|s| is_stale(s, now, self.offset))
            .map(|mut s| {
                s.end_date = Some(stale_close_time(s.start_date, self.offset));
                s
            })
            .collect();

        if closed.is_empty() {
            return Ok(0);
        }

        self.db.batch_upsert_sessions(&closed).await?;
        tracing::info!(count = closed.len(), "Closed stale sessions");

        Ok(closed.len())
    }

    /// Load one owned session with its sets.
    pub async fn load_detail(&self, user_id: &str, session_id: &str) -> Result<SessionDetail> {
        let session = self.get_owned(user_id, session_id).await?;
        let (sets, exercises, categories) = tokio::try_join!(
            self.db.list_sets_for_session(session_id),
            self.db.list_exercises(),
            self.db.list_categories(),
        )?;

        assemble_sessions(vec![session], sets, &exercises, &categories)
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Session {}", session_id)))
    }

    /// Load the user's whole history with sets attached.
    pub async fn load_history(&self, user_id: &str) -> Result<Vec<SessionDetail>> {
        let (sessions, sets, exercises, categories) = tokio::try_join!(
            self.db.list_all_sessions_for_user(user_id),
            self.db.list_sets_for_user(user_id),
            self.db.list_exercises(),
            self.db.list_categories(),
        )?;

        tracing::debug!(
            user_id,
            sessions = sessions.len(),
            sets = sets.len(),
            "Loaded history"
        );

        Ok(assemble_sessions(sessions, sets, &exercises, &categories))
    }
}

/// Title given to a new session, e.g. `Séance du 15/01/2024`.
pub fn session_title(now: DateTime<Utc>, offset: FixedOffset) -> String {
    format!("Séance du {}", format_label(now, offset, false))
}

fn new_session(user_id: &str, now: DateTime<Utc>, offset: FixedOffset) -> WorkoutSession {
    WorkoutSession {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title: session_title(now, offset),
        start_date: now,
        end_date: None,
    }
}

/// An open session started on an earlier calendar day than `now`.
pub fn is_stale(session: &WorkoutSession, now: DateTime<Utc>, offset: FixedOffset) -> bool {
    let (today_start, _) = day_bounds(now, offset);
    session.is_open() && session.start_date < today_start
}

/// Last second of the calendar day the session started on.
pub fn stale_close_time(start: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    day_bounds(start, offset).1
}
