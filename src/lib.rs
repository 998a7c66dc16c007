// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout tracker: log strength training sets grouped into daily sessions,
//! chart progress per category and exercise, and compare lifts against
//! strength standards.
//!
//! This crate provides the backend API; the web client lives elsewhere.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{SessionService, StandardsService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub standards: StandardsService,
    pub sessions: SessionService,
}

impl AppState {
    /// Wire services around a database handle.
    pub fn new(config: Config, db: FirestoreDb, standards: StandardsService) -> Self {
        let offset = time_utils::display_offset(config.display_utc_offset_minutes);
        let sessions = SessionService::new(db.clone(), offset);
        Self {
            config,
            db,
            standards,
            sessions,
        }
    }
}
