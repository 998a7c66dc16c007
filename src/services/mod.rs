// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod history;
pub mod progress;
pub mod sessions;
pub mod standards;
pub mod wizard;

pub use history::assemble_sessions;
pub use progress::aggregate_progress;
pub use sessions::SessionService;
pub use standards::{LevelProgress, StandardsError, StandardsService};
pub use wizard::{Notification, SetStore, WizardAction, WizardLimits, WizardState};
