// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog models (reference data).

use serde::{Deserialize, Serialize};

/// Exercise category (e.g. "Pectoraux"), used for grouping and UI tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Document ID
    pub id: String,
    /// Display name
    pub name: String,
}

/// Exercise stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Document ID
    pub id: String,
    /// Display title (e.g. "Développé couché")
    pub title: String,
    /// Owning category ID
    pub category_id: String,
    /// Inactive exercises are hidden from the picker but kept for history
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
