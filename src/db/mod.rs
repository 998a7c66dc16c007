//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const CATEGORIES: &str = "categories";
    pub const EXERCISES: &str = "exercises";
    pub const SESSIONS: &str = "sessions";
    /// Sets (keyed by set ID, carry `session_id` and `user_id`)
    pub const SETS: &str = "sets";
}
