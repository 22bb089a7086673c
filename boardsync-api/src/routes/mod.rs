/// API route handlers
///
/// Each mutating handler is one unit of work: validate → authorize →
/// compute ordering (where applicable) → persist → append activity →
/// notify subscribers. The first failure aborts the remaining steps;
/// activity and broadcast failures after a successful persist are logged
/// and swallowed - they are best-effort and not part of the mutation's
/// atomicity contract.
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh, current user
/// - `users`: User search for the assignment picker
/// - `boards`: Board lifecycle, listing, and the full-board read
/// - `lists`: List lifecycle
/// - `tasks`: Task lifecycle, moves, and assignment
/// - `activities`: The board activity feed

pub mod activities;
pub mod auth;
pub mod boards;
pub mod health;
pub mod lists;
pub mod tasks;
pub mod users;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use boardsync_shared::models::activity::{Activity, CreateActivity};

/// Acknowledgment body for deletions
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

impl MessageResponse {
    /// Creates an acknowledgment
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Appends an activity record, best-effort
///
/// Called after the mutation has persisted; a failure here is logged but
/// does not fail the caller's mutation.
pub(crate) async fn record_activity(db: &PgPool, entry: CreateActivity) {
    let action = entry.action;
    if let Err(error) = Activity::record(db, entry).await {
        tracing::warn!(action = action.as_str(), %error, "failed to append activity record");
    }
}
