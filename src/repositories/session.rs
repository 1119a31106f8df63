use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    error::Result,
    models::session::{Session, SessionStatus},
};

/// Persistence operations for session records.
///
/// Implementations must apply each call atomically: a single row for the
/// per-id operations, a single predicate-matched update for
/// [`SessionBackend::reset_status`]. Concurrent writers to the same id are
/// last-writer-wins.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// All sessions, newest first (`created_at` desc, then `id` desc).
    async fn list(&self) -> Result<Vec<Session>>;

    /// A single session by id.
    async fn find(&self, id: i64) -> Result<Option<Session>>;

    /// Inserts a session with a fresh id, `Available` status and the current time.
    async fn insert(&self, name: &str, variable: &str) -> Result<Session>;

    /// Replaces the mutable fields. `None` when the id is absent.
    async fn update(
        &self,
        id: i64,
        name: &str,
        variable: &str,
        status: SessionStatus,
    ) -> Result<Option<Session>>;

    /// Replaces only the status. `None` when the id is absent.
    async fn update_status(&self, id: i64, status: SessionStatus) -> Result<Option<Session>>;

    /// Removes a session. Returns whether a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Moves every session in `from` to `to`, returning the number of rows touched.
    async fn reset_status(&self, from: SessionStatus, to: SessionStatus) -> Result<u64>;
}

/// Shared handle to whichever backend the process was configured with.
pub type SharedBackend = Arc<dyn SessionBackend>;
