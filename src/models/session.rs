use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::AppError;

/// Availability of a CLI session.
///
/// The labels are what the dashboard shows and what the `sessions.status`
/// column stores; the database enforces the same three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Free to be handed out.
    #[default]
    #[serde(rename = "Свободно")]
    Available,
    /// Currently checked out by someone.
    #[serde(rename = "Используется")]
    InUse,
    /// Quota ran out; the scheduled reset returns it to `Available`.
    #[serde(rename = "Истекла квота")]
    QuotaExpired,
}

impl SessionStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [SessionStatus; 3] = [
        SessionStatus::Available,
        SessionStatus::InUse,
        SessionStatus::QuotaExpired,
    ];

    /// The stored and displayed label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Available => "Свободно",
            SessionStatus::InUse => "Используется",
            SessionStatus::QuotaExpired => "Истекла квота",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Недопустимый статус сессии: {}", s)))
    }
}

/// A named CLI session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Surrogate key assigned by the backend.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// The opaque credential payload.
    pub variable: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}
