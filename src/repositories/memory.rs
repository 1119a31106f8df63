use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use crate::{
    error::Result,
    models::session::{Session, SessionStatus},
    repositories::session::SessionBackend,
};

#[derive(Default)]
struct Inner {
    last_id: i64,
    rows: BTreeMap<i64, Session>,
}

impl Inner {
    fn insert(&mut self, name: &str, variable: &str, created_at: DateTime<Utc>) -> Session {
        self.last_id += 1;
        let session = Session {
            id: self.last_id,
            name: name.to_string(),
            variable: variable.to_string(),
            status: SessionStatus::Available,
            created_at,
        };
        self.rows.insert(session.id, session.clone());
        session
    }
}

/// Process-local session storage.
///
/// Used when no `DATABASE_URL` is configured and by the test suite. Ids come
/// from a counter that only moves forward, so deleted ids are never handed
/// out again.
#[derive(Default)]
pub struct MemorySessionBackend {
    inner: Mutex<Inner>,
}

impl MemorySessionBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBackend for MemorySessionBackend {
    async fn list(&self) -> Result<Vec<Session>> {
        let inner = self.inner.lock().await;
        let mut sessions: Vec<Session> = inner.rows.values().cloned().collect();
        sessions.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(sessions)
    }

    async fn find(&self, id: i64) -> Result<Option<Session>> {
        Ok(self.inner.lock().await.rows.get(&id).cloned())
    }

    async fn insert(&self, name: &str, variable: &str) -> Result<Session> {
        Ok(self.inner.lock().await.insert(name, variable, Utc::now()))
    }

    async fn update(
        &self,
        id: i64,
        name: &str,
        variable: &str,
        status: SessionStatus,
    ) -> Result<Option<Session>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.rows.get_mut(&id).map(|session| {
            session.name = name.to_string();
            session.variable = variable.to_string();
            session.status = status;
            session.clone()
        }))
    }

    async fn update_status(&self, id: i64, status: SessionStatus) -> Result<Option<Session>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.rows.get_mut(&id).map(|session| {
            session.status = status;
            session.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.inner.lock().await.rows.remove(&id).is_some())
    }

    async fn reset_status(&self, from: SessionStatus, to: SessionStatus) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        let mut affected = 0;
        for session in inner.rows.values_mut().filter(|s| s.status == from) {
            session.status = to;
            affected += 1;
        }
        Ok(affected)
    }
}
