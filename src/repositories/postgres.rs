use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use crate::{
    error::{AppError, Result},
    models::session::{Session, SessionStatus},
    repositories::session::SessionBackend,
};

const SESSION_COLUMNS: &str = "id, name, variable, status, created_at";

/// A helper function to map a `tokio_postgres::Row` to a `Session`.
fn row_to_session(row: &Row) -> Result<Session> {
    let status: String = row
        .try_get("status")
        .map_err(|_| AppError::MissingData("status".to_string()))?;
    let status = status
        .parse::<SessionStatus>()
        .map_err(|_| AppError::MissingData(format!("unknown status label {:?}", status)))?;

    Ok(Session {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        name: row.try_get("name").map_err(|_| AppError::MissingData("name".to_string()))?,
        variable: row.try_get("variable").map_err(|_| AppError::MissingData("variable".to_string()))?,
        status,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}

/// Session storage backed by the `sessions` table.
#[derive(Clone)]
pub struct PgSessionBackend {
    pool: Pool,
}

impl PgSessionBackend {
    /// Wraps an existing connection pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionBackend for PgSessionBackend {
    async fn list(&self) -> Result<Vec<Session>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!(
                "SELECT {} FROM sessions ORDER BY created_at DESC, id DESC",
                SESSION_COLUMNS
            ))
            .await?;
        let rows = client.query(&statement, &[]).await?;
        rows.iter().map(row_to_session).collect()
    }

    async fn find(&self, id: i64) -> Result<Option<Session>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!(
                "SELECT {} FROM sessions WHERE id = $1",
                SESSION_COLUMNS
            ))
            .await?;
        let row = client.query_opt(&statement, &[&id]).await?;
        row.map(|r| row_to_session(&r)).transpose()
    }

    async fn insert(&self, name: &str, variable: &str) -> Result<Session> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!(
                r#"
                INSERT INTO sessions (name, variable, status)
                VALUES ($1, $2, $3)
                RETURNING {}
                "#,
                SESSION_COLUMNS
            ))
            .await?;
        let row = client
            .query_one(
                &statement,
                &[&name, &variable, &SessionStatus::Available.as_str()],
            )
            .await?;
        row_to_session(&row)
    }

    async fn update(
        &self,
        id: i64,
        name: &str,
        variable: &str,
        status: SessionStatus,
    ) -> Result<Option<Session>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!(
                r#"
                UPDATE sessions
                SET name = $1, variable = $2, status = $3
                WHERE id = $4
                RETURNING {}
                "#,
                SESSION_COLUMNS
            ))
            .await?;
        let row = client
            .query_opt(&statement, &[&name, &variable, &status.as_str(), &id])
            .await?;
        row.map(|r| row_to_session(&r)).transpose()
    }

    async fn update_status(&self, id: i64, status: SessionStatus) -> Result<Option<Session>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!(
                "UPDATE sessions SET status = $1 WHERE id = $2 RETURNING {}",
                SESSION_COLUMNS
            ))
            .await?;
        let row = client.query_opt(&statement, &[&status.as_str(), &id]).await?;
        row.map(|r| row_to_session(&r)).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("DELETE FROM sessions WHERE id = $1")
            .await?;
        let affected = client.execute(&statement, &[&id]).await?;
        Ok(affected > 0)
    }

    async fn reset_status(&self, from: SessionStatus, to: SessionStatus) -> Result<u64> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("UPDATE sessions SET status = $1 WHERE status = $2")
            .await?;
        let affected = client
            .execute(&statement, &[&to.as_str(), &from.as_str()])
            .await?;
        Ok(affected)
    }
}
