use rand::RngCore;
use std::sync::Arc;
use zeroize::Zeroizing;

use crate::config::Config;
use crate::error::Result;
use crate::repositories::{
    memory::MemorySessionBackend,
    postgres::PgSessionBackend,
    session::SharedBackend,
};

/// Length in bytes of the token carried by the login cookie.
const AUTH_TOKEN_BYTES: usize = 32;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The session persistence backend.
    pub sessions: SharedBackend,
    /// The application's configuration.
    pub config: Config,
    /// Token issued at login and expected back in the auth cookie.
    pub auth_token: Arc<Zeroizing<String>>,
}

impl AppState {
    /// Creates a new `AppState`, connecting to PostgreSQL when configured.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let sessions: SharedBackend = match &config.database_url {
            Some(url) => {
                let pool = crate::db::create_pool(url)?;
                crate::db::ensure_schema(&pool).await?;
                tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");
                Arc::new(PgSessionBackend::new(pool))
            }
            None => {
                tracing::warn!("⚠️ DATABASE_URL not set, sessions are kept in memory only");
                Arc::new(MemorySessionBackend::new())
            }
        };

        Ok(Self::with_backend(sessions, config.clone()))
    }

    /// Builds state around an existing backend with a fresh login token.
    pub fn with_backend(sessions: SharedBackend, config: Config) -> Self {
        let mut bytes = [0u8; AUTH_TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);

        AppState {
            sessions,
            config,
            auth_token: Arc::new(Zeroizing::new(hex::encode(bytes))),
        }
    }
}
