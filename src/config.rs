use std::{env, net::SocketAddr, time::Duration};
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database. `None` keeps sessions in memory.
    pub database_url: Option<String>,
    /// The shared dashboard password.
    pub app_password: Option<Zeroizing<String>>,
    /// The bearer secret expected by the cron endpoint.
    pub cron_secret: Option<Zeroizing<String>>,
    /// Where the HTTP server listens.
    pub bind_addr: SocketAddr,
    /// Lifetime of the login cookie in seconds.
    pub session_max_age_secs: i64,
    /// Interval of the in-process reset job. `None` disables it.
    pub reset_interval: Option<Duration>,
    /// Whether cookies carry the `Secure` flag.
    pub is_production: bool,
}

const SECONDS_PER_DAY: i64 = 86_400;

/// Converts a cookie lifetime in days to seconds. `None` on overflow.
fn days_to_secs(days: i64) -> Option<i64> {
    days.checked_mul(SECONDS_PER_DAY)
}

/// Reads an optional variable, treating an empty value as unset.
fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let reset_interval_secs: u64 = env::var("RESET_INTERVAL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .context("Invalid RESET_INTERVAL_SECS")?;

        let session_duration_days: i64 = env::var("SESSION_DURATION_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .context("Invalid SESSION_DURATION_DAYS")?;
        let session_max_age_secs = days_to_secs(session_duration_days)
            .context("SESSION_DURATION_DAYS is too large")?;

        Ok(Self {
            database_url: optional_var("DATABASE_URL"),
            app_password: optional_var("APP_PASSWORD").map(Zeroizing::new),
            cron_secret: optional_var("CRON_SECRET").map(Zeroizing::new),
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            session_max_age_secs,
            reset_interval: (reset_interval_secs > 0)
                .then(|| Duration::from_secs(reset_interval_secs)),
            is_production: env::var("APP_ENV")
                .unwrap_or_else(|_| "development".to_string()) == "production",
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            app_password: None,
            cron_secret: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            session_max_age_secs: 7 * SECONDS_PER_DAY,
            reset_interval: Some(Duration::from_secs(86400)),
            is_production: false,
        }
    }
}
