use subtle::ConstantTimeEq;

use crate::config::Config;

/// Compares two secrets without short-circuiting on the first differing byte.
pub fn secrets_match(candidate: &str, expected: &str) -> bool {
    candidate.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Checks a login attempt against the configured dashboard password.
///
/// Always `false` when no password is configured.
pub fn verify_password(config: &Config, candidate: &str) -> bool {
    match &config.app_password {
        Some(expected) => secrets_match(candidate, expected),
        None => {
            tracing::error!("❌ APP_PASSWORD environment variable is not set");
            false
        }
    }
}

/// Checks the `Authorization` header of a cron trigger.
///
/// Without a configured secret every caller is accepted.
pub fn verify_cron_header(config: &Config, authorization: Option<&str>) -> bool {
    match &config.cron_secret {
        Some(secret) => {
            let expected = format!("Bearer {}", secret.as_str());
            authorization.is_some_and(|value| secrets_match(value, &expected))
        }
        None => true,
    }
}
