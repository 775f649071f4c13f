//! Session configuration from environment variables.
//!
//! Reads `SESSION_SECRET` (required) and `SESSION_TTL_DAYS` (optional, default 7).

use crate::errors::{Error, Result};

const DEFAULT_TTL_DAYS: i64 = 7;

/// Settings for signing session tokens
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC key material
    pub secret: String,
    /// Token lifetime in days
    pub ttl_days: i64,
}

impl SessionConfig {
    /// Loads the session settings from the environment.
    ///
    /// # Errors
    /// Returns an error if `SESSION_SECRET` is unset or empty, or if
    /// `SESSION_TTL_DAYS` is not a positive integer.
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("SESSION_SECRET").map_err(|e| Error::Config {
            message: format!("SESSION_SECRET not available: {e}"),
        })?;
        let ttl = std::env::var("SESSION_TTL_DAYS").ok();
        Self::from_parts(secret, ttl.as_deref())
    }

    fn from_parts(secret: String, ttl: Option<&str>) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(Error::Config {
                message: "SESSION_SECRET cannot be empty".to_string(),
            });
        }

        let ttl_days = match ttl {
            None => DEFAULT_TTL_DAYS,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(days) if days > 0 => days,
                _ => {
                    return Err(Error::Config {
                        message: format!("SESSION_TTL_DAYS must be a positive integer, got '{raw}'"),
                    });
                }
            },
        };

        Ok(Self { secret, ttl_days })
    }
}
