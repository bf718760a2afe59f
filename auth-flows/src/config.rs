use secrecy::SecretString;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value {value:?} for {name}")]
    InvalidVar { name: &'static str, value: String },
}

/// Startup configuration for the auth workflows. Built once from the
/// environment and passed by reference into each component; there is no
/// ambient global. Both signing secrets are mandatory — a missing secret
/// fails construction, it never becomes a per-request error.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub access_secret: SecretString,
    pub refresh_secret: SecretString,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
    pub bcrypt_cost: u32,
    pub otp_digits: u32,
    pub otp_ttl_minutes: i64,
    pub password_min_length: usize,
    pub password_require_uppercase: bool,
    pub password_require_digit: bool,
    pub password_require_special: bool,
    pub txn_timeout: Duration,
}

impl AuthConfig {
    /// Loads configuration from the environment, honoring a `.env` file
    /// when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            access_secret: SecretString::new(require("JWT_ACCESS_SECRET")?),
            refresh_secret: SecretString::new(require("JWT_REFRESH_SECRET")?),
            access_ttl_minutes: parse_or("JWT_ACCESS_TTL_MINUTES", 15)?,
            refresh_ttl_days: parse_or("JWT_REFRESH_TTL_DAYS", 30)?,
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            otp_digits: parse_or("OTP_DIGITS", 6)?,
            otp_ttl_minutes: parse_or("OTP_TTL_MINUTES", 10)?,
            password_min_length: parse_or("PASSWORD_MIN_LENGTH", 8)?,
            password_require_uppercase: parse_or("PASSWORD_REQUIRE_UPPERCASE", true)?,
            password_require_digit: parse_or("PASSWORD_REQUIRE_DIGIT", true)?,
            password_require_special: parse_or("PASSWORD_REQUIRE_SPECIAL", true)?,
            txn_timeout: Duration::from_secs(parse_or("AUTH_TXN_TIMEOUT_SECS", 10)?),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_requires_both_secrets() {
        temp_env::with_vars(
            [
                ("JWT_ACCESS_SECRET", Some("access")),
                ("JWT_REFRESH_SECRET", None::<&str>),
            ],
            || {
                let err = AuthConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::MissingVar("JWT_REFRESH_SECRET")));
            },
        );
    }

    #[test]
    fn from_env_applies_defaults() {
        temp_env::with_vars(
            [
                ("JWT_ACCESS_SECRET", Some("access")),
                ("JWT_REFRESH_SECRET", Some("refresh")),
            ],
            || {
                let config = AuthConfig::from_env().unwrap();
                assert_eq!(config.access_ttl_minutes, 15);
                assert_eq!(config.refresh_ttl_days, 30);
                assert_eq!(config.otp_digits, 6);
                assert_eq!(config.otp_ttl_minutes, 10);
                assert_eq!(config.txn_timeout, Duration::from_secs(10));
            },
        );
    }

    #[test]
    fn from_env_rejects_garbage_numbers() {
        temp_env::with_vars(
            [
                ("JWT_ACCESS_SECRET", Some("access")),
                ("JWT_REFRESH_SECRET", Some("refresh")),
                ("JWT_ACCESS_TTL_MINUTES", Some("soon")),
            ],
            || {
                let err = AuthConfig::from_env().unwrap_err();
                assert!(matches!(
                    err,
                    ConfigError::InvalidVar {
                        name: "JWT_ACCESS_TTL_MINUTES",
                        ..
                    }
                ));
            },
        );
    }
}
