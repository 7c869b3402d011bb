//! # Service Configuration
//!
//! [`AppConfig`] is read once at startup from environment variables:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PORT` | `8080` |
//! | `DATABASE_URL` | unset: in-memory store |
//! | `VCW_JWT_SECRET` | random per process (dev only) |
//! | `VCW_TOKEN_TTL_SECS` | `86400` (1 to 31536000) |
//! | `VCW_SIGNING_TIMEOUT_MS` | `5000` |
//! | `VCW_STORE_RETRIES` | `1` |
//! | `VCW_ALLOW_ISSUER_SIGNUP` | `false` |
//! | `VCW_DEFAULT_UNIVERSITY` | `Universidade de Aveiro` |
//! | `VCW_CORS_ALLOW_ORIGIN` | unset: permissive |
//! | `VCW_LOG_FORMAT` | `text` (`json` for structured output) |

use std::time::Duration;

use rand_core::{OsRng, RngCore};
use thiserror::Error;
use vcw_lifecycle::{LifecycleConfig, DEFAULT_UNIVERSITY};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// HMAC secret used to sign session tokens.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct JwtSecret(Vec<u8>);

impl JwtSecret {
    /// Wrap raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// 32 random bytes from the OS.
    pub fn random() -> Self {
        let mut bytes = vec![0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// The secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtSecret([REDACTED])")
    }
}

/// A variable was present but unusable.
#[derive(Error, Debug)]
#[error("invalid value for {var}: {reason}")]
pub struct ConfigError {
    /// Offending variable.
    pub var: &'static str,
    /// Why it was rejected.
    pub reason: String,
}

/// Application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// PostgreSQL connection string. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    /// Token signing secret.
    pub jwt_secret: JwtSecret,
    /// Lifetime of issued session tokens.
    pub token_ttl: Duration,
    /// Upper bound on one signing-service call.
    pub signing_timeout: Duration,
    /// Re-sign-and-persist attempts after a transient store failure.
    pub store_retries: u32,
    /// Whether anonymous callers may register issuer accounts.
    pub allow_issuer_signup: bool,
    /// University recorded when an issuance request names none.
    pub default_university: String,
    /// Single allowed CORS origin. `None` allows any origin.
    pub cors_allow_origin: Option<String>,
    /// Emit JSON log lines instead of human-readable text.
    pub log_json: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("jwt_secret", &self.jwt_secret)
            .field("token_ttl", &self.token_ttl)
            .field("signing_timeout", &self.signing_timeout)
            .field("store_retries", &self.store_retries)
            .field("allow_issuer_signup", &self.allow_issuer_signup)
            .field("default_university", &self.default_university)
            .field("cors_allow_origin", &self.cors_allow_origin)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let lifecycle = LifecycleConfig::default();
        Self {
            port: 8080,
            database_url: None,
            jwt_secret: JwtSecret::random(),
            token_ttl: Duration::from_secs(86_400),
            signing_timeout: lifecycle.signing_timeout,
            store_retries: lifecycle.store_retries,
            allow_issuer_signup: false,
            default_university: DEFAULT_UNIVERSITY.to_string(),
            cors_allow_origin: None,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let jwt_secret = match get("VCW_JWT_SECRET") {
            Some(secret) => JwtSecret::new(secret.into_bytes()),
            None => {
                tracing::warn!(
                    "VCW_JWT_SECRET not set; using a random per-process secret. \
                     Tokens will not survive restarts."
                );
                defaults.jwt_secret.clone()
            }
        };

        Ok(Self {
            port: parse_or("PORT", get("PORT"), defaults.port)?,
            database_url: get("DATABASE_URL"),
            jwt_secret,
            token_ttl: Duration::from_secs(token_ttl_secs(
                get("VCW_TOKEN_TTL_SECS"),
                defaults.token_ttl.as_secs(),
            )?),
            signing_timeout: Duration::from_millis(parse_or(
                "VCW_SIGNING_TIMEOUT_MS",
                get("VCW_SIGNING_TIMEOUT_MS"),
                defaults.signing_timeout.as_millis() as u64,
            )?),
            store_retries: parse_or(
                "VCW_STORE_RETRIES",
                get("VCW_STORE_RETRIES"),
                defaults.store_retries,
            )?,
            allow_issuer_signup: parse_flag(
                "VCW_ALLOW_ISSUER_SIGNUP",
                get("VCW_ALLOW_ISSUER_SIGNUP"),
            )?,
            default_university: get("VCW_DEFAULT_UNIVERSITY")
                .map(|u| u.trim().to_string())
                .unwrap_or(defaults.default_university.clone()),
            cors_allow_origin: get("VCW_CORS_ALLOW_ORIGIN"),
            log_json: get("VCW_LOG_FORMAT")
                .map(|f| f.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// The subset handed to the lifecycle core.
    pub fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig {
            signing_timeout: self.signing_timeout,
            store_retries: self.store_retries,
            default_university: self.default_university.clone(),
        }
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            var,
            reason: format!("'{raw}': {e}"),
        }),
    }
}

/// Longest accepted session token lifetime: one year.
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

fn token_ttl_secs(raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let secs = parse_or("VCW_TOKEN_TTL_SECS", raw, default)?;
    if secs == 0 || secs > MAX_TOKEN_TTL_SECS {
        return Err(ConfigError {
            var: "VCW_TOKEN_TTL_SECS",
            reason: format!("{secs} is outside 1..={MAX_TOKEN_TTL_SECS}"),
        });
    }
    Ok(secs)
}

fn parse_flag(var: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError {
                var,
                reason: format!("'{v}' is not a boolean"),
            }),
        },
    }
}
