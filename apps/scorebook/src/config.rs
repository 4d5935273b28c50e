//! # Server Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults ([`ServerConfig::default`])
//! 2. An optional TOML file (`--config scorebook.toml`)
//! 3. Environment variables
//! 4. Command-line flags (`--database`, `--host`, `--port`)
//!
//! ## Environment Variables
//!
//! - `SCOREBOOK_HOST`, `SCOREBOOK_PORT`: bind address
//! - `SCOREBOOK_DATABASE`: path of the redb file
//! - `SCOREBOOK_CORS_ORIGINS`: comma-separated origins, or `*` for all
//! - `SCOREBOOK_RATE_LIMIT`: requests per second (`0` disables)
//! - `SCOREBOOK_ACCESS_POLICY`: `strict` or `legacy`
//! - `SCOREBOOK_SESSION_TTL_SECS`: login token lifetime
//! - `SCOREBOOK_COOKIE_SECURE`: add `Secure` to the login cookie

use scorebook_core::ScorebookError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default login lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default rate limit in requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

// =============================================================================
// ACCESS POLICY
// =============================================================================

/// Which mutating endpoints require an admin login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessPolicy {
    /// Every create, update and delete requires an admin.
    #[default]
    Strict,
    /// Session and class writes, student deletes and subject creation are
    /// open to anonymous callers, as older deployments allowed.
    Legacy,
}

impl FromStr for AccessPolicy {
    type Err = ScorebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "legacy" => Ok(Self::Legacy),
            other => Err(ScorebookError::invalid(
                "access_policy",
                format!("Unknown access policy '{}' (expected strict or legacy)", other),
            )),
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

// =============================================================================
// SERVER CONFIG
// =============================================================================

/// Runtime configuration for the server and CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    /// `None` means localhost only.
    pub cors_origins: Option<String>,
    pub rate_limit: u32,
    pub access_policy: AccessPolicy,
    pub session_ttl_secs: u64,
    pub cookie_secure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: PathBuf::from("scorebook.db"),
            cors_origins: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            access_policy: AccessPolicy::Strict,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            cookie_secure: false,
        }
    }
}

fn config_err(message: String) -> ScorebookError {
    ScorebookError::invalid("config", message)
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T, ScorebookError> {
    raw.trim()
        .parse()
        .map_err(|_| config_err(format!("{} has an invalid value: '{}'", name, raw)))
}

impl ServerConfig {
    /// Defaults, then the TOML file at `path` (if any), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ScorebookError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    config_err(format!("Cannot read config '{}': {}", path.display(), e))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ScorebookError> {
        toml::from_str(text).map_err(|e| config_err(format!("Invalid config file: {}", e)))
    }

    /// Apply `SCOREBOOK_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ScorebookError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SCOREBOOK_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("SCOREBOOK_PORT") {
            self.port = parse_var("SCOREBOOK_PORT", &port)?;
        }
        if let Some(database) = lookup("SCOREBOOK_DATABASE") {
            self.database = PathBuf::from(database);
        }
        if let Some(origins) = lookup("SCOREBOOK_CORS_ORIGINS") {
            self.cors_origins = Some(origins);
        }
        if let Some(rate) = lookup("SCOREBOOK_RATE_LIMIT") {
            self.rate_limit = parse_var("SCOREBOOK_RATE_LIMIT", &rate)?;
        }
        if let Some(policy) = lookup("SCOREBOOK_ACCESS_POLICY") {
            self.access_policy = policy.parse()?;
        }
        if let Some(ttl) = lookup("SCOREBOOK_SESSION_TTL_SECS") {
            self.session_ttl_secs = parse_var("SCOREBOOK_SESSION_TTL_SECS", &ttl)?;
        }
        if let Some(secure) = lookup("SCOREBOOK_COOKIE_SECURE") {
            self.cookie_secure = parse_var("SCOREBOOK_COOKIE_SECURE", &secure)?;
        }
        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================
