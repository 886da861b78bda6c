//! Startup configuration from the environment.
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `CODEHUNT_TRANSPORT_TOKEN` | required | credential gateway clients must present |
//! | `CODEHUNT_STORAGE_URL` | `memory://` | `memory://` or `file://<path>` |
//! | `CODEHUNT_BIND` | `127.0.0.1:8080` | gateway listen address |
//! | `CODEHUNT_ADMIN_IDS` | empty | comma-separated actor ids |
//! | `CODEHUNT_CODE_LENGTH` | `4` | characters per secret code, 1 to 16 |
//!
//! Anything missing or malformed is fatal: the process should not come up
//! half configured.

use std::collections::BTreeSet;
use std::path::PathBuf;

use codehunt_engine::{EngineConfig, DEFAULT_CODE_LENGTH};
use codehunt_protocol::ActorId;

pub const TRANSPORT_TOKEN_VAR: &str = "CODEHUNT_TRANSPORT_TOKEN";
pub const STORAGE_URL_VAR: &str = "CODEHUNT_STORAGE_URL";
pub const BIND_VAR: &str = "CODEHUNT_BIND";
pub const ADMIN_IDS_VAR: &str = "CODEHUNT_ADMIN_IDS";
pub const CODE_LENGTH_VAR: &str = "CODEHUNT_CODE_LENGTH";

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const MAX_CODE_LENGTH: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("CODEHUNT_TRANSPORT_TOKEN is not set")]
    MissingCredential,

    #[error("unsupported storage url {0:?} (expected memory:// or file://<path>)")]
    UnsupportedStorage(String),

    #[error("invalid admin id {0:?} in CODEHUNT_ADMIN_IDS")]
    InvalidAdminId(String),

    #[error("invalid CODEHUNT_CODE_LENGTH {0:?} (expected 1 to 16)")]
    InvalidCodeLength(String),
}

/// Where game records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// In process only; gone on restart.
    Memory,
    /// In process, snapshotted to a JSON file.
    File(PathBuf),
}

impl Storage {
    pub fn parse(url: &str) -> Result<Self, SettingsError> {
        let url = url.trim();
        if url == "memory://" || url == "memory" {
            return Ok(Self::Memory);
        }
        match url.strip_prefix("file://") {
            Some(path) if !path.is_empty() => Ok(Self::File(PathBuf::from(path))),
            _ => Err(SettingsError::UnsupportedStorage(url.to_owned())),
        }
    }
}

/// Typed startup configuration. `Debug` redacts the transport token.
#[derive(Clone)]
pub struct Settings {
    pub transport_token: String,
    pub storage: Storage,
    pub bind: String,
    pub admin_ids: BTreeSet<ActorId>,
    pub code_length: usize,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("transport_token", &"<redacted>")
            .field("storage", &self.storage)
            .field("bind", &self.bind)
            .field("admin_ids", &self.admin_ids)
            .field("code_length", &self.code_length)
            .finish()
    }
}

impl Settings {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let transport_token = get(TRANSPORT_TOKEN_VAR).ok_or(SettingsError::MissingCredential)?;

        let storage = match get(STORAGE_URL_VAR) {
            Some(url) => Storage::parse(&url)?,
            None => Storage::Memory,
        };

        let bind = get(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_owned());

        let admin_ids = match get(ADMIN_IDS_VAR) {
            Some(raw) => parse_admin_ids(&raw)?,
            None => BTreeSet::new(),
        };

        let code_length = match get(CODE_LENGTH_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_CODE_LENGTH).contains(n))
                .ok_or(SettingsError::InvalidCodeLength(raw))?,
            None => DEFAULT_CODE_LENGTH,
        };

        Ok(Self {
            transport_token,
            storage,
            bind,
            admin_ids,
            code_length,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.admin_ids.iter().copied()).with_code_length(self.code_length)
    }
}

/// `"1, 2,3"` → {1, 2, 3}. Blank entries (a trailing comma) are skipped.
fn parse_admin_ids(raw: &str) -> Result<BTreeSet<ActorId>, SettingsError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map(ActorId)
                .map_err(|_| SettingsError::InvalidAdminId(s.to_owned()))
        })
        .collect()
}
