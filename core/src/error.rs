//! Typed errors surfaced by registry and pack operations.
//!
//! Every [`CdkeyError`] maps to a stable numeric code and an HTTP-like status
//! so a front end can render it without knowing how it was produced.

use crate::core::key_store::error::KeyStoreError;
use crate::core::pack::PackInfoError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CdkeyError>;

/// Broad classes of failure, used to decide whether a caller may retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed caller input.
    Validation,
    NotFound,
    /// Business-rule rejection. Permanent for the same input.
    Conflict,
    /// Storage or file-system failure.
    Infrastructure,
    /// The pack is shutting down.
    Lifecycle,
    Internal,
}

#[derive(Debug, Error)]
pub enum CdkeyError {
    #[error("bad request, {0}")]
    BadRequest(String),

    #[error("pack not found, name:{name}")]
    PackNotFound { name: String },

    #[error("pack already exists, name:{name}")]
    PackAlreadyExists { name: String },

    #[error("pack is disabled, msg:{reason}")]
    PackDisabled { name: String, reason: String },

    #[error("key not found, key:{key}")]
    KeyNotFound { key: String },

    #[error("key already used, key:{key}")]
    KeyUsed { key: String },

    #[error("invalid pack name, name:{name}")]
    InvalidPackName { name: String },

    #[error("invalid prefix, accept base32 only, prefix:{prefix}")]
    InvalidPrefix { prefix: String },

    #[error(
        "keylen too short, unable to generate, keylen:{key_len}, rndLen:{suffix_len}, size:{size}"
    )]
    KeylenTooShort {
        key_len: usize,
        suffix_len: usize,
        size: usize,
    },

    #[error("invalid configuration, {0}")]
    InvalidConfiguration(String),

    #[error("failed create db on file system, {0}")]
    CreateDbFailed(#[source] KeyStoreError),

    #[error("failed load db from file system, {0}")]
    LoadDbFailed(#[source] KeyStoreError),

    #[error("failed load keys from db, {0}")]
    LoadKeysFailed(#[source] KeyStoreError),

    #[error("failed save keys to db, {0}")]
    SaveKeysFailed(#[source] KeyStoreError),

    #[error("failed load pack info, {0}")]
    LoadPackInfoFailed(#[source] PackInfoError),

    #[error("failed save pack info, {0}")]
    SavePackInfoFailed(#[source] PackInfoError),

    #[error("root directory unavailable, path:{}, {reason}", .path.display())]
    RootDirUnavailable { path: PathBuf, reason: String },

    #[error("internal error, {0}")]
    Internal(String),

    #[error("pack is closing")]
    PackClosing,
}

impl CdkeyError {
    /// Stable numeric code.
    pub fn code(&self) -> u16 {
        match self {
            CdkeyError::BadRequest(_) => 1001,
            CdkeyError::PackNotFound { .. } => 1002,
            CdkeyError::PackAlreadyExists { .. } => 1003,
            CdkeyError::PackDisabled { .. } => 1004,
            CdkeyError::KeyNotFound { .. } => 1005,
            CdkeyError::KeyUsed { .. } => 1006,
            CdkeyError::InvalidPackName { .. } => 1007,
            CdkeyError::InvalidPrefix { .. } => 1008,
            CdkeyError::KeylenTooShort { .. } => 1009,
            CdkeyError::InvalidConfiguration(_) => 1010,
            CdkeyError::CreateDbFailed(_) => 2001,
            CdkeyError::LoadDbFailed(_) => 2002,
            CdkeyError::LoadKeysFailed(_) => 2003,
            CdkeyError::SaveKeysFailed(_) => 2004,
            CdkeyError::LoadPackInfoFailed(_) => 2005,
            CdkeyError::SavePackInfoFailed(_) => 2006,
            CdkeyError::RootDirUnavailable { .. } => 2007,
            CdkeyError::Internal(_) => 3001,
            CdkeyError::PackClosing => 3002,
        }
    }

    /// HTTP status class a transport should answer with.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation if matches!(self, CdkeyError::BadRequest(_)) => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Validation | ErrorKind::Conflict => 406,
            ErrorKind::Infrastructure | ErrorKind::Lifecycle => 503,
            ErrorKind::Internal => 500,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CdkeyError::BadRequest(_)
            | CdkeyError::InvalidPackName { .. }
            | CdkeyError::InvalidPrefix { .. }
            | CdkeyError::KeylenTooShort { .. }
            | CdkeyError::InvalidConfiguration(_) => ErrorKind::Validation,
            CdkeyError::PackNotFound { .. } | CdkeyError::KeyNotFound { .. } => {
                ErrorKind::NotFound
            }
            CdkeyError::PackAlreadyExists { .. }
            | CdkeyError::PackDisabled { .. }
            | CdkeyError::KeyUsed { .. } => ErrorKind::Conflict,
            CdkeyError::CreateDbFailed(_)
            | CdkeyError::LoadDbFailed(_)
            | CdkeyError::LoadKeysFailed(_)
            | CdkeyError::SaveKeysFailed(_)
            | CdkeyError::LoadPackInfoFailed(_)
            | CdkeyError::SavePackInfoFailed(_)
            | CdkeyError::RootDirUnavailable { .. } => ErrorKind::Infrastructure,
            CdkeyError::PackClosing => ErrorKind::Lifecycle,
            CdkeyError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Renders the JSON error envelope for the command `cmd`.
    pub fn to_body(&self, cmd: &str) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            msg: self.to_string(),
            cmd: cmd.to_string(),
        }
    }
}

/// Wire form of an error: `{"code": .., "msg": .., "cmd": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub msg: String,
    pub cmd: String,
}
