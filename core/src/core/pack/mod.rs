//! A named batch of codes backed by its own key store.

use crate::core::key_store::{KeyStore, Redemption};
use crate::error::{CdkeyError, Result};
use crate::keygen::{self, KeygenError};
use crate::types::config::layout;
use crate::types::{Code, Config, KeyRecord, NewPack, PackInfo, PackStatus, normalize};
use chrono::Utc;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Characters a pack name may not contain.
pub const RESERVED_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '_'];

#[derive(Debug, Error)]
pub enum PackInfoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<KeygenError> for CdkeyError {
    fn from(err: KeygenError) -> Self {
        match err {
            KeygenError::InvalidPrefix { prefix } => CdkeyError::InvalidPrefix { prefix },
            KeygenError::KeylenTooShort {
                key_len,
                suffix_len,
                size,
            } => CdkeyError::KeylenTooShort {
                key_len,
                suffix_len,
                size,
            },
            err @ (KeygenError::PrefixTooLong { .. } | KeygenError::EmptyBatch) => {
                CdkeyError::InvalidConfiguration(err.to_string())
            }
            err @ (KeygenError::InvalidCode(_) | KeygenError::DrawLimitExceeded { .. }) => {
                CdkeyError::Internal(err.to_string())
            }
        }
    }
}

/// Returns `true` if `name` can be used as a pack directory name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(RESERVED_NAME_CHARS)
        && !name.chars().any(char::is_control)
}

/// One pack: metadata plus the key store holding its codes.
///
/// `info` and `store` sit behind separate locks. Redemption holds the store
/// lock for reading (so `close` waits for it) and reads `info` only to check
/// the status.
#[derive(Debug)]
pub struct Pack {
    name: String,
    path: PathBuf,
    info: RwLock<PackInfo>,
    /// `None` once the pack is closed.
    store: RwLock<Option<KeyStore>>,
}

impl Pack {
    /// Generates the codes for a new pack and stores them in its directory
    /// under the configured root.
    ///
    /// Nothing is left on disk if any step fails.
    pub fn create(config: &Config, req: &NewPack) -> Result<Self> {
        let name = req.name.as_str();
        if !is_valid_name(name) {
            error!(pack = %name, "invalid pack name");
            return Err(CdkeyError::InvalidPackName {
                name: name.to_string(),
            });
        }

        let prefix = normalize(&req.prefix).ok_or_else(|| {
            error!(pack = %name, prefix = %req.prefix, "invalid pack prefix");
            CdkeyError::InvalidPrefix {
                prefix: req.prefix.clone(),
            }
        })?;

        info!(pack = %name, %prefix, key_len = req.key_len, size = req.pack_size, "generating keys");
        let codes = keygen::generate_batch(&prefix, req.key_len, req.pack_size).map_err(|err| {
            error!(pack = %name, %err, "key generation failed");
            CdkeyError::from(err)
        })?;
        debug!(pack = %name, count = codes.len(), "keys generated");

        let info = PackInfo {
            name: name.to_string(),
            prefix,
            key_len: req.key_len,
            pack_size: req.pack_size,
            status: PackStatus::Initial,
            note: req.note.clone(),
            create_time: Utc::now(),
        };

        let path = config.pack_path(name);
        info!(pack = %name, path = %path.display(), "creating key store");
        if let Err(err) = fs::create_dir(&path) {
            error!(pack = %name, %err, "failed to create pack directory");
            return Err(CdkeyError::CreateDbFailed(err.into()));
        }

        Self::populate(path, info, &codes)
    }

    /// Fills the freshly created directory `path`. On failure the store is
    /// closed and `path` removed.
    fn populate(path: PathBuf, info: PackInfo, codes: &[Code]) -> Result<Self> {
        let name = info.name.clone();

        let store = match KeyStore::create(&path) {
            Ok(store) => store,
            Err(err) => {
                error!(pack = %name, %err, "failed to create key store");
                remove_dir_logged(&path);
                return Err(CdkeyError::CreateDbFailed(err));
            }
        };

        if let Err(err) = store.write_batch(codes) {
            error!(pack = %name, %err, "failed to save keys");
            drop(store);
            remove_dir_logged(&path);
            return Err(CdkeyError::SaveKeysFailed(err));
        }
        info!(pack = %name, count = codes.len(), "keys written");

        if let Err(err) = save_info(&path, &info) {
            error!(pack = %name, %err, "failed to save pack info");
            drop(store);
            remove_dir_logged(&path);
            return Err(CdkeyError::SavePackInfoFailed(err));
        }

        Ok(Self {
            name,
            path,
            info: RwLock::new(info),
            store: RwLock::new(Some(store)),
        })
    }

    /// Opens the pack stored in `path`. Codes are not read until requested.
    pub fn load(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "loading pack");

        let info = load_info(path).map_err(|err| {
            error!(path = %path.display(), %err, "failed to load pack info");
            CdkeyError::LoadPackInfoFailed(err)
        })?;

        let store = KeyStore::open(path).map_err(|err| {
            error!(path = %path.display(), %err, "failed to open key store");
            CdkeyError::LoadDbFailed(err)
        })?;

        match store.len() {
            Ok(count) => info!(pack = %info.name, count, "pack loaded"),
            Err(err) => warn!(pack = %info.name, %err, "pack loaded, key count unavailable"),
        }
        Ok(Self {
            name: info.name.clone(),
            path: path.to_path_buf(),
            info: RwLock::new(info),
            store: RwLock::new(Some(store)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding the pack's metadata and key store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a snapshot of the pack metadata.
    pub fn info(&self) -> PackInfo {
        self.info.read().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.store.read().is_none()
    }
}

/// Status changes.
impl Pack {
    /// Allows redemptions.
    ///
    /// The in-memory status changes even if persisting it fails.
    pub fn enable(&self) -> Result<()> {
        self.set_status(PackStatus::Ready)
    }

    /// Stops redemptions, recording `reason`.
    pub fn disable(&self, reason: &str) -> Result<()> {
        self.set_status(PackStatus::disabled(reason))
    }

    fn set_status(&self, status: PackStatus) -> Result<()> {
        // Same lock order as `use_key`: store first, then info.
        let store = self.store.read();
        if store.is_none() {
            return Err(CdkeyError::PackClosing);
        }

        let mut info = self.info.write();
        info!(pack = %self.name, %status, "changing pack status");
        info.status = status;
        save_info(&self.path, &info).map_err(|err| {
            error!(pack = %self.name, %err, "failed to save pack info");
            CdkeyError::SavePackInfoFailed(err)
        })
    }
}

/// Key operations.
impl Pack {
    /// Lists every code with its status, in code order.
    pub fn list_keys(&self) -> Result<Vec<KeyRecord>> {
        let store = self.store.read();
        let store = store.as_ref().ok_or(CdkeyError::PackClosing)?;

        let records = store.records().map_err(|err| {
            error!(pack = %self.name, %err, "failed to load keys");
            CdkeyError::LoadKeysFailed(err)
        })?;

        info!(pack = %self.name, count = records.len(), "list keys");
        Ok(records)
    }

    /// Redeems `input` after normalizing it.
    ///
    /// A pack that is not ready rejects every input without looking it up.
    pub fn use_key(&self, input: &str) -> Result<()> {
        let store = self.store.read();
        let store = store.as_ref().ok_or(CdkeyError::PackClosing)?;

        let info = self.info.read();
        if !info.status.is_ready() {
            info!(pack = %self.name, status = %info.status, "pack is disabled");
            return Err(CdkeyError::PackDisabled {
                name: self.name.clone(),
                reason: info.status.to_string(),
            });
        }

        // Input outside the alphabet cannot match any stored code.
        let Ok(code) = Code::try_new(input.to_string()) else {
            info!(pack = %self.name, key = %input, "key not found");
            return Err(CdkeyError::KeyNotFound {
                key: input.to_string(),
            });
        };

        match store.redeem(&code) {
            Ok(Redemption::Redeemed) => {
                info!(pack = %self.name, key = %code, "key used");
                Ok(())
            }
            Ok(Redemption::AlreadyUsed) => {
                info!(pack = %self.name, key = %code, "key already used");
                Err(CdkeyError::KeyUsed {
                    key: code.into_inner(),
                })
            }
            Ok(Redemption::NotFound) => {
                info!(pack = %self.name, key = %code, "key not found");
                Err(CdkeyError::KeyNotFound {
                    key: code.into_inner(),
                })
            }
            Err(err) => {
                error!(pack = %self.name, key = %code, %err, "failed to redeem key");
                Err(CdkeyError::SaveKeysFailed(err))
            }
        }
    }

    /// Releases the key store. Waits for in-flight key operations; later ones
    /// fail with [`CdkeyError::PackClosing`]. Closing twice is a no-op.
    pub fn close(&self) {
        let mut store = self.store.write();
        if store.take().is_some() {
            info!(pack = %self.name, "pack closed");
        } else {
            debug!(pack = %self.name, "pack already closed");
        }
    }
}

fn load_info(dir: &Path) -> std::result::Result<PackInfo, PackInfoError> {
    let bytes = fs::read(layout::pack_info_path(dir))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Writes `pack.json` through a temporary file so a crash never leaves it
/// half written.
fn save_info(dir: &Path, info: &PackInfo) -> std::result::Result<(), PackInfoError> {
    let json = serde_json::to_vec_pretty(info)?;
    let path = layout::pack_info_path(dir);
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, &path)?;
    debug!(path = %path.display(), "pack info saved");
    Ok(())
}

/// Best-effort rollback: the error that triggered it takes precedence.
pub(crate) fn remove_dir_logged(path: &Path) {
    if let Err(err) = fs::remove_dir_all(path) {
        warn!(path = %path.display(), %err, "failed to remove pack directory");
    }
}
