//! Registry of every pack under one root directory.

use crate::error::{CdkeyError, Result};
use crate::types::config::layout;
use crate::types::{Config, KeyRecord, NewPack, PackInfo};
use pack::{Pack, remove_dir_logged};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{Dispatch, error, info, warn};

pub mod key_store;
pub mod pack;

/// Owns every open pack for a root directory.
///
/// Adding or removing a pack takes the map lock exclusively; all other
/// operations share it, so work on different packs runs in parallel.
pub struct Registry {
    config: Config,
    packs: RwLock<HashMap<String, Pack>>,
    dispatch: Dispatch,
}

impl Registry {
    /// Opens the registry, logging through the caller's current default
    /// subscriber.
    pub fn open(config: Config) -> Result<Self> {
        let dispatch = tracing::dispatcher::get_default(Dispatch::clone);
        Self::open_with_dispatch(config, dispatch)
    }

    /// Opens the registry, logging every operation through `dispatch`.
    ///
    /// Creates the root directory if it is missing and loads every
    /// subdirectory holding a `pack.json`. Packs that fail to load are skipped.
    pub fn open_with_dispatch(config: Config, dispatch: Dispatch) -> Result<Self> {
        tracing::dispatcher::with_default(&dispatch, || {
            let root = config.base_path.as_path();
            info!(root = %root.display(), "opening registry");
            ensure_root(root)?;

            let packs = discover(root)?;
            info!(root = %root.display(), count = packs.len(), "registry opened");

            Ok(Self {
                config: config.clone(),
                packs: RwLock::new(packs),
                dispatch: dispatch.clone(),
            })
        })
    }

    fn logged<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    fn with_pack<T>(&self, name: &str, f: impl FnOnce(&Pack) -> Result<T>) -> Result<T> {
        self.logged(|| {
            let packs = self.packs.read();
            match packs.get(name) {
                Some(pack) => f(pack),
                None => {
                    error!(pack = %name, "pack not found");
                    Err(CdkeyError::PackNotFound {
                        name: name.to_string(),
                    })
                }
            }
        })
    }
}

/// Pack administration.
impl Registry {
    /// Returns the metadata of every pack, in no particular order.
    pub fn list_packs(&self) -> Vec<PackInfo> {
        self.packs.read().values().map(Pack::info).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packs.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.packs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.read().is_empty()
    }

    pub fn add_pack(&self, req: &NewPack) -> Result<()> {
        self.logged(|| {
            let mut packs = self.packs.write();
            if packs.contains_key(&req.name) {
                error!(pack = %req.name, "pack already exists");
                return Err(CdkeyError::PackAlreadyExists {
                    name: req.name.clone(),
                });
            }

            let pack = Pack::create(&self.config, req)?;
            info!(pack = %req.name, "pack added");
            packs.insert(req.name.clone(), pack);
            Ok(())
        })
    }

    /// Closes the pack and deletes its directory.
    pub fn remove_pack(&self, name: &str) -> Result<()> {
        self.logged(|| {
            let mut packs = self.packs.write();
            let Some(pack) = packs.remove(name) else {
                error!(pack = %name, "pack not found");
                return Err(CdkeyError::PackNotFound {
                    name: name.to_string(),
                });
            };

            pack.close();
            remove_dir_logged(pack.path());
            info!(pack = %name, "pack removed");
            Ok(())
        })
    }

    pub fn enable_pack(&self, name: &str) -> Result<()> {
        self.with_pack(name, Pack::enable)
    }

    pub fn disable_pack(&self, name: &str, reason: &str) -> Result<()> {
        self.with_pack(name, |pack| pack.disable(reason))
    }
}

/// Key operations.
impl Registry {
    pub fn list_keys(&self, name: &str) -> Result<Vec<KeyRecord>> {
        self.with_pack(name, Pack::list_keys)
    }

    pub fn use_key(&self, name: &str, code: &str) -> Result<()> {
        self.with_pack(name, |pack| pack.use_key(code))
    }
}

/// Shutdown.
impl Registry {
    /// Closes every pack. Later operations on them fail with
    /// [`CdkeyError::PackClosing`].
    pub fn stop_all(&self) {
        self.logged(|| {
            let packs = self.packs.write();
            for pack in packs.values() {
                pack.close();
            }
            info!(count = packs.len(), "all packs closed");
        })
    }
}

fn ensure_root(root: &Path) -> Result<()> {
    let unavailable = |reason: String| {
        error!(root = %root.display(), %reason, "registry root unavailable");
        CdkeyError::RootDirUnavailable {
            path: root.to_path_buf(),
            reason,
        }
    };

    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(unavailable("not a directory".to_string())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(root = %root.display(), "root does not exist, creating");
            fs::create_dir_all(root).map_err(|err| unavailable(err.to_string()))
        }
        Err(err) => Err(unavailable(err.to_string())),
    }
}

/// Loads every immediate subdirectory of `root` that holds pack metadata.
fn discover(root: &Path) -> Result<HashMap<String, Pack>> {
    let entries = fs::read_dir(root).map_err(|err| CdkeyError::RootDirUnavailable {
        path: root.to_path_buf(),
        reason: err.to_string(),
    })?;

    let mut packs = HashMap::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(err) => {
                warn!(root = %root.display(), %err, "failed to read directory entry");
                continue;
            }
        };
        if !path.is_dir() || !layout::pack_info_path(&path).is_file() {
            continue;
        }

        let pack = match Pack::load(&path) {
            Ok(pack) => pack,
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping pack");
                continue;
            }
        };

        if packs.contains_key(pack.name()) {
            warn!(pack = %pack.name(), path = %path.display(), "duplicate pack name, skipping");
            pack.close();
            continue;
        }
        packs.insert(pack.name().to_string(), pack);
    }

    Ok(packs)
}

#[cfg(test)]
mod tests;
